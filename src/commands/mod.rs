//! Subcommand implementations.
//!
//! Each command has an `execute` entry point used by the CLI, which loads the
//! config and connects to the hub, and a `run` (or `collect`) core that takes
//! any [`crate::hub::BuildService`].

pub mod common;
pub mod list;
pub mod output;
pub mod register;
pub mod tag;
pub mod version;
