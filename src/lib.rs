pub mod commands;
pub mod config;
pub mod diff;
pub mod errors;
pub mod hub;
pub mod models;
pub mod promote;
