use clap::{Parser, Subcommand};
use graffiti::commands::output::OutputFormat;
use graffiti::config::DEFAULT_CONFIG_FILE;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "graffiti")]
#[command(
    about = "Build tagging utility: promote builds through release stage tags",
    long_about = None
)]
#[command(version)]
#[command(subcommand_help_heading = "Commands")]
pub struct Cli {
    /// Config file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config_file: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show version
    Version,

    /// List candidate builds not yet tagged in testing
    ListCandidates {
        /// Releases to inspect
        #[arg(required = true)]
        releases: Vec<String>,

        /// Show older candidate builds skipped over by a newer testing build
        #[arg(long)]
        old: bool,

        /// Output format
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// List testing builds not yet tagged in release
    ListTesting {
        /// Releases to inspect
        #[arg(required = true)]
        releases: Vec<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Promote builds listed in a command file
    Tag {
        /// Command file: release -> target -> builds
        #[arg(short = 'f', long = "file")]
        file: PathBuf,
    },

    /// Add or remove packages in every stage tag of a release
    Register {
        /// Command file: release -> add/remove -> packages
        #[arg(short = 'f', long = "file")]
        file: PathBuf,

        /// Refuse to remove packages that still have tagged builds
        #[arg(long)]
        no_force: bool,
    },
}
