use anyhow::Result;
use graffiti::commands::{list, register, tag, version};

use super::types::{Cli, Commands};

pub fn dispatch(cli: Cli) -> Result<()> {
    let config_file = cli.config_file;
    match cli.command {
        Commands::Version => version::execute(),
        Commands::ListCandidates {
            releases,
            old,
            format,
        } => list::list_candidates(&config_file, &releases, old, format),
        Commands::ListTesting { releases, format } => {
            list::list_testing(&config_file, &releases, format)
        }
        Commands::Tag { file } => tag::execute(&config_file, &file),
        Commands::Register { file, no_force } => register::execute(&config_file, &file, no_force),
    }
}
