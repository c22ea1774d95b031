//! `register`: add packages to, or remove them from, every stage tag of a
//! release.

use anyhow::{Context, Result};
use std::path::Path;

use super::common::{connect, load_config};
use crate::config::{load_registrations, Config, RegistrationCommands};
use crate::hub::BuildService;
use crate::promote::{register_packages, unregister_packages};

pub fn execute(config_file: &Path, file: &Path, no_force: bool) -> Result<()> {
    let config = load_config(config_file)?;
    let commands = load_registrations(file)
        .with_context(|| format!("Failed to load command file: {}", file.display()))?;
    let hub = connect(&config)?;
    run(&hub, &config, &commands, !no_force)?;
    println!("Package lists updated");
    Ok(())
}

/// Apply `commands`. Additions are owned by the configured hub user.
pub fn run<S>(
    service: &S,
    config: &Config,
    commands: &RegistrationCommands,
    force: bool,
) -> Result<()>
where
    S: BuildService + ?Sized,
{
    for release_name in commands.keys() {
        config.release(release_name)?;
    }

    for (release_name, entry) in commands {
        let release = config.release(release_name)?;
        if !entry.add.is_empty() {
            register_packages(service, &release.tags, &entry.add, &config.hub.username)
                .with_context(|| {
                    format!("Failed to register packages in release '{release_name}'")
                })?;
        }
        if !entry.remove.is_empty() {
            unregister_packages(service, &release.tags, &entry.remove, force)
                .with_context(|| {
                    format!("Failed to unregister packages from release '{release_name}'")
                })?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RegistrationEntry;
    use crate::errors::Error;
    use crate::hub::{InMemoryHub, Mutation};

    const CONFIG: &str = "
koji: {url: https://hub.example.org/kojihub, username: hguemar}
releases:
  newton:
    tags: [n-candidate, n-testing, n-release]
";

    fn config() -> Config {
        Config::from_yaml(CONFIG, Path::new("config.yaml")).unwrap()
    }

    fn entry(add: &[&str], remove: &[&str]) -> RegistrationEntry {
        RegistrationEntry {
            add: add.iter().map(|p| p.to_string()).collect(),
            remove: remove.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn test_add_lists_package_in_every_tag_with_config_owner() {
        let hub = InMemoryHub::new();
        let commands = RegistrationCommands::from([("newton".to_string(), entry(&["nova"], &[]))]);

        run(&hub, &config(), &commands, true).unwrap();

        for tag in ["n-candidate", "n-testing", "n-release"] {
            assert_eq!(hub.packages(tag).get("nova").map(String::as_str), Some("hguemar"));
        }
    }

    #[test]
    fn test_remove_is_forced_by_default() {
        let hub = InMemoryHub::new().with_build("nova", 5, "nova-5", &["n-candidate"]);
        let config = config();
        run(
            &hub,
            &config,
            &RegistrationCommands::from([("newton".to_string(), entry(&["nova"], &[]))]),
            true,
        )
        .unwrap();
        hub.reset_calls();

        run(
            &hub,
            &config,
            &RegistrationCommands::from([("newton".to_string(), entry(&[], &["nova"]))]),
            true,
        )
        .unwrap();

        assert!(hub.packages("n-candidate").is_empty());
        assert!(hub
            .calls()
            .iter()
            .all(|call| matches!(call, Mutation::RemovePackage { force: true, .. })));
        // forced removal leaves the build tagged
        assert!(hub.tags_of("nova-5").contains("n-candidate"));
    }

    #[test]
    fn test_remove_without_force_fails_on_tagged_builds() {
        let hub = InMemoryHub::new().with_build("nova", 5, "nova-5", &["n-candidate"]);
        let config = config();
        run(
            &hub,
            &config,
            &RegistrationCommands::from([("newton".to_string(), entry(&["nova"], &[]))]),
            true,
        )
        .unwrap();

        let err = run(
            &hub,
            &config,
            &RegistrationCommands::from([("newton".to_string(), entry(&[], &["nova"]))]),
            false,
        )
        .unwrap_err();

        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Registration { .. })));
        assert!(hub.packages("n-candidate").contains_key("nova"));
        assert!(!hub.packages("n-testing").contains_key("nova"));
    }

    #[test]
    fn test_unknown_release_fails_before_any_call() {
        let hub = InMemoryHub::new();
        let commands = RegistrationCommands::from([
            ("newton".to_string(), entry(&["nova"], &[])),
            ("zed".to_string(), entry(&["nova"], &[])),
        ]);

        let err = run(&hub, &config(), &commands, true).unwrap_err();

        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::UnknownRelease(_))));
        assert_eq!(hub.submissions(), 0);
    }
}
