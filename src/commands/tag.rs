//! `tag`: apply the promotions of a command file.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::path::Path;

use super::common::{connect, load_config};
use crate::config::{load_promotions, Config, PromotionCommands};
use crate::hub::BuildService;
use crate::promote::{tag_builds, PromotionReport};

pub fn execute(config_file: &Path, file: &Path) -> Result<()> {
    let config = load_config(config_file)?;
    let commands = load_promotions(file)
        .with_context(|| format!("Failed to load command file: {}", file.display()))?;
    let hub = connect(&config)?;

    let reports = run(&hub, &config, &commands)?;
    print_summary(&reports);

    let failed: usize = reports.iter().map(|r| r.failures().count()).sum();
    if failed > 0 {
        bail!("{failed} build(s) could not be promoted");
    }
    Ok(())
}

/// Promote every build named in `commands`.
///
/// All releases and targets are checked first, so a typo anywhere in the
/// file stops the run before any build is touched.
pub fn run<S>(
    service: &S,
    config: &Config,
    commands: &PromotionCommands,
) -> Result<Vec<PromotionReport>>
where
    S: BuildService + ?Sized,
{
    for (release_name, targets) in commands {
        let release = config.release(release_name)?;
        let workflow = config.workflow_for(release)?;
        for target in targets.keys() {
            let resolved = workflow.resolve(target)?;
            release
                .check_target(&resolved)
                .with_context(|| format!("Cannot promote release '{release_name}' to '{target}'"))?;
        }
    }

    let mut reports = Vec::new();
    for (release_name, targets) in commands {
        let release = config.release(release_name)?;
        let workflow = config.workflow_for(release)?;
        for (target, builds) in targets {
            let report = tag_builds(service, target, release, builds, workflow)
                .with_context(|| {
                    format!("Failed to promote release '{release_name}' to '{target}'")
                })?;
            reports.push(report);
        }
    }
    Ok(reports)
}

fn print_summary(reports: &[PromotionReport]) {
    for report in reports {
        let failed = report.failures().count();
        let unchanged = report.outcomes.len() - failed - report.changed();
        let status = if failed == 0 {
            "ok".green().bold()
        } else {
            "FAILED".red().bold()
        };
        println!(
            "{} {} -> {}: {} promoted, {} unchanged, {} failed",
            status,
            report.release.bold(),
            report.target,
            report.changed(),
            unchanged,
            failed
        );
        for error in report.failures() {
            println!("  {} {error}", "-".red());
        }
    }
}
