use crate::cli::BumpLevel;
use crate::config::XtaskConfig;
use crate::external::{manifest_version, CargoCli, ProcessCommandExecutor};
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

pub struct BumpCommand {
    level: BumpLevel,
    dry_run: bool,
}

impl BumpCommand {
    pub fn new(level: BumpLevel, dry_run: bool) -> Self {
        Self { level, dry_run }
    }

    pub async fn execute(&self) -> Result<()> {
        let config = XtaskConfig::load()?;
        let cargo = CargoCli::new(Arc::new(ProcessCommandExecutor));

        let manifest = Path::new("Cargo.toml");
        let before = manifest_version(manifest).context("could not read the current version")?;

        let output = cargo
            .set_version_bump(self.level.as_str(), &config.package, self.dry_run)
            .await?;

        if self.dry_run {
            // The bump tool reports what it would do on stderr.
            let report = output.stderr.trim();
            if report.is_empty() {
                println!(
                    "🔖 Dry run: {} bump of {} (version stays at {})",
                    self.level.as_str(),
                    config.package,
                    before
                );
            } else {
                println!("🔖 Dry run: {report}");
            }
            return Ok(());
        }

        let after = manifest_version(manifest).context("could not read the bumped version")?;
        println!("🔖 Version bumped: {before} → {after}");
        Ok(())
    }
}
