use crate::config::XtaskConfig;
use crate::external::{CargoCli, ProcessCommandExecutor};
use anyhow::Result;
use std::sync::Arc;

pub struct FmtCommand {
    check: bool,
}

impl FmtCommand {
    pub fn new(check: bool) -> Self {
        Self { check }
    }

    pub async fn execute(&self) -> Result<()> {
        let config = XtaskConfig::load()?;
        let cargo = CargoCli::new(Arc::new(ProcessCommandExecutor));

        // Sorter first, formatter second, both over the whole workspace.
        if self.check {
            println!("🔎 Checking manifest order in {:?}...", config.fmt.sort_paths);
        } else {
            println!("🗂️  Sorting manifests in {:?}...", config.fmt.sort_paths);
        }
        cargo.sort_manifests(&config.fmt.sort_paths, self.check).await?;

        if self.check {
            println!("🔎 Checking code formatting...");
        } else {
            println!("🎨 Formatting code...");
        }
        cargo.fmt_all(self.check).await?;

        if self.check {
            println!("✅ Manifests sorted and code formatted");
        } else {
            println!("✅ Formatting complete");
        }
        Ok(())
    }
}
