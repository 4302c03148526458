use crate::external::{CargoCli, ProcessCommandExecutor};
use anyhow::Result;
use std::sync::Arc;

#[derive(Default)]
pub struct LintCommand;

impl LintCommand {
    pub fn new() -> Self {
        Self
    }

    pub async fn execute(&self) -> Result<()> {
        let cargo = CargoCli::new(Arc::new(ProcessCommandExecutor));

        println!("🔍 Running clippy over the workspace (warnings denied)...");
        cargo.clippy_all().await?;

        println!("✅ No lint findings");
        Ok(())
    }
}
