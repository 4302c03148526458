use crate::external::{CommandExecutor, ProcessCommandExecutor};
use anyhow::{bail, Result};

struct ToolCheck {
    label: &'static str,
    program: &'static str,
    args: &'static [&'static str],
    hint: &'static str,
}

const CHECKS: &[ToolCheck] = &[
    ToolCheck {
        label: "docker",
        program: "docker",
        args: &["--version"],
        hint: "install Docker or a compatible container runtime",
    },
    ToolCheck {
        label: "cargo",
        program: "cargo",
        args: &["--version"],
        hint: "install Rust via rustup",
    },
    ToolCheck {
        label: "rustfmt",
        program: "cargo",
        args: &["fmt", "--version"],
        hint: "rustup component add rustfmt",
    },
    ToolCheck {
        label: "clippy",
        program: "cargo",
        args: &["clippy", "--version"],
        hint: "rustup component add clippy",
    },
    ToolCheck {
        label: "cargo-sort",
        program: "cargo",
        args: &["sort", "--version"],
        hint: "cargo install cargo-sort",
    },
    ToolCheck {
        label: "cargo-llvm-cov",
        program: "cargo",
        args: &["llvm-cov", "--version"],
        hint: "cargo install cargo-llvm-cov",
    },
    ToolCheck {
        label: "cargo-set-version",
        program: "cargo",
        args: &["set-version", "--version"],
        hint: "cargo install cargo-edit",
    },
];

#[derive(Default)]
pub struct DoctorCommand;

impl DoctorCommand {
    pub fn new() -> Self {
        Self
    }

    pub async fn execute(&self) -> Result<()> {
        println!("🩺 Checking the tools the tasks delegate to");
        println!();

        let executor = ProcessCommandExecutor;
        let mut missing = 0;

        for check in CHECKS {
            match executor.execute(check.program, check.args).await {
                Ok(output) if output.success() => {
                    let version = output.stdout.lines().next().unwrap_or("").trim();
                    println!("✅ {:<18} {version}", check.label);
                }
                _ => {
                    println!("❌ {:<18} missing ({})", check.label, check.hint);
                    missing += 1;
                }
            }
        }

        println!();
        if missing > 0 {
            bail!("{missing} required tool(s) missing");
        }
        println!("✅ All tools present");
        Ok(())
    }
}
