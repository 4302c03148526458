//! Cargo tool abstractions
//!
//! Wraps the cargo subcommands the tasks delegate to: the manifest sorter,
//! the formatter, clippy, the coverage runner, and the version bumper. None
//! of these tools are reimplemented here; failures are classified so missing
//! installs surface with an install hint.

use super::command::{CommandError, CommandExecutor, CommandOutput};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CargoError {
    #[error("cargo {subcommand} is not installed (try `{install_hint}`)")]
    MissingSubcommand {
        subcommand: String,
        install_hint: String,
    },
    #[error("Command execution error: {source}")]
    CommandError {
        #[from]
        source: CommandError,
    },
    #[error("Cargo command failed: {message}")]
    CargoCommandFailed { message: String },
    #[error("Could not read manifest: {message}")]
    ManifestRead { message: String },
}

/// How to install a cargo subcommand that turned out to be missing.
fn install_hint(subcommand: &str) -> &'static str {
    match subcommand {
        "sort" => "cargo install cargo-sort",
        "llvm-cov" => "cargo install cargo-llvm-cov",
        "set-version" => "cargo install cargo-edit",
        "clippy" => "rustup component add clippy",
        "fmt" => "rustup component add rustfmt",
        _ => "check your cargo installation",
    }
}

/// Wrapper for the delegated cargo tools
pub struct CargoCli {
    executor: Arc<dyn CommandExecutor>,
}

impl CargoCli {
    pub fn new(executor: Arc<dyn CommandExecutor>) -> Self {
        Self { executor }
    }

    async fn execute_cargo_command(&self, args: &[&str]) -> Result<CommandOutput, CargoError> {
        let output = self.executor.execute("cargo", args).await?;

        if !output.success() {
            return Err(classify_cargo_error(&output, args));
        }

        Ok(output)
    }

    async fn stream_cargo_command(&self, args: &[&str]) -> Result<(), CargoError> {
        let status = self.executor.stream("cargo", args).await?;

        if status != 0 {
            return Err(CargoError::CargoCommandFailed {
                message: format!("cargo {} exited with status {status}", args.join(" ")),
            });
        }

        Ok(())
    }

    /// Sort the Cargo.toml tables under the given directories.
    pub async fn sort_manifests(&self, paths: &[String], check: bool) -> Result<(), CargoError> {
        let mut args = vec!["sort"];
        if check {
            args.push("--check");
        }
        args.extend(paths.iter().map(String::as_str));

        self.execute_cargo_command(&args).await?;
        Ok(())
    }

    /// Run rustfmt over every workspace member.
    pub async fn fmt_all(&self, check: bool) -> Result<(), CargoError> {
        let mut args = vec!["fmt", "--all"];
        if check {
            args.extend(["--", "--check"]);
        }

        self.execute_cargo_command(&args).await?;
        Ok(())
    }

    /// Clippy over the whole workspace with warnings denied. Streams output.
    pub async fn clippy_all(&self) -> Result<(), CargoError> {
        self.stream_cargo_command(&[
            "clippy",
            "--workspace",
            "--all-targets",
            "--",
            "-D",
            "warnings",
        ])
        .await
    }

    /// Run the package's test suite under the coverage tool, failing the run
    /// when line coverage drops below the threshold. Streams output.
    pub async fn llvm_cov(
        &self,
        package: &str,
        fail_under_lines: f64,
        include_ignored: bool,
    ) -> Result<(), CargoError> {
        let threshold = fail_under_lines.to_string();
        let mut args = vec![
            "llvm-cov",
            "--package",
            package,
            "--fail-under-lines",
            threshold.as_str(),
        ];
        if include_ignored {
            args.extend(["--", "--include-ignored"]);
        }

        self.stream_cargo_command(&args).await
    }

    /// Bump the package version in its manifest via cargo-set-version.
    pub async fn set_version_bump(
        &self,
        level: &str,
        package: &str,
        dry_run: bool,
    ) -> Result<CommandOutput, CargoError> {
        let mut args = vec!["set-version", "--bump", level, "--package", package];
        if dry_run {
            args.push("--dry-run");
        }

        self.execute_cargo_command(&args).await
    }
}

fn classify_cargo_error(output: &CommandOutput, args: &[&str]) -> CargoError {
    let subcommand = args.first().copied().unwrap_or("unknown").to_string();

    if output.stderr.contains("no such command") {
        let hint = install_hint(&subcommand).to_string();
        CargoError::MissingSubcommand {
            subcommand,
            install_hint: hint,
        }
    } else {
        let message = if output.stderr.trim().is_empty() {
            format!(
                "cargo {} exited with status {}",
                args.join(" "),
                output.status_code
            )
        } else {
            output.stderr.trim().to_string()
        };
        CargoError::CargoCommandFailed { message }
    }
}

/// Read `[package].version` out of a manifest.
pub fn manifest_version(manifest_path: &Path) -> Result<String, CargoError> {
    let raw = std::fs::read_to_string(manifest_path).map_err(|e| CargoError::ManifestRead {
        message: format!("{}: {e}", manifest_path.display()),
    })?;
    parse_manifest_version(&raw).ok_or_else(|| CargoError::ManifestRead {
        message: format!("{}: no [package].version entry", manifest_path.display()),
    })
}

fn parse_manifest_version(raw: &str) -> Option<String> {
    let manifest: toml::Value = toml::from_str(raw).ok()?;
    manifest
        .get("package")?
        .get("version")?
        .as_str()
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    // Simple mock for testing
    struct MockCommandExecutor {
        responses: std::collections::HashMap<String, Result<CommandOutput, CommandError>>,
    }

    impl MockCommandExecutor {
        fn new() -> Self {
            Self {
                responses: std::collections::HashMap::new(),
            }
        }

        fn expect_command(
            mut self,
            program: &str,
            args: &[&str],
            response: Result<CommandOutput, CommandError>,
        ) -> Self {
            let key = format!("{} {}", program, args.join(" "));
            self.responses.insert(key, response);
            self
        }
    }

    #[async_trait]
    impl CommandExecutor for MockCommandExecutor {
        async fn execute(
            &self,
            program: &str,
            args: &[&str],
        ) -> Result<CommandOutput, CommandError> {
            let key = format!("{} {}", program, args.join(" "));
            self.responses
                .get(&key)
                .cloned()
                .unwrap_or(Err(CommandError::CommandNotFound {
                    command: program.to_string(),
                }))
        }
    }

    fn ok_output() -> Result<CommandOutput, CommandError> {
        Ok(CommandOutput {
            status_code: 0,
            stdout: String::new(),
            stderr: String::new(),
        })
    }

    #[tokio::test]
    async fn test_sort_manifests_passes_paths_in_order() {
        let mock_executor = MockCommandExecutor::new().expect_command(
            "cargo",
            &["sort", ".", "xtask"],
            ok_output(),
        );

        let cargo = CargoCli::new(Arc::new(mock_executor));
        let result = cargo
            .sort_manifests(&[".".to_string(), "xtask".to_string()], false)
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_sort_manifests_check_mode() {
        let mock_executor = MockCommandExecutor::new().expect_command(
            "cargo",
            &["sort", "--check", ".", "xtask"],
            ok_output(),
        );

        let cargo = CargoCli::new(Arc::new(mock_executor));
        let result = cargo
            .sort_manifests(&[".".to_string(), "xtask".to_string()], true)
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_fmt_all_check_mode() {
        let mock_executor = MockCommandExecutor::new().expect_command(
            "cargo",
            &["fmt", "--all", "--", "--check"],
            ok_output(),
        );

        let cargo = CargoCli::new(Arc::new(mock_executor));
        assert!(cargo.fmt_all(true).await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_subcommand_gets_install_hint() {
        let mock_executor = MockCommandExecutor::new().expect_command(
            "cargo",
            &["sort", "."],
            Ok(CommandOutput {
                status_code: 101,
                stdout: String::new(),
                stderr: "error: no such command: `sort`".to_string(),
            }),
        );

        let cargo = CargoCli::new(Arc::new(mock_executor));
        let err = cargo
            .sort_manifests(&[".".to_string()], false)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CargoError::MissingSubcommand { ref install_hint, .. }
                if install_hint == "cargo install cargo-sort"
        ));
    }

    #[tokio::test]
    async fn test_set_version_bump_dry_run_args() {
        let mock_executor = MockCommandExecutor::new().expect_command(
            "cargo",
            &[
                "set-version",
                "--bump",
                "minor",
                "--package",
                "opensearch-users",
                "--dry-run",
            ],
            Ok(CommandOutput {
                status_code: 0,
                stdout: String::new(),
                stderr: "   Upgrading opensearch-users from 0.1.0 to 0.2.0".to_string(),
            }),
        );

        let cargo = CargoCli::new(Arc::new(mock_executor));
        let output = cargo
            .set_version_bump("minor", "opensearch-users", true)
            .await
            .unwrap();

        assert!(output.stderr.contains("0.1.0 to 0.2.0"));
    }

    #[tokio::test]
    async fn test_llvm_cov_streams_with_threshold() {
        struct StreamRecorder;

        #[async_trait]
        impl CommandExecutor for StreamRecorder {
            async fn execute(
                &self,
                _program: &str,
                _args: &[&str],
            ) -> Result<CommandOutput, CommandError> {
                unreachable!("coverage runs must stream");
            }

            async fn stream(&self, program: &str, args: &[&str]) -> Result<i32, CommandError> {
                assert_eq!(program, "cargo");
                assert_eq!(
                    args,
                    [
                        "llvm-cov",
                        "--package",
                        "opensearch-users",
                        "--fail-under-lines",
                        "100",
                        "--",
                        "--include-ignored",
                    ]
                );
                Ok(0)
            }
        }

        let cargo = CargoCli::new(Arc::new(StreamRecorder));
        let result = cargo.llvm_cov("opensearch-users", 100.0, true).await;
        assert!(result.is_ok());
    }

    #[test]
    fn test_parse_manifest_version() {
        let raw = r#"
[package]
name = "opensearch-users"
version = "0.3.1"
edition = "2021"
"#;
        assert_eq!(parse_manifest_version(raw).as_deref(), Some("0.3.1"));
    }

    #[test]
    fn test_parse_manifest_version_missing() {
        assert!(parse_manifest_version("[workspace]\nmembers = []\n").is_none());
    }
}
