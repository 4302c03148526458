//! Base command execution abstraction
//!
//! Provides the foundational trait for invoking external tools, enabling
//! dependency injection for testing.

use async_trait::async_trait;
use std::process::Stdio;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub status_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status_code == 0
    }
}

#[derive(Debug, Error, Clone)]
pub enum CommandError {
    #[error("Command not found: {command}")]
    CommandNotFound { command: String },
    #[error("IO error: {message}")]
    Io { message: String },
}

/// Trait for invoking external tools
///
/// `execute` captures the tool's output; `stream` inherits the parent's
/// stdio and only reports the exit status, which is what long-running tool
/// invocations (test suites, image pulls) want.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn execute(&self, program: &str, args: &[&str]) -> Result<CommandOutput, CommandError>;

    async fn stream(&self, program: &str, args: &[&str]) -> Result<i32, CommandError> {
        Ok(self.execute(program, args).await?.status_code)
    }
}

fn spawn_error(program: &str, e: std::io::Error) -> CommandError {
    if e.kind() == std::io::ErrorKind::NotFound {
        CommandError::CommandNotFound {
            command: program.to_string(),
        }
    } else {
        CommandError::Io {
            message: e.to_string(),
        }
    }
}

/// Real implementation using tokio::process::Command
pub struct ProcessCommandExecutor;

#[async_trait]
impl CommandExecutor for ProcessCommandExecutor {
    async fn execute(&self, program: &str, args: &[&str]) -> Result<CommandOutput, CommandError> {
        let output = tokio::process::Command::new(program)
            .args(args)
            .output()
            .await
            .map_err(|e| spawn_error(program, e))?;

        Ok(CommandOutput {
            status_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    async fn stream(&self, program: &str, args: &[&str]) -> Result<i32, CommandError> {
        let status = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| spawn_error(program, e))?;

        Ok(status.code().unwrap_or(-1))
    }
}
