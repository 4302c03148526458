//! Container runtime abstractions
//!
//! Wraps the docker CLI for the OpenSearch test fixture lifecycle. The
//! runner never speaks to the daemon directly; every operation is a docker
//! invocation through [`CommandExecutor`].

use super::command::{CommandError, CommandExecutor};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DockerError {
    #[error("Docker daemon is not reachable: {message}")]
    DaemonUnavailable { message: String },
    #[error("No such container: {name}")]
    NoSuchContainer { name: String },
    #[error("Container name already in use: {name}")]
    NameConflict { name: String },
    #[error("Command execution error: {source}")]
    CommandError {
        #[from]
        source: CommandError,
    },
    #[error("Docker command failed: {message}")]
    DockerCommandFailed { message: String },
}

/// Trait for container runtime operations
///
/// This abstraction enables testing the fixture lifecycle without a running
/// daemon, while preserving the exact interface the commands use.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Start a detached container with `--rm` and return its id.
    async fn run_detached(
        &self,
        name: &str,
        image: &str,
        ports: &[String],
        env: &[String],
    ) -> Result<String, DockerError>;

    /// Stop a container by name.
    async fn stop(&self, name: &str) -> Result<(), DockerError>;

    /// Whether a container with this name is currently running.
    async fn is_running(&self, name: &str) -> Result<bool, DockerError>;
}

/// Real docker CLI implementation
pub struct DockerCli {
    executor: Arc<dyn CommandExecutor>,
}

impl DockerCli {
    pub fn new(executor: Arc<dyn CommandExecutor>) -> Self {
        Self { executor }
    }

    async fn execute_docker_command(&self, args: &[&str]) -> Result<String, DockerError> {
        let output = self.executor.execute("docker", args).await?;

        if !output.success() {
            return Err(classify_docker_error(&output.stderr, args));
        }

        Ok(output.stdout.trim().to_string())
    }
}

fn classify_docker_error(stderr: &str, args: &[&str]) -> DockerError {
    let named = args
        .iter()
        .position(|a| *a == "--name")
        .and_then(|i| args.get(i + 1))
        .or_else(|| args.last())
        .unwrap_or(&"unknown")
        .to_string();

    if stderr.contains("Cannot connect to the Docker daemon") {
        DockerError::DaemonUnavailable {
            message: stderr.trim().to_string(),
        }
    } else if stderr.contains("No such container") || stderr.contains("No such object") {
        DockerError::NoSuchContainer { name: named }
    } else if stderr.contains("is already in use by container") {
        DockerError::NameConflict { name: named }
    } else {
        DockerError::DockerCommandFailed {
            message: stderr.trim().to_string(),
        }
    }
}

#[async_trait]
impl ContainerRuntime for DockerCli {
    async fn run_detached(
        &self,
        name: &str,
        image: &str,
        ports: &[String],
        env: &[String],
    ) -> Result<String, DockerError> {
        let mut args = vec!["run", "-d", "--rm", "--name", name];
        for port in ports {
            args.push("-p");
            args.push(port);
        }
        for pair in env {
            args.push("-e");
            args.push(pair);
        }
        args.push(image);

        self.execute_docker_command(&args).await
    }

    async fn stop(&self, name: &str) -> Result<(), DockerError> {
        self.execute_docker_command(&["stop", name]).await?;
        Ok(())
    }

    async fn is_running(&self, name: &str) -> Result<bool, DockerError> {
        let result = self
            .execute_docker_command(&["inspect", "-f", "{{.State.Running}}", name])
            .await;

        match result {
            Ok(output) => Ok(output == "true"),
            Err(DockerError::NoSuchContainer { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::command::CommandOutput;

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

    fn ok_output(stdout: &str) -> Result<CommandOutput, CommandError> {
        Ok(CommandOutput {
            status_code: 0,
            stdout: stdout.to_string(),
            stderr: String::new(),
        })
    }

    fn failed_output(stderr: &str) -> Result<CommandOutput, CommandError> {
        Ok(CommandOutput {
            status_code: 1,
            stdout: String::new(),
            stderr: stderr.to_string(),
        })
    }

    #[tokio::test]
    async fn test_run_detached_builds_full_command() {
        let mock_executor = MockCommandExecutor::new().expect_command(
            "docker",
            &[
                "run",
                "-d",
                "--rm",
                "--name",
                "search-fixture",
                "-p",
                "9200:9200",
                "-p",
                "9600:9600",
                "-e",
                "discovery.type=single-node",
                "opensearchproject/opensearch:2.11.1",
            ],
            ok_output("f2a1bc9d\n"),
        );

        let docker = DockerCli::new(Arc::new(mock_executor));
        let container_id = docker
            .run_detached(
                "search-fixture",
                "opensearchproject/opensearch:2.11.1",
                &["9200:9200".to_string(), "9600:9600".to_string()],
                &["discovery.type=single-node".to_string()],
            )
            .await
            .unwrap();

        assert_eq!(container_id, "f2a1bc9d");
    }

    #[tokio::test]
    async fn test_stop_missing_container_is_classified() {
        let mock_executor = MockCommandExecutor::new().expect_command(
            "docker",
            &["stop", "search-fixture"],
            failed_output("Error response from daemon: No such container: search-fixture"),
        );

        let docker = DockerCli::new(Arc::new(mock_executor));
        let result = docker.stop("search-fixture").await;

        assert!(matches!(
            result.unwrap_err(),
            DockerError::NoSuchContainer { name } if name == "search-fixture"
        ));
    }

    #[tokio::test]
    async fn test_name_conflict_is_classified() {
        let mock_executor = MockCommandExecutor::new().expect_command(
            "docker",
            &[
                "run",
                "-d",
                "--rm",
                "--name",
                "search-fixture",
                "opensearchproject/opensearch:2.11.1",
            ],
            failed_output(
                "docker: Error response from daemon: Conflict. The container name \
                 \"/search-fixture\" is already in use by container \"abc123\".",
            ),
        );

        let docker = DockerCli::new(Arc::new(mock_executor));
        let result = docker
            .run_detached(
                "search-fixture",
                "opensearchproject/opensearch:2.11.1",
                &[],
                &[],
            )
            .await;

        assert!(matches!(
            result.unwrap_err(),
            DockerError::NameConflict { name } if name == "search-fixture"
        ));
    }

    #[tokio::test]
    async fn test_is_running_true() {
        let mock_executor = MockCommandExecutor::new().expect_command(
            "docker",
            &["inspect", "-f", "{{.State.Running}}", "search-fixture"],
            ok_output("true\n"),
        );

        let docker = DockerCli::new(Arc::new(mock_executor));
        assert!(docker.is_running("search-fixture").await.unwrap());
    }

    #[tokio::test]
    async fn test_is_running_missing_container_is_false() {
        let mock_executor = MockCommandExecutor::new().expect_command(
            "docker",
            &["inspect", "-f", "{{.State.Running}}", "search-fixture"],
            failed_output("Error: No such object: search-fixture"),
        );

        let docker = DockerCli::new(Arc::new(mock_executor));
        assert!(!docker.is_running("search-fixture").await.unwrap());
    }

    #[tokio::test]
    async fn test_daemon_down_is_classified() {
        let mock_executor = MockCommandExecutor::new().expect_command(
            "docker",
            &["stop", "search-fixture"],
            failed_output(
                "Cannot connect to the Docker daemon at unix:///var/run/docker.sock. \
                 Is the docker daemon running?",
            ),
        );

        let docker = DockerCli::new(Arc::new(mock_executor));
        let result = docker.stop("search-fixture").await;

        assert!(matches!(
            result.unwrap_err(),
            DockerError::DaemonUnavailable { .. }
        ));
    }
}
