use crate::cli::FixtureAction;
use crate::config::{FixtureConfig, XtaskConfig};
use crate::external::{ContainerRuntime, DockerCli, DockerError, ProcessCommandExecutor};
use anyhow::{bail, Context, Result};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub struct FixtureCommand {
    action: FixtureAction,
}

impl FixtureCommand {
    pub fn new(action: FixtureAction) -> Self {
        Self { action }
    }

    pub async fn execute(&self) -> Result<()> {
        let config = XtaskConfig::load()?;
        let docker = DockerCli::new(Arc::new(ProcessCommandExecutor));

        match self.action {
            FixtureAction::Up => {
                stop_leftover(&docker, &config.fixture).await;
                start_and_wait(&docker, &config.fixture).await?;
                println!(
                    "✅ Fixture '{}' is up at {}",
                    config.fixture.name, config.fixture.url
                );
                Ok(())
            }
            FixtureAction::Down => match docker.stop(&config.fixture.name).await {
                Ok(()) => {
                    println!("🛑 Stopped fixture container '{}'", config.fixture.name);
                    Ok(())
                }
                Err(DockerError::NoSuchContainer { .. }) => {
                    println!(
                        "💤 Fixture container '{}' is not running",
                        config.fixture.name
                    );
                    Ok(())
                }
                Err(e) => Err(e).context("could not stop the fixture container"),
            },
            FixtureAction::Status => {
                if docker.is_running(&config.fixture.name).await? {
                    println!(
                        "🟢 Fixture container '{}' is running ({})",
                        config.fixture.name, config.fixture.url
                    );
                } else {
                    println!(
                        "⚪ Fixture container '{}' is not running",
                        config.fixture.name
                    );
                }
                Ok(())
            }
        }
    }
}

/// Best-effort stop of a leftover fixture from an earlier aborted run.
/// The container usually is not there; every failure here is tolerated.
pub async fn stop_leftover(docker: &impl ContainerRuntime, fixture: &FixtureConfig) {
    match docker.stop(&fixture.name).await {
        Ok(()) => println!("🧹 Stopped leftover fixture container '{}'", fixture.name),
        Err(DockerError::NoSuchContainer { .. }) => {}
        Err(e) => tracing::debug!("pre-run fixture stop skipped: {e}"),
    }
}

/// Start the fixture container and block until it answers over HTTP.
/// A fixture that never answers is stopped again before the error returns.
pub async fn start_and_wait(docker: &impl ContainerRuntime, fixture: &FixtureConfig) -> Result<()> {
    println!("🐳 Starting OpenSearch fixture ({})...", fixture.image);
    let container_id = docker
        .run_detached(&fixture.name, &fixture.image, &fixture.ports, &fixture.env)
        .await
        .context("could not start the fixture container")?;
    tracing::debug!(container_id, "fixture container started");

    print!("⏳ Waiting for {} ... ", fixture.url);
    std::io::Write::flush(&mut std::io::stdout()).unwrap();

    if let Err(e) = wait_until_ready(fixture).await {
        println!("❌");
        if let Err(stop_err) = docker.stop(&fixture.name).await {
            tracing::warn!("could not stop fixture after failed readiness wait: {stop_err}");
        }
        return Err(e);
    }
    println!("✅");
    Ok(())
}

async fn wait_until_ready(fixture: &FixtureConfig) -> Result<()> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()?;
    let deadline = Instant::now() + Duration::from_secs(fixture.readiness_timeout_secs);

    loop {
        if let Ok(response) = client.get(&fixture.url).send().await {
            if response.status().is_success() {
                return Ok(());
            }
        }
        if Instant::now() >= deadline {
            bail!(
                "fixture at {} did not answer within {}s",
                fixture.url,
                fixture.readiness_timeout_secs
            );
        }
        tokio::time::sleep(Duration::from_secs(fixture.readiness_poll_secs)).await;
    }
}
