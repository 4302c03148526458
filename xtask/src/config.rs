//! Task runner configuration.
//!
//! Everything has a sensible default; an optional `xtask.toml` at the
//! workspace root and `XTASK_`-prefixed environment variables override it.
//! Nested keys use a double underscore, so `XTASK_COVERAGE__FAIL_UNDER=90`
//! sets `coverage.fail_under`.

use anyhow::Result;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Main configuration structure for the task runner
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct XtaskConfig {
    /// Package whose tests are covered and whose version gets bumped
    pub package: String,
    /// OpenSearch test fixture settings
    pub fixture: FixtureConfig,
    /// Coverage gate settings
    pub coverage: CoverageConfig,
    /// Formatting task settings
    pub fmt: FmtConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FixtureConfig {
    /// Container name, fixed so leftover fixtures can be found and stopped
    pub name: String,
    /// Image reference to run
    pub image: String,
    /// Port mappings passed to the container runtime as host:container
    pub ports: Vec<String>,
    /// Environment pairs passed to the container as KEY=value
    pub env: Vec<String>,
    /// URL polled until the fixture answers
    pub url: String,
    /// Give up waiting for readiness after this many seconds
    pub readiness_timeout_secs: u64,
    /// Seconds between readiness polls
    pub readiness_poll_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CoverageConfig {
    /// Minimum line coverage percentage; the coverage tool enforces it
    pub fail_under: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FmtConfig {
    /// Directories whose manifests the sorter runs over
    pub sort_paths: Vec<String>,
}

impl Default for XtaskConfig {
    fn default() -> Self {
        Self {
            package: "opensearch-users".to_string(),
            fixture: FixtureConfig::default(),
            coverage: CoverageConfig::default(),
            fmt: FmtConfig::default(),
        }
    }
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            name: "opensearch-users-test".to_string(),
            image: "opensearchproject/opensearch:2.11.1".to_string(),
            ports: vec!["9200:9200".to_string(), "9600:9600".to_string()],
            env: vec![
                "discovery.type=single-node".to_string(),
                "DISABLE_SECURITY_PLUGIN=true".to_string(),
                "DISABLE_INSTALL_DEMO_CONFIG=true".to_string(),
            ],
            url: "http://localhost:9200".to_string(),
            readiness_timeout_secs: 120,
            readiness_poll_secs: 2,
        }
    }
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self { fail_under: 100.0 }
    }
}

impl Default for FmtConfig {
    fn default() -> Self {
        Self {
            sort_paths: vec![".".to_string(), "xtask".to_string()],
        }
    }
}

impl XtaskConfig {
    /// Load configuration with precedence:
    /// 1. Default values
    /// 2. xtask.toml at the workspace root
    /// 3. Environment variables (prefixed with XTASK_, `__` between nesting
    ///    levels so keys like `fail_under` survive intact)
    pub fn load() -> Result<Self> {
        Self::load_env_file()?;

        let mut builder = Config::builder();

        if Path::new("xtask.toml").exists() {
            builder = builder.add_source(File::with_name("xtask"));
        }

        builder = builder.add_source(
            Environment::with_prefix("XTASK")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Load .env file if it exists
    fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::debug!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}
