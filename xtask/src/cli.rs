use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Development task runner for opensearch-users")]
#[command(long_about = "Runs the repo's development tasks: formatting, linting, \
                       coverage-gated tests against a containerized OpenSearch, and \
                       version bumps. Every task delegates to the matching external \
                       tool; run 'cargo xtask doctor' to check they are installed.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sort the member manifests, then format the code
    Fmt {
        /// Report unformatted files instead of rewriting them
        #[arg(long, help = "Run the sorter and formatter in check mode")]
        check: bool,
    },
    /// Run clippy over the whole workspace with warnings denied
    Lint,
    /// Run the test suite with a coverage gate against a containerized OpenSearch
    Test {
        /// Leave the fixture container up after the run
        #[arg(long, help = "Skip the post-run fixture stop, for debugging")]
        keep_running: bool,
    },
    /// Bump the package version in its manifest
    Bump {
        /// Severity of the version change
        #[arg(value_enum)]
        level: BumpLevel,
        /// Show what would change without writing the manifest
        #[arg(long, help = "Pass --dry-run through to the version bump tool")]
        dry_run: bool,
    },
    /// Manage the OpenSearch test fixture container directly
    Fixture {
        #[command(subcommand)]
        action: FixtureAction,
    },
    /// Check that every delegated tool is installed
    Doctor,
}

#[derive(Subcommand)]
pub enum FixtureAction {
    /// Start the fixture container and wait until it answers
    Up,
    /// Stop the fixture container if it is running
    Down,
    /// Report whether the fixture container is running
    Status,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum BumpLevel {
    Major,
    Minor,
    Patch,
}

impl BumpLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            BumpLevel::Major => "major",
            BumpLevel::Minor => "minor",
            BumpLevel::Patch => "patch",
        }
    }
}
