//! External tool abstractions
//!
//! Trait-based wrappers for the CLI tools the tasks delegate to (docker and
//! cargo subcommands), enabling testable code through dependency injection
//! and mock implementations.

pub mod cargo;
pub mod command;
pub mod docker;

pub use cargo::{manifest_version, CargoCli, CargoError};
pub use command::{CommandError, CommandExecutor, CommandOutput, ProcessCommandExecutor};
pub use docker::{ContainerRuntime, DockerCli, DockerError};
