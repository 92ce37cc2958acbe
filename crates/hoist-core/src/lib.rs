//! Core types and configuration for hoist.
//!
//! This crate defines the `hoist.toml` schema ([`HoistConfig`]), the
//! per-run scratch directory ([`Workspace`]), detection results shared by
//! the build and deploy stages, and the Terraform variables file written at
//! the end of a release ([`ReleaseDescriptor`]).

pub mod config;
pub mod descriptor;
pub mod ecosystem;
pub mod error;
pub mod workspace;

pub use config::{
    BuildConfig, DEFAULT_PORT, DeployConfig, HoistConfig, MIN_PORT, ProjectConfig, WorkspaceConfig,
};
pub use descriptor::ReleaseDescriptor;
pub use ecosystem::{DetectionResult, Ecosystem};
pub use error::{Error, Result};
pub use workspace::Workspace;
