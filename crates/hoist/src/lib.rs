//! Containerize a source repository, push it to AWS ECR, and release it with
//! Terraform.
//!
//! This is the facade crate: it re-exports the hoist sub-crates and owns the
//! [`Pipeline`] that sequences them.
//!
//! ```text
//! Pipeline::deploy()
//!   1. Workspace   ── reset + git clone (with a repository URL) or reuse
//!   2. Inspect     ── ecosystem and listen port
//!   3. Synthesize  ── runtime files and Dockerfile, only when absent
//!   4. Publish     ── ECR repository, login, docker build/tag/push
//!   5. Record      ── {build}/release.json
//!   6. Descriptor  ── {infra}/terraform.tfvars
//!   7. Provision   ── terraform init + apply, then read outputs
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use hoist::{DeployRequest, HoistConfig, Pipeline, Workspace};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = HoistConfig::load(Path::new("."))?;
//! let workspace = Workspace::new(&config.workspace.root);
//! let request = DeployRequest::from_config(&config);
//! let pipeline = Pipeline::new(&config, &request.profile, &request.region);
//! let report = pipeline.deploy(&workspace, &config, &request).await?;
//! println!("{}", report.summary);
//! # Ok(())
//! # }
//! ```

mod error;
pub mod pipeline;
pub mod record;

pub use error::{Error, Result};
// Core types flattened into the root namespace.
pub use hoist_core::{
    DetectionResult, Ecosystem, HoistConfig, ReleaseDescriptor, Workspace, config, descriptor,
};
pub use pipeline::{DeployReport, DeployRequest, DeploymentSummary, Pipeline};
pub use record::BuildRecord;

/// Source inspection and artifact synthesis.
pub mod build {
    pub use hoist_build::*;
}

/// git, AWS, docker, and Terraform operations.
pub mod cloud {
    pub use hoist_cloud::*;
}
