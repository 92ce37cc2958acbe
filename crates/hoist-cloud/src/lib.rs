//! External tool operations for hoist: git checkout, AWS identity and ECR,
//! docker build/push, and Terraform provisioning.
//!
//! Every operation shells out through a [`CommandExecutor`], so tests swap in
//! mocks and never touch real tools or accounts.

pub mod aws;
pub mod docker;
pub mod doctor;
pub mod executor;
pub mod git;
pub mod publish;
pub mod terraform;
pub mod tool;

pub use aws::{AuthError, AwsClient, registry_domain, registry_host};
pub use docker::DockerClient;
pub use doctor::{CheckResult, Doctor, DoctorReport};
pub use executor::{CommandExecutor, RealExecutor};
pub use git::{GitClient, RetrievalError};
pub use publish::{PublishError, PublishRequest, PublishResult, RegistryPublisher};
pub use terraform::{ProvisionError, TerraformClient};
pub use tool::ToolError;
