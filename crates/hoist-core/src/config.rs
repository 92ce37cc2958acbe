use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// File name looked up in the working directory.
pub const CONFIG_FILE: &str = "hoist.toml";

/// Lowest port accepted anywhere a listen port is configured or detected.
pub const MIN_PORT: u16 = 2;

/// Port used when nothing else names one.
pub const DEFAULT_PORT: u16 = 8080;

/// hoist.toml configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HoistConfig {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub workspace: WorkspaceConfig,
    #[serde(default)]
    pub build: BuildConfig,
    #[serde(default)]
    pub deploy: DeployConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Application name, also used as the ECR repository name
    #[serde(default = "default_app_name")]
    pub name: String,
    /// AWS region (defaults to us-east-1)
    #[serde(default = "default_region")]
    pub region: String,
    /// AWS credentials profile
    #[serde(default = "default_profile")]
    pub profile: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Scratch directory holding `source/` and `build/`
    #[serde(default = "default_workspace_root")]
    pub root: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Port used when nothing in the source tree names one
    #[serde(default = "default_port")]
    pub default_port: u16,
    /// Base image for synthesized Python Dockerfiles
    #[serde(default = "default_python_image")]
    pub python_image: String,
    /// Base image for synthesized Node Dockerfiles
    #[serde(default = "default_node_image")]
    pub node_image: String,
    /// Image used when the ecosystem is not recognized
    #[serde(default = "default_placeholder_image")]
    pub placeholder_image: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployConfig {
    /// Number of running tasks requested from the provisioner
    #[serde(default = "default_desired_count")]
    pub desired_count: u32,
    /// Terraform root module directory
    #[serde(default = "default_infra_dir")]
    pub infra_dir: PathBuf,
    /// Terraform output holding the service name
    #[serde(default = "default_service_output")]
    pub service_output: String,
    /// Terraform output holding the public DNS name
    #[serde(default = "default_endpoint_output")]
    pub endpoint_output: String,
    /// Extra environment variables passed to the container
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            region: default_region(),
            profile: default_profile(),
        }
    }
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            root: default_workspace_root(),
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            default_port: default_port(),
            python_image: default_python_image(),
            node_image: default_node_image(),
            placeholder_image: default_placeholder_image(),
        }
    }
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            desired_count: default_desired_count(),
            infra_dir: default_infra_dir(),
            service_output: default_service_output(),
            endpoint_output: default_endpoint_output(),
            env: BTreeMap::new(),
        }
    }
}

impl HoistConfig {
    /// Load from hoist.toml in the given directory, or return defaults if not found.
    pub fn load(project_dir: &std::path::Path) -> crate::Result<Self> {
        let config_path = project_dir.join(CONFIG_FILE);
        if config_path.exists() {
            let content =
                std::fs::read_to_string(&config_path).map_err(|e| crate::Error::ConfigLoad {
                    path: config_path.clone(),
                    source: e,
                })?;
            let config: Self =
                toml::from_str(&content).map_err(|e| crate::Error::ConfigParse {
                    path: config_path.clone(),
                    source: e,
                })?;
            config.validate(&config_path)?;
            tracing::debug!(path = %config_path.display(), "loaded config");
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Reject values that parse but cannot be used.
    fn validate(&self, path: &std::path::Path) -> crate::Result<()> {
        if self.build.default_port < MIN_PORT {
            return Err(crate::Error::ConfigInvalid {
                path: path.to_path_buf(),
                reason: format!(
                    "[build].default_port must be between {MIN_PORT} and 65535, got {}",
                    self.build.default_port
                ),
            });
        }
        Ok(())
    }

    /// Path of the release descriptor handed to Terraform.
    pub fn descriptor_path(&self) -> PathBuf {
        self.deploy.infra_dir.join(crate::descriptor::DESCRIPTOR_FILE)
    }
}

fn default_app_name() -> String {
    "hello-world".to_owned()
}

fn default_region() -> String {
    "us-east-1".to_owned()
}

fn default_profile() -> String {
    "default".to_owned()
}

fn default_workspace_root() -> PathBuf {
    PathBuf::from(".workdir")
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_python_image() -> String {
    "python:3.11-slim".to_owned()
}

fn default_node_image() -> String {
    "node:20-slim".to_owned()
}

fn default_placeholder_image() -> String {
    "alpine:3.20".to_owned()
}

fn default_desired_count() -> u32 {
    1
}

fn default_infra_dir() -> PathBuf {
    PathBuf::from("infra")
}

fn default_service_output() -> String {
    "service_name".to_owned()
}

fn default_endpoint_output() -> String {
    "alb_dns_name".to_owned()
}
