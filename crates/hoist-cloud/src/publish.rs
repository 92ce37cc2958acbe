//! Image publishing to ECR.
//!
//! ```text
//! publish()
//!   1. ensure_repository  ── aws ecr describe-repositories || aws ecr create-repository
//!   2. resolve_registry   ── aws ecr get-login-password + aws sts get-caller-identity
//!   3. login              ── docker login --password-stdin {host}
//!   4. build              ── docker build -t {app}:{tag} {context}
//!   5. tag                ── docker tag {app}:{tag} {host}/{app}:{tag}
//!   6. push               ── docker push {host}/{app}:{tag}
//! ```
//!
//! Each step only runs when every earlier step succeeded. Nothing is retried.

use crate::aws::{AuthError, AwsClient, registry_host};
use crate::docker::DockerClient;
use crate::executor::{CommandExecutor, RealExecutor};
use crate::tool::ToolError;
use secrecy::SecretString;
use std::path::{Path, PathBuf};

/// Everything a publish run needs to know.
#[derive(Debug, Clone, Copy)]
pub struct PublishRequest<'a> {
    pub region: &'a str,
    pub profile: &'a str,
    pub app_name: &'a str,
    pub image_tag: &'a str,
    pub context_dir: &'a Path,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishResult {
    pub local_tag: String,
    pub remote_uri: String,
    pub registry_host: String,
}

/// Registry host plus the credential to log in to it.
pub struct RegistryLogin {
    pub host: String,
    pub token: SecretString,
}

/// `{app_name}:{image_tag}`
pub fn local_tag(app_name: &str, image_tag: &str) -> String {
    format!("{app_name}:{image_tag}")
}

/// `{registry_host}/{app_name}:{image_tag}`
pub fn remote_uri(registry_host: &str, app_name: &str, image_tag: &str) -> String {
    format!("{registry_host}/{}", local_tag(app_name, image_tag))
}

pub struct RegistryPublisher<E: CommandExecutor = RealExecutor> {
    aws: AwsClient<E>,
    docker: DockerClient<E>,
}

impl RegistryPublisher<RealExecutor> {
    pub fn new() -> Self {
        Self {
            aws: AwsClient::new(),
            docker: DockerClient::new(),
        }
    }
}

impl Default for RegistryPublisher<RealExecutor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: CommandExecutor> RegistryPublisher<E> {
    pub fn with_clients(aws: AwsClient<E>, docker: DockerClient<E>) -> Self {
        Self { aws, docker }
    }

    pub async fn publish(&self, req: &PublishRequest<'_>) -> Result<PublishResult, PublishError> {
        self.ensure_repository(req).await?;
        let login = self.resolve_registry(req).await?;
        self.login(&login).await?;
        let local = self.build(req).await?;
        let remote = self.tag(req, &local, &login.host).await?;
        self.push(&remote).await?;

        tracing::info!(image = %remote, "image published");
        Ok(PublishResult {
            local_tag: local,
            remote_uri: remote,
            registry_host: login.host,
        })
    }

    // ── Steps ──

    pub async fn ensure_repository(&self, req: &PublishRequest<'_>) -> Result<(), PublishError> {
        if self
            .aws
            .repository_exists(req.app_name, req.region, req.profile)
            .await
        {
            tracing::info!(repository = req.app_name, "repository exists");
            return Ok(());
        }

        tracing::info!(repository = req.app_name, region = req.region, "creating repository");
        self.aws
            .create_repository(req.app_name, req.region, req.profile)
            .await
            .map_err(|e| PublishError::CreateRepository {
                name: req.app_name.to_owned(),
                source: e,
            })
    }

    pub async fn resolve_registry(
        &self,
        req: &PublishRequest<'_>,
    ) -> Result<RegistryLogin, PublishError> {
        let token = self.aws.registry_login_token(req.region, req.profile).await?;
        let account_id = self.aws.current_account_id(req.profile).await?;
        Ok(RegistryLogin {
            host: registry_host(&account_id, req.region),
            token,
        })
    }

    pub async fn login(&self, login: &RegistryLogin) -> Result<(), PublishError> {
        tracing::info!(registry = %login.host, "logging in to registry");
        self.docker
            .login(&login.host, &login.token)
            .await
            .map_err(|e| PublishError::Login {
                registry: login.host.clone(),
                source: e,
            })
    }

    /// Build the image locally and return its local tag.
    pub async fn build(&self, req: &PublishRequest<'_>) -> Result<String, PublishError> {
        let context = req
            .context_dir
            .to_str()
            .ok_or_else(|| PublishError::InvalidContext(req.context_dir.to_path_buf()))?;
        let tag = local_tag(req.app_name, req.image_tag);

        tracing::info!(tag = %tag, context, "building image");
        self.docker
            .build(&tag, context)
            .await
            .map_err(|e| PublishError::Build {
                tag: tag.clone(),
                source: e,
            })?;
        Ok(tag)
    }

    /// Tag the local image for the registry and return the remote URI.
    pub async fn tag(
        &self,
        req: &PublishRequest<'_>,
        local: &str,
        registry_host: &str,
    ) -> Result<String, PublishError> {
        let remote = remote_uri(registry_host, req.app_name, req.image_tag);
        self.docker
            .tag(local, &remote)
            .await
            .map_err(|e| PublishError::Tag {
                local: local.to_owned(),
                remote: remote.clone(),
                source: e,
            })?;
        Ok(remote)
    }

    pub async fn push(&self, remote: &str) -> Result<(), PublishError> {
        tracing::info!(image = remote, "pushing image");
        self.docker
            .push(remote)
            .await
            .map_err(|e| PublishError::Push {
                image: remote.to_owned(),
                source: e,
            })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("failed to create ECR repository '{name}'")]
    CreateRepository { name: String, source: ToolError },

    #[error("registry authentication failed")]
    Auth {
        #[from]
        source: AuthError,
    },

    #[error("docker login to {registry} failed")]
    Login { registry: String, source: ToolError },

    #[error("build context is not valid UTF-8: {0}")]
    InvalidContext(PathBuf),

    #[error("docker build failed for {tag}")]
    Build { tag: String, source: ToolError },

    #[error("docker tag {local} -> {remote} failed")]
    Tag {
        local: String,
        remote: String,
        source: ToolError,
    },

    #[error("docker push failed for {image}")]
    Push { image: String, source: ToolError },
}
