use crate::executor::{CommandExecutor, RealExecutor, args};
use crate::tool::ToolError;
use secrecy::{ExposeSecret, SecretString};

/// Local container engine operations through the docker CLI.
pub struct DockerClient<E: CommandExecutor = RealExecutor> {
    executor: E,
}

impl DockerClient<RealExecutor> {
    pub fn new() -> Self {
        Self {
            executor: RealExecutor::new(),
        }
    }
}

impl Default for DockerClient<RealExecutor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: CommandExecutor> DockerClient<E> {
    pub fn with_executor(executor: E) -> Self {
        Self { executor }
    }

    /// Authenticate against `registry`. The token goes through stdin, never argv.
    pub async fn login(&self, registry: &str, token: &SecretString) -> Result<(), ToolError> {
        self.executor
            .exec_with_stdin(
                "docker",
                &args(["login", "--username", "AWS", "--password-stdin", registry]),
                token.expose_secret().as_bytes(),
            )
            .await?;
        Ok(())
    }

    pub async fn build(&self, tag: &str, context_dir: &str) -> Result<(), ToolError> {
        let output = self
            .executor
            .exec("docker", &args(["build", "-t", tag, context_dir]))
            .await?;
        tracing::debug!(tag, output = %output.trim_end(), "docker build finished");
        Ok(())
    }

    pub async fn tag(&self, source: &str, target: &str) -> Result<(), ToolError> {
        self.executor
            .exec("docker", &args(["tag", source, target]))
            .await?;
        Ok(())
    }

    pub async fn push(&self, image: &str) -> Result<(), ToolError> {
        let output = self.executor.exec("docker", &args(["push", image])).await?;
        tracing::debug!(image, output = %output.trim_end(), "docker push finished");
        Ok(())
    }
}
