use crate::executor::{CommandExecutor, RealExecutor};
use crate::tool::ToolError;
use std::path::{Path, PathBuf};

/// Provisioning through the terraform CLI, rooted at one module directory.
pub struct TerraformClient<E: CommandExecutor = RealExecutor> {
    executor: E,
    infra_dir: PathBuf,
}

impl TerraformClient<RealExecutor> {
    /// Terraform runs with the AWS profile and region exported to its environment.
    pub fn new(infra_dir: impl Into<PathBuf>, profile: &str, region: &str) -> Self {
        Self {
            executor: RealExecutor::new()
                .with_env("AWS_PROFILE", profile)
                .with_env("AWS_REGION", region),
            infra_dir: infra_dir.into(),
        }
    }
}

impl<E: CommandExecutor> TerraformClient<E> {
    pub fn with_executor(executor: E, infra_dir: impl Into<PathBuf>) -> Self {
        Self {
            executor,
            infra_dir: infra_dir.into(),
        }
    }

    pub fn infra_dir(&self) -> &Path {
        &self.infra_dir
    }

    fn chdir_args(&self, rest: &[&str]) -> Result<Vec<String>, ProvisionError> {
        let dir = self
            .infra_dir
            .to_str()
            .ok_or_else(|| ProvisionError::InvalidPath(self.infra_dir.clone()))?;
        let mut out = vec![format!("-chdir={dir}")];
        out.extend(rest.iter().map(|s| (*s).to_owned()));
        Ok(out)
    }

    pub async fn init(&self) -> Result<(), ProvisionError> {
        let cmd = self.chdir_args(&["init", "-upgrade", "-input=false"])?;
        tracing::info!(dir = %self.infra_dir.display(), "terraform init");
        self.executor
            .exec_streaming("terraform", &cmd)
            .await
            .map_err(|e| ProvisionError::Init { source: e })
    }

    pub async fn apply(&self, vars_file: &Path) -> Result<(), ProvisionError> {
        let var_file = var_file_arg(vars_file)?;
        let cmd = self.chdir_args(&["apply", "-auto-approve", "-input=false", &var_file])?;
        tracing::info!(dir = %self.infra_dir.display(), vars = %vars_file.display(), "terraform apply");
        self.executor
            .exec_streaming("terraform", &cmd)
            .await
            .map_err(|e| ProvisionError::Apply { source: e })
    }

    pub async fn destroy(&self, vars_file: Option<&Path>) -> Result<(), ProvisionError> {
        let var_file = vars_file.map(var_file_arg).transpose()?;
        let mut rest = vec!["destroy", "-auto-approve", "-input=false"];
        if let Some(arg) = var_file.as_deref() {
            rest.push(arg);
        }
        let cmd = self.chdir_args(&rest)?;
        tracing::info!(dir = %self.infra_dir.display(), "terraform destroy");
        self.executor
            .exec_streaming("terraform", &cmd)
            .await
            .map_err(|e| ProvisionError::Destroy { source: e })
    }

    /// Raw value of output `key`, or `None` when the output is undefined or empty.
    pub async fn output(&self, key: &str) -> Result<Option<String>, ProvisionError> {
        let cmd = self.chdir_args(&["output", "-raw", key])?;
        match self.executor.exec("terraform", &cmd).await {
            Ok(value) => {
                let value = value.trim();
                Ok((!value.is_empty()).then(|| value.to_owned()))
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "terraform output unavailable");
                Ok(None)
            }
        }
    }
}

/// `-var-file=` argument. Terraform resolves it after `-chdir`, so it must be absolute.
fn var_file_arg(vars_file: &Path) -> Result<String, ProvisionError> {
    let absolute = std::path::absolute(vars_file).map_err(|e| ProvisionError::ResolvePath {
        path: vars_file.to_path_buf(),
        source: e,
    })?;
    let path = absolute
        .to_str()
        .ok_or_else(|| ProvisionError::InvalidPath(absolute.clone()))?;
    Ok(format!("-var-file={path}"))
}

#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    #[error("path is not valid UTF-8: {0}")]
    InvalidPath(PathBuf),

    #[error("failed to resolve {path}")]
    ResolvePath {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("terraform init failed")]
    Init { source: ToolError },

    #[error("terraform apply failed")]
    Apply { source: ToolError },

    #[error("terraform destroy failed")]
    Destroy { source: ToolError },
}
