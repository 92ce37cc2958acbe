use crate::executor::{CommandExecutor, RealExecutor, args};
use crate::tool::ToolError;
use std::path::{Path, PathBuf};

/// Source retrieval through the git CLI.
pub struct GitClient<E: CommandExecutor = RealExecutor> {
    executor: E,
}

impl GitClient<RealExecutor> {
    pub fn new() -> Self {
        Self {
            executor: RealExecutor::new(),
        }
    }
}

impl Default for GitClient<RealExecutor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: CommandExecutor> GitClient<E> {
    pub fn with_executor(executor: E) -> Self {
        Self { executor }
    }

    /// Shallow-clone `url` into `dest`. `dest` must be empty or absent.
    pub async fn clone_repo(&self, url: &str, dest: &Path) -> Result<(), RetrievalError> {
        let dest_str = dest
            .to_str()
            .ok_or_else(|| RetrievalError::InvalidPath(dest.to_path_buf()))?;

        tracing::info!(url, dest = dest_str, "cloning repository");
        self.executor
            .exec("git", &args(["clone", "--depth", "1", url, dest_str]))
            .await
            .map_err(|e| RetrievalError::Clone {
                url: url.to_owned(),
                source: e,
            })?;

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("checkout path is not valid UTF-8: {0}")]
    InvalidPath(PathBuf),

    #[error("failed to clone {url}")]
    Clone { url: String, source: ToolError },
}
