use hoist_build::SynthError;
use hoist_cloud::{ProvisionError, PublishError, RetrievalError};
use std::path::PathBuf;

/// A fatal pipeline failure. Nothing after the failing step has run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] hoist_core::Error),

    #[error("source retrieval failed")]
    Retrieval(#[from] RetrievalError),

    #[error("artifact synthesis failed")]
    Synth(#[from] SynthError),

    #[error("image publish failed")]
    Publish(#[from] PublishError),

    #[error("provisioning failed")]
    Provision(#[from] ProvisionError),

    #[error("failed to encode build record")]
    RecordEncode(#[source] serde_json::Error),

    #[error("failed to write build record {path}")]
    RecordWrite {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
