use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to load config from {path}")]
    ConfigLoad {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config at {path}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid config at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    // ── Workspace ──
    #[error("failed to create workspace directory {path}")]
    WorkspaceCreate {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to remove workspace directory {path}")]
    WorkspaceReset {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Release descriptor ──
    #[error("failed to write release descriptor at {path}")]
    DescriptorWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read release descriptor at {path}")]
    DescriptorRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed release descriptor at line {line}: {reason}")]
    DescriptorParse { line: usize, reason: String },
}
