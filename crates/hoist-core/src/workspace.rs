use std::path::{Path, PathBuf};

/// Scratch directory tree owned by a single pipeline run.
///
/// ```text
/// {root}/
///   source/   checked-out repository, scaffolding is written here
///   build/    build records
/// ```
///
/// Two runs must never share a root concurrently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    root: PathBuf,
    source_dir: PathBuf,
    build_dir: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            source_dir: root.join("source"),
            build_dir: root.join("build"),
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    /// Create every directory that does not exist yet. Existing content is kept.
    pub fn prepare(&self) -> crate::Result<()> {
        for dir in [&self.root, &self.source_dir, &self.build_dir] {
            std::fs::create_dir_all(dir).map_err(|e| crate::Error::WorkspaceCreate {
                path: dir.clone(),
                source: e,
            })?;
        }
        Ok(())
    }

    /// Purge the whole tree and recreate it empty.
    pub fn reset(&self) -> crate::Result<()> {
        if self.root.exists() {
            tracing::info!(root = %self.root.display(), "resetting workspace");
            std::fs::remove_dir_all(&self.root).map_err(|e| crate::Error::WorkspaceReset {
                path: self.root.clone(),
                source: e,
            })?;
        }
        self.prepare()
    }
}
