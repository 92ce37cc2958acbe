use std::io::Write;
use std::path::{Path, PathBuf};

use hoist_core::{BuildConfig, Ecosystem};
use tracing::{debug, info};

use crate::dockerfile::DockerfileGenerator;

pub const DOCKERFILE: &str = "Dockerfile";

/// What happened to one generated file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthOutcome {
    /// The file did not exist and was created.
    Written,
    /// A file was already there and was left untouched.
    Kept,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthReport {
    pub path: &'static str,
    pub outcome: SynthOutcome,
}

/// Create `root/relative` with `content` unless something already exists there.
///
/// The file is opened with create-new semantics, so an existing file is never
/// truncated even if it appears between a check and the write.
pub fn write_if_absent(
    root: &Path,
    relative: &str,
    content: &str,
) -> Result<SynthOutcome, SynthError> {
    let path = root.join(relative);

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| SynthError::CreateDir {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let file = match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
    {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            debug!(path = %path.display(), "keeping existing file");
            return Ok(SynthOutcome::Kept);
        }
        Err(e) => return Err(SynthError::Write { path, source: e }),
    };

    fill_new_file(&path, file, content)?;

    info!(path = %path.display(), "synthesized file");
    Ok(SynthOutcome::Written)
}

/// Write `content` to the freshly created `path`. On failure the partial file
/// is removed so a later run creates it again instead of keeping it.
fn fill_new_file(path: &Path, mut out: impl Write, content: &str) -> Result<(), SynthError> {
    let written = out.write_all(content.as_bytes()).and_then(|()| out.flush());
    drop(out);
    let source = match written {
        Ok(()) => return Ok(()),
        Err(e) => e,
    };
    match std::fs::remove_file(path) {
        Ok(()) => {
            debug!(path = %path.display(), "removed partially written file");
            Err(SynthError::Write {
                path: path.to_path_buf(),
                source,
            })
        }
        Err(cleanup) => Err(SynthError::PartialWrite {
            path: path.to_path_buf(),
            source,
            cleanup,
        }),
    }
}

/// Minimal runtime scaffolding for an ecosystem, as (relative path, content).
pub fn runtime_artifacts(ecosystem: Ecosystem) -> &'static [(&'static str, &'static str)] {
    match ecosystem {
        Ecosystem::Python => &[
            ("requirements.txt", PYTHON_REQUIREMENTS),
            ("app.py", PYTHON_APP),
        ],
        Ecosystem::Node => &[("package.json", NODE_PACKAGE), ("index.js", NODE_INDEX)],
        Ecosystem::Unknown => &[],
    }
}

/// Write whichever runtime files the ecosystem needs and the tree lacks.
pub fn ensure_runtime_files(
    ecosystem: Ecosystem,
    source_dir: &Path,
) -> Result<Vec<SynthReport>, SynthError> {
    runtime_artifacts(ecosystem)
        .iter()
        .map(|&(path, content)| {
            let outcome = write_if_absent(source_dir, path, content)?;
            Ok(SynthReport { path, outcome })
        })
        .collect()
}

/// Write a Dockerfile for the ecosystem unless the tree already has one.
pub fn ensure_dockerfile(
    config: &BuildConfig,
    ecosystem: Ecosystem,
    port: u16,
    source_dir: &Path,
) -> Result<SynthOutcome, SynthError> {
    let content = DockerfileGenerator::new(config, ecosystem, port).render();
    write_if_absent(source_dir, DOCKERFILE, &content)
}

const PYTHON_REQUIREMENTS: &str = "flask\ngunicorn\n";

const PYTHON_APP: &str = r#"from flask import Flask

app = Flask(__name__)


@app.get("/")
def index():
    return "ok"


@app.get("/healthz")
def healthz():
    return "ok"
"#;

const NODE_PACKAGE: &str = r#"{
  "name": "app",
  "version": "1.0.0",
  "private": true,
  "scripts": {
    "start": "node index.js"
  }
}
"#;

const NODE_INDEX: &str = r#"const http = require("http");

const port = process.env.PORT || 8080;

http
  .createServer((_req, res) => {
    res.end("ok");
  })
  .listen(port);
"#;

#[derive(Debug, thiserror::Error)]
pub enum SynthError {
    #[error("failed to create directory {path}")]
    CreateDir { path: PathBuf, source: std::io::Error },

    #[error("failed to write {path}")]
    Write { path: PathBuf, source: std::io::Error },

    #[error("failed to write {path} and could not remove the partial file: {cleanup}")]
    PartialWrite {
        path: PathBuf,
        source: std::io::Error,
        cleanup: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    /// Accepts a few bytes, then fails like a full disk.
    struct ShortWriter {
        room: usize,
    }

    impl Write for ShortWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.room == 0 {
                return Err(io::Error::other("no space left on device"));
            }
            let n = buf.len().min(self.room);
            self.room -= n;
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn failed_write_removes_partial_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(DOCKERFILE);
        std::fs::write(&path, "FROM").unwrap();

        let err = fill_new_file(&path, ShortWriter { room: 4 }, "FROM node:20-slim\n").unwrap_err();

        assert!(matches!(err, SynthError::Write { .. }), "{err:?}");
        assert!(!path.exists());
    }

    #[test]
    fn next_run_recreates_file_after_failed_write() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(DOCKERFILE);
        std::fs::write(&path, "FROM").unwrap();
        fill_new_file(&path, ShortWriter { room: 4 }, "FROM node:20-slim\n").unwrap_err();

        let outcome = write_if_absent(dir.path(), DOCKERFILE, "FROM node:20-slim\n").unwrap();

        assert_eq!(outcome, SynthOutcome::Written);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "FROM node:20-slim\n");
    }

    #[test]
    fn failed_cleanup_reports_both_errors() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("never-created");

        let err = fill_new_file(&path, ShortWriter { room: 0 }, "x").unwrap_err();

        match err {
            SynthError::PartialWrite { source, cleanup, .. } => {
                assert_eq!(source.kind(), io::ErrorKind::Other);
                assert_eq!(cleanup.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("expected PartialWrite, got {other:?}"),
        }
    }

    #[test]
    fn complete_write_keeps_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("ok.txt");
        let file = std::fs::File::create(&path).unwrap();

        fill_new_file(&path, file, "hello").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello");
    }
}
