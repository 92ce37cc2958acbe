//! Heuristic ecosystem and port detection over an unstructured source tree.
//!
//! Both detectors are ordered rule lists: the first rule that matches decides.
//! Neither can fail. An unreadable tree resolves to [`Ecosystem::Unknown`]
//! and the caller's default port.

use hoist_core::{DEFAULT_PORT, DetectionResult, Ecosystem, MIN_PORT};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Files at or above this size are left out of the port scan.
pub const MAX_SCAN_BYTES: u64 = 200_000;

/// Directories never descended into.
const SKIPPED_DIRS: &[&str] = &[".git", "node_modules", "__pycache__", ".venv"];

// ── Ecosystem ──

struct EcosystemRule {
    name: &'static str,
    matches: fn(&Path) -> bool,
    ecosystem: Ecosystem,
}

const ECOSYSTEM_RULES: &[EcosystemRule] = &[
    EcosystemRule {
        name: "node manifest",
        matches: has_node_manifest,
        ecosystem: Ecosystem::Node,
    },
    EcosystemRule {
        name: "python manifest",
        matches: has_python_manifest,
        ecosystem: Ecosystem::Python,
    },
    EcosystemRule {
        name: "python sources",
        matches: has_python_sources,
        ecosystem: Ecosystem::Python,
    },
    EcosystemRule {
        name: "javascript sources",
        matches: has_javascript_sources,
        ecosystem: Ecosystem::Node,
    },
];

pub const NODE_MANIFEST: &str = "package.json";
pub const PYTHON_MANIFESTS: &[&str] = &["requirements.txt", "pyproject.toml"];

fn has_node_manifest(root: &Path) -> bool {
    root.join(NODE_MANIFEST).is_file()
}

fn has_python_manifest(root: &Path) -> bool {
    PYTHON_MANIFESTS.iter().any(|m| root.join(m).is_file())
}

fn has_python_sources(root: &Path) -> bool {
    has_extension(root, "py")
}

fn has_javascript_sources(root: &Path) -> bool {
    has_extension(root, "js")
}

fn has_extension(root: &Path, ext: &str) -> bool {
    source_files(root).any(|entry| {
        entry
            .path()
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case(ext))
    })
}

/// Infer the runtime family of the tree rooted at `source_dir`.
pub fn detect_ecosystem(source_dir: &Path) -> Ecosystem {
    for rule in ECOSYSTEM_RULES {
        if (rule.matches)(source_dir) {
            debug!(rule = rule.name, ecosystem = %rule.ecosystem, "ecosystem rule matched");
            return rule.ecosystem;
        }
    }
    debug!(dir = %source_dir.display(), "no ecosystem rule matched");
    Ecosystem::Unknown
}

// ── Port ──

struct PortPattern {
    name: &'static str,
    regex: Regex,
}

/// Port patterns in priority order. Capture group 1 is the port.
const PORT_PATTERN_SOURCES: &[(&str, &str)] = &[
    ("port assignment", r"(?:PORT|port)\s*[:=]\s*(\d{2,5})"),
    ("listen call", r"listen\(\s*(\d{2,5})"),
    ("run keyword", r"run\(host=.*?port\s*=\s*(\d{2,5})"),
];

static PORT_PATTERNS: LazyLock<Result<Vec<PortPattern>, regex::Error>> = LazyLock::new(|| {
    PORT_PATTERN_SOURCES
        .iter()
        .map(|&(name, pattern)| Regex::new(pattern).map(|regex| PortPattern { name, regex }))
        .collect()
});

impl PortPattern {
    /// First capture in `text` that is a usable port number.
    fn extract(&self, text: &str) -> Option<u16> {
        self.regex
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            // arch-lint: allow(no-silent-result-drop) reason="an unparsable capture is simply not a port"
            .filter_map(|m| m.as_str().parse::<u16>().ok())
            .find(|port| *port >= MIN_PORT)
    }
}

/// Search `text` with each port pattern in priority order.
pub fn port_from_text(text: &str) -> Option<u16> {
    let patterns = match PORT_PATTERNS.as_ref() {
        Ok(p) => p,
        Err(e) => {
            warn!(error = %e, "port patterns unavailable, skipping port scan");
            return None;
        }
    };
    patterns.iter().find_map(|pattern| {
        let port = pattern.extract(text)?;
        debug!(pattern = pattern.name, port, "port pattern matched");
        Some(port)
    })
}

/// Concatenated text of every small, UTF-8 file under `source_dir`.
///
/// Unreadable, oversized, and binary files are skipped.
pub fn scan_text(source_dir: &Path) -> String {
    let mut text = String::new();
    for entry in source_files(source_dir) {
        let size = match entry.metadata() {
            Ok(meta) => meta.len(),
            Err(e) => {
                debug!(path = %entry.path().display(), error = %e, "skipping file without metadata");
                continue;
            }
        };
        if size >= MAX_SCAN_BYTES {
            continue;
        }

        let bytes = match std::fs::read(entry.path()) {
            Ok(b) => b,
            Err(e) => {
                debug!(path = %entry.path().display(), error = %e, "skipping unreadable file");
                continue;
            }
        };
        let content = match String::from_utf8(bytes) {
            Ok(c) => c,
            Err(e) => {
                debug!(path = %entry.path().display(), error = %e.utf8_error(), "skipping non-text file");
                continue;
            }
        };
        text.push_str(&content);
        text.push('\n');
    }
    text
}

/// Infer the port the service listens on, falling back to `default`.
///
/// A `default` below [`MIN_PORT`] is replaced by [`DEFAULT_PORT`].
pub fn detect_port(source_dir: &Path, default: u16) -> u16 {
    let default = if default < MIN_PORT {
        warn!(default, fallback = DEFAULT_PORT, "default port out of range");
        DEFAULT_PORT
    } else {
        default
    };
    match port_from_text(&scan_text(source_dir)) {
        Some(port) => port,
        None => {
            debug!(default, "no port found in sources, using default");
            default
        }
    }
}

/// Run both detectors.
pub fn inspect(source_dir: &Path, default_port: u16) -> DetectionResult {
    DetectionResult {
        ecosystem: detect_ecosystem(source_dir),
        listen_port: detect_port(source_dir, default_port),
    }
}

// ── Tree walk ──

fn source_files(root: &Path) -> impl Iterator<Item = DirEntry> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_skipped_dir(e))
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(e) => {
                debug!(error = %e, "skipping unreadable directory entry");
                None
            }
        })
        .filter(|e| e.file_type().is_file())
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| SKIPPED_DIRS.contains(&name))
}
