use chrono::{DateTime, Utc};
use hoist_cloud::PublishResult;
use hoist_core::{DetectionResult, Ecosystem};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{Error, Result};

pub const RECORD_FILE: &str = "release.json";

/// Image tag for `now`: `%Y%m%d%H%M%S` in UTC.
pub fn image_tag_at(now: DateTime<Utc>) -> String {
    now.format("%Y%m%d%H%M%S").to_string()
}

/// Image tag for the current instant.
pub fn default_image_tag() -> String {
    image_tag_at(Utc::now())
}

/// What a successful publish produced. Written for inspection only; nothing
/// reads it back during a deploy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRecord {
    pub app_name: String,
    pub ecosystem: Ecosystem,
    pub port: u16,
    pub image_tag: String,
    pub local_tag: String,
    pub remote_uri: String,
    pub registry_host: String,
    pub created_at: DateTime<Utc>,
}

impl BuildRecord {
    pub fn new(
        app_name: &str,
        image_tag: &str,
        detection: DetectionResult,
        published: &PublishResult,
    ) -> Self {
        Self {
            app_name: app_name.to_owned(),
            ecosystem: detection.ecosystem,
            port: detection.listen_port,
            image_tag: image_tag.to_owned(),
            local_tag: published.local_tag.clone(),
            remote_uri: published.remote_uri.clone(),
            registry_host: published.registry_host.clone(),
            created_at: Utc::now(),
        }
    }

    /// Write as pretty JSON to `{build_dir}/release.json`, replacing any previous record.
    pub fn write(&self, build_dir: &Path) -> Result<PathBuf> {
        let path = build_dir.join(RECORD_FILE);
        let json = serde_json::to_string_pretty(self).map_err(Error::RecordEncode)?;
        std::fs::write(&path, json).map_err(|e| Error::RecordWrite {
            path: path.clone(),
            source: e,
        })?;
        tracing::debug!(path = %path.display(), "build record written");
        Ok(path)
    }
}
