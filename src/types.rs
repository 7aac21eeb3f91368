//! Input types shared by the builders and the CLI.
//!
//! A [`ManifestJob`] is the JSON document the `build` command reads: one
//! manifest's metadata plus its ordered images. The same types are used
//! directly by library callers.

use crate::iiif::ManifestOptions;
use crate::multilingual::{Languages, LocalizedText, MetadataValue};
use percent_encoding::percent_decode_str;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum JobError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid job file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid manifest base URL: {0}")]
    InvalidUrl(String),
}

/// One source image, addressed by its IIIF Image API service base URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageDescriptor {
    /// Image service base, e.g. `https://iiif.example/iiif/3/abc`.
    pub base_url: String,
    /// Pixel width. Resolved from `info.json` when this or `height` is missing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<LocalizedText>,
    /// Emit a full-resolution download link on the canvas.
    #[serde(default = "default_true")]
    pub show_rendering: bool,
    /// Catalog record this image belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_uri: Option<String>,
}

fn default_true() -> bool {
    true
}

impl ImageDescriptor {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            width: None,
            height: None,
            label: None,
            show_rendering: true,
            record_uri: None,
        }
    }

    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_label(mut self, label: impl Into<LocalizedText>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_record(mut self, uri: impl Into<String>) -> Self {
        self.record_uri = Some(uri.into());
        self
    }

    pub fn without_rendering(mut self) -> Self {
        self.show_rendering = false;
        self
    }

    /// Both dimensions, if the caller supplied them. A zero counts as
    /// missing, so the image is resolved instead.
    pub fn known_dimensions(&self) -> Option<(u32, u32)> {
        self.width
            .zip(self.height)
            .filter(|(width, height)| *width > 0 && *height > 0)
    }
}

/// Manifest-level link to the catalog record of the digitized item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordLink {
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl RecordLink {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            label: None,
        }
    }
}

/// One manifest to build, as read from a job file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestJob {
    /// Manifest URL without the `.json` suffix; canvas ids hang off it.
    pub manifest_base_url: String,
    /// Storage key. Derived from the manifest URL path when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Target bucket. The storage default bucket when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<LocalizedText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<LocalizedText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record: Option<RecordLink>,
    #[serde(default, skip_serializing_if = "MetadataValue::is_absent")]
    pub identifier: MetadataValue,
    #[serde(default, skip_serializing_if = "MetadataValue::is_absent")]
    pub description: MetadataValue,
    #[serde(default, skip_serializing_if = "MetadataValue::is_absent")]
    pub creator: MetadataValue,
    pub images: Vec<ImageDescriptor>,
}

impl ManifestJob {
    /// Read a job from a JSON file.
    pub fn load(path: &Path) -> Result<Self, JobError> {
        let content = std::fs::read_to_string(path).map_err(|source| JobError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| JobError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Storage key for the manifest document.
    ///
    /// An explicit `key` wins. Otherwise the URL path is used with a `.json`
    /// suffix: `https://host/manifests/abc` → `manifests/abc.json`.
    pub fn storage_key(&self) -> Result<String, JobError> {
        if let Some(key) = &self.key {
            return Ok(key.clone());
        }
        let url = Url::parse(&self.manifest_base_url)
            .map_err(|_| JobError::InvalidUrl(self.manifest_base_url.clone()))?;
        // Url::path() is percent-encoded; object keys use the literal text.
        let path = percent_decode_str(url.path())
            .decode_utf8()
            .map_err(|_| JobError::InvalidUrl(self.manifest_base_url.clone()))?;
        let path = path.trim_matches('/');
        if path.is_empty() {
            return Err(JobError::InvalidUrl(self.manifest_base_url.clone()));
        }
        Ok(format!("{path}.json"))
    }

    /// Manifest-level options for this job. The first image becomes the
    /// manifest thumbnail when the manifest is built.
    pub fn manifest_options(&self, languages: &Languages) -> ManifestOptions {
        ManifestOptions {
            thumbnail_base_url: None,
            label: self.label.clone(),
            summary: self.summary.clone(),
            record: self.record.clone(),
            identifier: self.identifier.clone(),
            description: self.description.clone(),
            creator: self.creator.clone(),
            languages: languages.clone(),
        }
    }
}
