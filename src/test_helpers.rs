//! Shared test utilities: sample jobs and job files.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! let path = write_job(tmp.path(), "job.json", &sample_job());
//! let job = ManifestJob::load(&path).unwrap();
//! assert_eq!(image_urls(&job), ["https://img.example/a", "https://img.example/b"]);
//! ```

use std::path::{Path, PathBuf};

use crate::multilingual::{LocalizedText, MetadataValue};
use crate::types::{ImageDescriptor, ManifestJob, RecordLink};

// =========================================================================
// Fixtures
// =========================================================================

/// A two-image job: the first image has known dimensions, the second
/// (`https://img.example/b`) must be resolved.
pub fn sample_job() -> ManifestJob {
    ManifestJob {
        manifest_base_url: "https://iiif.example/manifests/m1".to_string(),
        key: None,
        bucket: None,
        label: Some(LocalizedText::from("Programmheft")),
        summary: None,
        record: Some(RecordLink::new("https://performing-arts.ch/record/1")),
        identifier: MetadataValue::from("SAPA-1"),
        description: MetadataValue::Absent,
        creator: MetadataValue::from(vec!["Stadttheater Bern"]),
        images: vec![
            ImageDescriptor::new("https://img.example/a").with_dimensions(1000, 800),
            ImageDescriptor::new("https://img.example/b"),
        ],
    }
}

/// Serialize `job` to `{dir}/{name}` and return the path.
pub fn write_job(dir: &Path, name: &str, job: &ManifestJob) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_string_pretty(job).unwrap()).unwrap();
    path
}

// =========================================================================
// Extractors
// =========================================================================

/// Image service URLs of a job, in order.
pub fn image_urls(job: &ManifestJob) -> Vec<&str> {
    job.images.iter().map(|i| i.base_url.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn written_job_round_trips() {
        let tmp = TempDir::new().unwrap();
        let path = write_job(tmp.path(), "job.json", &sample_job());
        let job = ManifestJob::load(&path).unwrap();
        assert_eq!(
            image_urls(&job),
            ["https://img.example/a", "https://img.example/b"]
        );
        assert_eq!(job.creator, sample_job().creator);
    }
}
