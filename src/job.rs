//! Running a job: load it, build its manifest, persist the result.
//!
//! ```text
//! job.json → ManifestJob → canvases (parallel lookups) → manifest → sink
//! ```
//!
//! A job without a sink is a dry run; the manifest is returned but not stored.

use crate::iiif::{ManifestError, build_manifest_from_images};
use crate::multilingual::Languages;
use crate::resolver::DimensionResolver;
use crate::storage::{StorageError, StorageSink};
use crate::types::{JobError, ManifestJob};
use serde_json::Value;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Job(#[from] JobError),
    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Where a built manifest went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub bucket: String,
    pub key: String,
}

/// Result of one job, for CLI display.
#[derive(Debug, Clone)]
pub struct JobReport {
    pub manifest_id: String,
    pub images: usize,
    pub canvases: usize,
    /// `None` for a dry run.
    pub destination: Option<Destination>,
    pub manifest: Value,
}

impl JobReport {
    /// Images that were dropped because their size could not be resolved.
    pub fn dropped(&self) -> usize {
        self.images - self.canvases
    }
}

/// Build one job's manifest and, given a sink, store it.
pub fn run_job(
    job: &ManifestJob,
    base_metadata: &Value,
    languages: &Languages,
    resolver: &impl DimensionResolver,
    sink: Option<&dyn StorageSink>,
) -> Result<JobReport, BuildError> {
    // Derive the key before any lookups so a bad URL fails fast.
    let key = job.storage_key()?;
    let options = job.manifest_options(languages);
    let manifest = build_manifest_from_images(
        &job.manifest_base_url,
        &job.images,
        base_metadata,
        &options,
        resolver,
    )?;

    let canvases = manifest["items"].as_array().map_or(0, Vec::len);
    let manifest_id = manifest["id"].as_str().unwrap_or_default().to_string();

    let destination = match sink {
        Some(sink) => {
            let bucket = job
                .bucket
                .clone()
                .unwrap_or_else(|| sink.default_bucket().to_string());
            sink.upload_json(&manifest, &key, Some(&bucket))?;
            info!(manifest = %manifest_id, bucket = %bucket, key = %key, "manifest stored");
            Some(Destination { bucket, key })
        }
        None => None,
    };

    Ok(JobReport {
        manifest_id,
        images: job.images.len(),
        canvases,
        destination,
        manifest,
    })
}

/// Load a job file and run it.
pub fn run_job_file(
    path: &Path,
    base_metadata: &Value,
    languages: &Languages,
    resolver: &impl DimensionResolver,
    sink: Option<&dyn StorageSink>,
) -> Result<JobReport, BuildError> {
    let job = ManifestJob::load(path)?;
    run_job(&job, base_metadata, languages, resolver, sink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iiif::{BaseSettings, base_metadata};
    use crate::resolver::tests::MockResolver;
    use crate::storage::tests::MemorySink;
    use crate::test_helpers::{sample_job, write_job};
    use crate::types::ImageDescriptor;
    use tempfile::TempDir;

    fn base() -> Value {
        base_metadata(&BaseSettings::default())
    }

    #[test]
    fn dry_run_builds_without_storing() {
        let job = sample_job();
        let resolver = MockResolver::new().with("https://img.example/b", 600, 900);

        let report = run_job(&job, &base(), &Languages::default(), &resolver, None).unwrap();

        assert_eq!(report.destination, None);
        assert_eq!(report.images, 2);
        assert_eq!(report.canvases, 2);
        assert_eq!(report.manifest_id, "https://iiif.example/manifests/m1.json");
        assert_eq!(report.manifest["items"][1]["height"], 900);
    }

    #[test]
    fn stores_under_derived_key_and_default_bucket() {
        let job = sample_job();
        let resolver = MockResolver::new().with("https://img.example/b", 600, 900);
        let sink = MemorySink::new();

        let report =
            run_job(&job, &base(), &Languages::default(), &resolver, Some(&sink)).unwrap();

        assert_eq!(
            report.destination,
            Some(Destination {
                bucket: "memory".to_string(),
                key: "manifests/m1.json".to_string(),
            })
        );
        let uploads = sink.get_uploads();
        assert_eq!(uploads.len(), 1);
        let stored: Value = serde_json::from_slice(&uploads[0].2).unwrap();
        assert_eq!(stored, report.manifest);
    }

    #[test]
    fn job_bucket_overrides_sink_default() {
        let mut job = sample_job();
        job.bucket = Some("staging".to_string());
        let resolver = MockResolver::new().with("https://img.example/b", 600, 900);
        let sink = MemorySink::new();

        run_job(&job, &base(), &Languages::default(), &resolver, Some(&sink)).unwrap();

        assert_eq!(sink.get_uploads()[0].0, "staging");
    }

    #[test]
    fn dropped_images_are_counted() {
        let job = sample_job();
        let report = run_job(
            &job,
            &base(),
            &Languages::default(),
            &MockResolver::new(),
            None,
        )
        .unwrap();
        assert_eq!(report.canvases, 1);
        assert_eq!(report.dropped(), 1);
    }

    #[test]
    fn nothing_stored_when_no_image_resolves() {
        let mut job = sample_job();
        job.images = vec![ImageDescriptor::new("https://img.example/gone")];
        let sink = MemorySink::new();

        let result = run_job(
            &job,
            &base(),
            &Languages::default(),
            &MockResolver::new(),
            Some(&sink),
        );

        assert!(matches!(result, Err(BuildError::Manifest(_))));
        assert!(sink.get_uploads().is_empty());
    }

    #[test]
    fn bad_manifest_url_fails_before_lookups() {
        let mut job = sample_job();
        job.manifest_base_url = "https://iiif.example/".to_string();
        let resolver = MockResolver::new();

        let result = run_job(&job, &base(), &Languages::default(), &resolver, None);

        assert!(matches!(result, Err(BuildError::Job(JobError::InvalidUrl(_)))));
        assert!(resolver.get_lookups().is_empty());
    }

    #[test]
    fn run_job_file_reads_json() {
        let tmp = TempDir::new().unwrap();
        let path = write_job(tmp.path(), "job.json", &sample_job());
        let resolver = MockResolver::new().with("https://img.example/b", 1, 1);

        let report =
            run_job_file(&path, &base(), &Languages::default(), &resolver, None).unwrap();
        assert_eq!(report.canvases, 2);
    }

    #[test]
    fn run_job_file_missing_file() {
        let tmp = TempDir::new().unwrap();
        let result = run_job_file(
            &tmp.path().join("missing.json"),
            &base(),
            &Languages::default(),
            &MockResolver::new(),
            None,
        );
        assert!(matches!(result, Err(BuildError::Job(JobError::Io { .. }))));
    }
}
