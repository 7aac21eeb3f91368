//! Where finished manifests go.
//!
//! | Sink | Target |
//! |------|--------|
//! | [`S3Sink`] | S3-compatible object storage (SWITCH by default), path-style addressing |
//! | [`DirectorySink`] | `{root}/{bucket}/{key}` on the local filesystem |
//!
//! Sinks do not retry. A failed upload is returned to the caller, and
//! uploading the same key twice overwrites.

pub mod directory;
pub mod s3;

pub use directory::DirectorySink;
pub use s3::S3Sink;

use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("S3 error: {0}")]
    S3(#[from] ::s3::error::S3Error),
    #[error("upload of {key} rejected with HTTP status {status}")]
    Status { key: String, status: u16 },
    #[error("invalid storage credentials: {0}")]
    Credentials(String),
}

/// Persists serialized documents under a key.
///
/// `Sync` so one sink can be shared by every job of a run.
pub trait StorageSink: Sync {
    /// Bucket used when the caller does not name one.
    fn default_bucket(&self) -> &str;

    /// Store `body` at `key` in `bucket` (or the default bucket).
    fn upload(&self, key: &str, body: &[u8], bucket: Option<&str>) -> Result<(), StorageError>;

    /// Serialize `value` as UTF-8 JSON and upload it. Non-ASCII text is
    /// written literally, not as `\u` escapes.
    fn upload_json(
        &self,
        value: &Value,
        key: &str,
        bucket: Option<&str>,
    ) -> Result<(), StorageError> {
        let body = serde_json::to_vec(value)?;
        self.upload(key, &body, bucket)
    }
}

/// Content type for a storage key, by extension.
pub(crate) fn content_type_for(key: &str) -> &'static str {
    let extension = key
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("json") => "application/json",
        Some("html" | "htm") => "text/html",
        Some("txt") => "text/plain",
        Some("jpg" | "jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    /// A recorded upload: (bucket, key, body).
    pub type Upload = (String, String, Vec<u8>);

    /// Sink that keeps uploads in memory.
    /// Uses Mutex (not RefCell) so it is Sync like the real sinks.
    #[derive(Default)]
    pub struct MemorySink {
        pub uploads: Mutex<Vec<Upload>>,
    }

    impl MemorySink {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn get_uploads(&self) -> Vec<Upload> {
            self.uploads.lock().unwrap().clone()
        }
    }

    impl StorageSink for MemorySink {
        fn default_bucket(&self) -> &str {
            "memory"
        }

        fn upload(
            &self,
            key: &str,
            body: &[u8],
            bucket: Option<&str>,
        ) -> Result<(), StorageError> {
            let bucket = bucket.unwrap_or(self.default_bucket()).to_string();
            self.uploads
                .lock()
                .unwrap()
                .push((bucket, key.to_string(), body.to_vec()));
            Ok(())
        }
    }

    #[test]
    fn content_type_by_extension() {
        assert_eq!(content_type_for("manifests/a.json"), "application/json");
        assert_eq!(content_type_for("A.JSON"), "application/json");
        assert_eq!(content_type_for("page.html"), "text/html");
        assert_eq!(content_type_for("no-extension"), "application/octet-stream");
    }

    #[test]
    fn upload_json_serializes_literal_utf8() {
        let sink = MemorySink::new();
        let value = serde_json::json!({"label": {"fr": ["Arts de la scène"]}});
        sink.upload_json(&value, "m.json", None).unwrap();

        let uploads = sink.get_uploads();
        assert_eq!(uploads.len(), 1);
        let (bucket, key, body) = &uploads[0];
        assert_eq!(bucket, "memory");
        assert_eq!(key, "m.json");
        let text = String::from_utf8(body.clone()).unwrap();
        assert!(text.contains("scène"));
        assert!(!text.contains("\\u"));
    }

    #[test]
    fn upload_json_honors_explicit_bucket() {
        let sink = MemorySink::new();
        sink.upload_json(&serde_json::json!({}), "k.json", Some("other"))
            .unwrap();
        assert_eq!(sink.get_uploads()[0].0, "other");
    }
}
