//! S3-compatible object storage sink.

use super::{StorageError, StorageSink, content_type_for};
use crate::config::StorageConfig;
use ::s3::creds::Credentials;
use ::s3::{Bucket, Region};
use tracing::info;

/// Uploads to an S3-compatible endpoint with path-style addressing
/// (`{endpoint}/{bucket}/{key}`), which SWITCH and most non-AWS stores need.
pub struct S3Sink {
    region: Region,
    credentials: Credentials,
    default_bucket: String,
}

impl S3Sink {
    /// Build a sink from the `[storage]` config and an access key pair.
    ///
    /// Both keys must be non-empty.
    pub fn new(
        config: &StorageConfig,
        access_key: &str,
        secret_key: &str,
    ) -> Result<Self, StorageError> {
        if access_key.trim().is_empty() || secret_key.trim().is_empty() {
            return Err(StorageError::Credentials(
                "access key and secret key are required".into(),
            ));
        }
        let credentials = Credentials::new(Some(access_key), Some(secret_key), None, None, None)
            .map_err(|e| StorageError::Credentials(e.to_string()))?;
        Ok(Self {
            region: Region::Custom {
                region: config.region.clone(),
                endpoint: config.endpoint.clone(),
            },
            credentials,
            default_bucket: config.default_bucket.clone(),
        })
    }

    fn bucket(&self, name: &str) -> Result<Box<Bucket>, StorageError> {
        let bucket = Bucket::new(name, self.region.clone(), self.credentials.clone())?;
        Ok(bucket.with_path_style())
    }
}

impl StorageSink for S3Sink {
    fn default_bucket(&self) -> &str {
        &self.default_bucket
    }

    fn upload(&self, key: &str, body: &[u8], bucket: Option<&str>) -> Result<(), StorageError> {
        let name = bucket.unwrap_or(&self.default_bucket);
        let response =
            self.bucket(name)?
                .put_object_with_content_type(key, body, content_type_for(key))?;
        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(StorageError::Status {
                key: key.to_string(),
                status,
            });
        }
        info!(bucket = name, key, bytes = body.len(), "uploaded document");
        Ok(())
    }
}
