//! Image dimension lookup.
//!
//! Canvases need the pixel size of their image. When a caller does not know it,
//! the IIIF Image API answers it: `GET {base}/info.json` returns a JSON document
//! with integer `width` and `height`.
//!
//! The [`DimensionResolver`] trait is the seam between manifest building and the
//! network. The production implementation is [`HttpResolver`]; tests use the
//! mock in [`tests`].
//!
//! A resolver never fails a build. Any error (404, exhausted retries, a body
//! without dimensions) is logged and reported as `None`, and the canvas for
//! that image is dropped.

pub mod http;

pub use http::HttpResolver;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("image service not found")]
    NotFound,
    #[error("unexpected HTTP status {0}")]
    Status(u16),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("invalid info.json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("info.json has no usable {0}")]
    MissingDimension(&'static str),
}

impl ResolveError {
    /// Failures worth another attempt: throttling, gateway and server errors,
    /// and connection-level problems.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Status(status) => matches!(status, 429 | 500 | 502 | 503 | 504),
            Self::Request(err) => err.is_connect() || err.is_timeout(),
            _ => false,
        }
    }
}

/// Pixel size of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Looks up the pixel size of an image service.
///
/// `Sync` so lookups for independent images can run on the rayon pool.
pub trait DimensionResolver: Sync {
    /// Size of the image at `base_url`, or `None` if it cannot be determined.
    fn resolve(&self, base_url: &str) -> Option<Dimensions>;
}

/// `info.json` URL for an image service base, ignoring trailing slashes.
pub fn info_url(base_url: &str) -> String {
    format!("{}/info.json", crate::iiif::trim_trailing_slash(base_url))
}
