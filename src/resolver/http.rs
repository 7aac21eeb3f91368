//! `info.json` lookups over HTTP with bounded retry.
//!
//! Transient failures (HTTP 429/500/502/503/504, connection errors, timeouts)
//! are retried with exponential backoff up to `resolver.max_retries` times.
//! A 404 means the image service does not exist and is never retried.

use super::{DimensionResolver, Dimensions, ResolveError, info_url};
use crate::config::ResolverConfig;
use backon::{BlockingRetryable, ExponentialBuilder};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Blocking HTTP resolver. Cheap to share across rayon workers by reference.
pub struct HttpResolver {
    client: Client,
    backoff: ExponentialBuilder,
}

impl HttpResolver {
    pub fn new(config: &ResolverConfig) -> Result<Self, ResolveError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()?;
        let backoff = ExponentialBuilder::default()
            .with_min_delay(config.min_delay())
            .with_max_delay(config.max_delay())
            .with_max_times(config.max_retries);
        Ok(Self { client, backoff })
    }

    /// Fetch dimensions, retrying transient failures.
    pub fn fetch_dimensions(&self, base_url: &str) -> Result<Dimensions, ResolveError> {
        let url = info_url(base_url);
        let attempt = || self.fetch_once(&url);
        attempt
            .retry(self.backoff)
            .sleep(std::thread::sleep)
            .when(ResolveError::is_transient)
            .notify(|err: &ResolveError, delay: Duration| {
                warn!(
                    url = %url,
                    delay_ms = delay.as_millis(),
                    error = %err,
                    "retrying info.json request"
                );
            })
            .call()
    }

    fn fetch_once(&self, url: &str) -> Result<Dimensions, ResolveError> {
        let response = self.client.get(url).send()?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ResolveError::NotFound);
        }
        if !status.is_success() {
            return Err(ResolveError::Status(status.as_u16()));
        }
        let body = response.bytes()?;
        let info: Value = serde_json::from_slice(&body)?;
        Ok(Dimensions {
            width: read_dimension(&info, "width")?,
            height: read_dimension(&info, "height")?,
        })
    }
}

impl DimensionResolver for HttpResolver {
    fn resolve(&self, base_url: &str) -> Option<Dimensions> {
        match self.fetch_dimensions(base_url) {
            Ok(dimensions) => {
                debug!(
                    base_url,
                    width = dimensions.width,
                    height = dimensions.height,
                    "resolved image dimensions"
                );
                Some(dimensions)
            }
            Err(ResolveError::NotFound) => {
                warn!(url = %info_url(base_url), "image service does not exist");
                None
            }
            Err(err) => {
                warn!(url = %info_url(base_url), error = %err, "could not resolve image dimensions");
                None
            }
        }
    }
}

/// Read a positive pixel count. Image servers disagree on whether these are
/// integers, floats or strings, so all three are accepted.
fn read_dimension(info: &Value, field: &'static str) -> Result<u32, ResolveError> {
    let raw = match info.get(field) {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    raw.and_then(|n| u32::try_from(n).ok())
        .filter(|n| *n > 0)
        .ok_or(ResolveError::MissingDimension(field))
}
