//! # SAPA IIIF
//!
//! Builds [IIIF Presentation 3](https://iiif.io/api/presentation/3.0/)
//! manifests for digitized items of the Swiss Archive of the Performing Arts
//! and publishes them to object storage for presentation viewers.
//!
//! # Architecture
//!
//! A manifest is built in four steps, each a plain function over
//! `serde_json::Value` trees:
//!
//! ```text
//! 1. Base      config            →  organization block (context, rights, provider)
//! 2. Canvases  image descriptors →  one Canvas per image (sizes resolved in parallel)
//! 3. Manifest  base + canvases   →  merged, pruned Manifest
//! 4. Store     manifest          →  S3 bucket or local directory
//! ```
//!
//! Builders write `null` for anything absent and a single recursive
//! [`prune`](prune::prune) pass removes it, so the builders read like the JSON
//! they produce.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`iiif`] | Base block, canvas and manifest builders |
//! | [`multilingual`] | Language maps: expanding plain text across languages, metadata entries |
//! | [`prune`] | Recursive removal of `null`, `[]` and `{}`; shallow merge |
//! | [`resolver`] | `info.json` dimension lookups behind the `DimensionResolver` trait |
//! | [`storage`] | `StorageSink` trait with S3 and local directory sinks |
//! | [`job`] | Load a job, build its manifest, store it |
//! | [`types`] | Job file and image descriptor types |
//! | [`config`] | Layered `sapa-iiif.toml` loading and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Lenient Per Image, Strict Per Manifest
//!
//! An image whose size cannot be resolved is logged and left out; the rest of
//! the manifest is still built. A manifest with no images left is an error and
//! is never stored.
//!
//! ## Closed Multilingual Types
//!
//! Labels and metadata values are enums ([`multilingual::LocalizedText`],
//! [`multilingual::MetadataValue`]) deserialized straight from job JSON, so
//! malformed shapes fail at load time instead of producing odd documents.
//!
//! ## Blocking I/O
//!
//! Dimension lookups use a blocking HTTP client on the rayon pool. There is no
//! async runtime; the pool size comes from `[processing] max_processes`.

pub mod config;
pub mod iiif;
pub mod job;
pub mod multilingual;
pub mod output;
pub mod prune;
pub mod resolver;
pub mod storage;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
