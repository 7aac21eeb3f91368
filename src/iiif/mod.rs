//! IIIF Presentation 3 document builders.
//!
//! | Builder | Produces |
//! |---|---|
//! | [`base_metadata`] | Organization-wide block shared by every manifest (context, rights, provider) |
//! | [`build_canvas`] | One `Canvas` per image: thumbnail, rendering, annotation page |
//! | [`build_manifest`] | The `Manifest`: base block + manifest metadata + canvases |
//!
//! Builders emit `null` for anything the caller did not supply and rely on
//! [`prune`](crate::prune::prune) to remove it, so each builder reads like the
//! document it produces.
//!
//! All image URLs follow the IIIF Image API 3 pattern
//! `{service}/{region}/{size}/{rotation}/{quality}.{format}`.

mod base;
mod canvas;
mod manifest;

pub use base::{BaseSettings, base_metadata};
pub use canvas::{build_canvas, build_canvases, canvas_id};
pub use manifest::{
    ManifestError, ManifestOptions, build_manifest, build_manifest_from_images,
};

pub const PRESENTATION_CONTEXT: &str = "http://iiif.io/api/presentation/3/context.json";

/// Strip trailing slashes so `https://img/a/` and `https://img/a` build the
/// same URLs. Idempotent.
pub fn trim_trailing_slash(url: &str) -> &str {
    url.trim_end_matches('/')
}

/// Full-resolution JPEG of an image service.
pub(crate) fn full_image_url(service: &str) -> String {
    format!("{service}/full/max/0/default.jpg")
}

/// `ImageService3` reference at the given compliance profile.
pub(crate) fn image_service(service: &str, profile: &str) -> serde_json::Value {
    serde_json::json!({
        "id": service,
        "type": "ImageService3",
        "profile": profile,
    })
}
