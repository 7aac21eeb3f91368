//! Canvas construction: one image, one painting annotation.
//!
//! ```text
//! Canvas            {manifest}/p007
//! ├── thumbnail     {image}/full/!300,300/0/default.jpg   (service level2)
//! ├── rendering     {image}/full/max/0/default.jpg, record link
//! ├── seeAlso       record link
//! └── AnnotationPage {manifest}/p007/1
//!     └── Annotation {manifest}/annotation/p007-image  motivation=painting
//!         └── body  {image}/full/max/0/default.jpg     (service level1)
//! ```
//!
//! Canvas ids depend on the 1-based position in the manifest, never on lookup
//! completion order, so [`build_canvases`] can resolve images in parallel.

use super::{full_image_url, image_service, trim_trailing_slash};
use crate::multilingual::{Languages, LocalizedText, expand};
use crate::prune::prune;
use crate::resolver::{DimensionResolver, Dimensions};
use crate::types::ImageDescriptor;
use rayon::prelude::*;
use serde_json::{Value, json};
use tracing::warn;

const THUMBNAIL_EDGE: u32 = 300;
const RECORD_LABEL: &str = "Record on Swiss performing arts platform";

/// `{manifest}/p{index:03}` for a 1-based index.
pub fn canvas_id(manifest_base_url: &str, index: usize) -> String {
    format!("{}/p{index:03}", trim_trailing_slash(manifest_base_url))
}

fn placeholder_label(index: usize) -> LocalizedText {
    LocalizedText::ByLanguage(
        [
            ("de", format!("Bild {index}")),
            ("fr", format!("Image {index}")),
            ("en", format!("Picture {index}")),
            ("it", format!("Immagine {index}")),
        ]
        .into_iter()
        .map(|(code, text)| (code.to_string(), text))
        .collect(),
    )
}

fn rendering_label() -> LocalizedText {
    LocalizedText::by_language([
        ("de", "Bild"),
        ("fr", "Image"),
        ("en", "Picture"),
        ("it", "Immagine"),
    ])
}

fn record_link(uri: &str, language: &str) -> Value {
    json!({
        "id": uri,
        "type": "Text",
        "label": {language: [RECORD_LABEL]},
        "format": "text/html",
    })
}

fn dimensions_for(
    descriptor: &ImageDescriptor,
    service: &str,
    resolver: &impl DimensionResolver,
) -> Option<Dimensions> {
    match descriptor.known_dimensions() {
        Some((width, height)) => Some(Dimensions { width, height }),
        None => resolver.resolve(service),
    }
}

/// Build the canvas for one image at 1-based `index`.
///
/// Returns `None` when the image has no known dimensions and the resolver
/// cannot supply them; the caller drops that image.
pub fn build_canvas(
    descriptor: &ImageDescriptor,
    index: usize,
    manifest_base_url: &str,
    resolver: &impl DimensionResolver,
    languages: &Languages,
) -> Option<Value> {
    let manifest_base_url = trim_trailing_slash(manifest_base_url);
    let service = trim_trailing_slash(&descriptor.base_url);

    let Some(Dimensions { width, height }) = dimensions_for(descriptor, service, resolver) else {
        warn!(image = service, index, "dropping image without dimensions");
        return None;
    };

    let canvas_url = canvas_id(manifest_base_url, index);
    let page_url = format!("{canvas_url}/1");
    let full_url = full_image_url(service);

    let label = match &descriptor.label {
        Some(label) if !label.is_blank() => expand(Some(label), languages),
        _ => expand(Some(&placeholder_label(index)), languages),
    };

    let rendering = descriptor.show_rendering.then(|| {
        json!({
            "id": full_url,
            "type": "Image",
            "label": expand(Some(&rendering_label()), languages),
            "format": "image/jpeg",
        })
    });
    let record_uri = descriptor.record_uri.as_deref();

    Some(prune(json!({
        "id": canvas_url,
        "type": "Canvas",
        "height": height,
        "width": width,
        "label": label,
        "thumbnail": [{
            "id": format!("{service}/full/!{THUMBNAIL_EDGE},{THUMBNAIL_EDGE}/0/default.jpg"),
            "type": "Image",
            "format": "image/jpeg",
            "height": THUMBNAIL_EDGE,
            "width": THUMBNAIL_EDGE,
            "service": [image_service(service, "level2")],
        }],
        "rendering": [
            rendering,
            record_uri.map(|uri| record_link(uri, "en")),
        ],
        "seeAlso": record_uri.map(|uri| json!([record_link(uri, "none")])),
        "items": [{
            "id": page_url,
            "type": "AnnotationPage",
            "items": [{
                "id": format!("{manifest_base_url}/annotation/p{index:03}-image"),
                "type": "Annotation",
                "motivation": "painting",
                "body": {
                    "id": full_url,
                    "type": "Image",
                    "format": "image/jpeg",
                    "height": height,
                    "width": width,
                    "service": [image_service(service, "level1")],
                },
                "target": page_url,
            }],
        }],
    })))
}

/// Build canvases for all images, resolving missing dimensions in parallel.
///
/// The result has one slot per descriptor, in descriptor order; index is
/// position + 1.
pub fn build_canvases(
    descriptors: &[ImageDescriptor],
    manifest_base_url: &str,
    resolver: &impl DimensionResolver,
    languages: &Languages,
) -> Vec<Option<Value>> {
    descriptors
        .par_iter()
        .enumerate()
        .map(|(position, descriptor)| {
            build_canvas(descriptor, position + 1, manifest_base_url, resolver, languages)
        })
        .collect()
}
