//! Manifest assembly.
//!
//! A manifest is the organization-wide base block with the manifest-specific
//! fields merged over it (right-hand side wins), then pruned once:
//!
//! ```text
//! base_metadata ∪ { id, label, summary, seeAlso, metadata, thumbnail, items }
//! ```
//!
//! `metadata` is always ordered identifier → description → creator.

use super::{build_canvases, image_service, trim_trailing_slash};
use crate::multilingual::{Languages, LocalizedText, MetadataValue, build_metadata_entries, expand};
use crate::prune::{merge_shallow, prune};
use crate::resolver::DimensionResolver;
use crate::types::{ImageDescriptor, RecordLink};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::debug;

const DEFAULT_RECORD_LABEL: &str = "Record on Swiss Performing Arts Platform";

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Manifest-specific inputs. Everything is optional.
#[derive(Debug, Clone, Default)]
pub struct ManifestOptions {
    /// Image service used for the manifest thumbnail.
    pub thumbnail_base_url: Option<String>,
    pub label: Option<LocalizedText>,
    pub summary: Option<LocalizedText>,
    pub record: Option<RecordLink>,
    pub identifier: MetadataValue,
    pub description: MetadataValue,
    pub creator: MetadataValue,
    pub languages: Languages,
}

fn identifier_label() -> LocalizedText {
    LocalizedText::by_language([
        ("en", "Identifier"),
        ("de", "Signatur"),
        ("fr", "Cote"),
        ("it", "Segnatura"),
    ])
}

fn description_label() -> LocalizedText {
    LocalizedText::by_language([
        ("en", "Description"),
        ("de", "Beschreibung"),
        ("fr", "Description"),
        ("it", "Descrizione"),
    ])
}

fn creator_label() -> LocalizedText {
    LocalizedText::by_language([
        ("en", "Creator"),
        ("de", "Urheber"),
        ("fr", "Auteur"),
        ("it", "Autore"),
    ])
}

fn metadata_entries(options: &ManifestOptions) -> Vec<Value> {
    let languages = &options.languages;
    let mut entries = build_metadata_entries(&options.identifier, &identifier_label(), languages);
    entries.extend(build_metadata_entries(
        &options.description,
        &description_label(),
        languages,
    ));
    entries.extend(build_metadata_entries(
        &options.creator,
        &creator_label(),
        languages,
    ));
    entries
}

fn record_see_also(record: &RecordLink) -> Value {
    json!({
        "id": record.uri,
        "type": "Text",
        "label": {"en": [record.label.as_deref().unwrap_or(DEFAULT_RECORD_LABEL)]},
        "format": "text/html",
    })
}

fn manifest_thumbnail(base_url: &str) -> Value {
    let service = trim_trailing_slash(base_url);
    json!([{
        "id": format!("{service}/full/80,/0/default.jpg"),
        "type": "Image",
        "format": "image/jpeg",
        "service": [image_service(service, "level2")],
    }])
}

/// Assemble a manifest from already-built canvases.
///
/// `items` must hold at least one canvas; `null` slots are ignored.
pub fn build_manifest(
    manifest_base_url: &str,
    items: Vec<Value>,
    base_metadata: &Value,
    options: &ManifestOptions,
) -> Result<Value, ManifestError> {
    if items.iter().all(Value::is_null) {
        return Err(ManifestError::InvalidArgument(
            "at least one image required".to_string(),
        ));
    }
    let manifest_base_url = trim_trailing_slash(manifest_base_url);

    let fields = json!({
        "id": format!("{manifest_base_url}.json"),
        "label": expand(options.label.as_ref(), &options.languages),
        "summary": expand(options.summary.as_ref(), &options.languages),
        "seeAlso": [options.record.as_ref().map(record_see_also)],
        "metadata": metadata_entries(options),
        "thumbnail": options.thumbnail_base_url.as_deref().map(manifest_thumbnail),
        "items": items,
    });

    Ok(prune(merge_shallow(base_metadata.clone(), fields)))
}

/// Resolve, build and assemble a manifest straight from image descriptors.
///
/// Images whose dimensions cannot be resolved are dropped. If none survive
/// the build fails rather than publishing a manifest without pictures. The
/// first image is the manifest thumbnail unless `options` names one.
pub fn build_manifest_from_images(
    manifest_base_url: &str,
    images: &[ImageDescriptor],
    base_metadata: &Value,
    options: &ManifestOptions,
    resolver: &impl DimensionResolver,
) -> Result<Value, ManifestError> {
    let Some(first) = images.first() else {
        return Err(ManifestError::InvalidArgument(
            "at least one image required".to_string(),
        ));
    };

    let canvases = build_canvases(images, manifest_base_url, resolver, &options.languages);
    let items: Vec<Value> = canvases.into_iter().flatten().collect();
    debug!(
        manifest = manifest_base_url,
        requested = images.len(),
        built = items.len(),
        "canvases built"
    );

    let mut options = options.clone();
    if options.thumbnail_base_url.is_none() {
        options.thumbnail_base_url = Some(first.base_url.clone());
    }
    build_manifest(manifest_base_url, items, base_metadata, &options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iiif::{BaseSettings, base_metadata, build_canvas};
    use crate::resolver::tests::MockResolver;

    const MANIFEST: &str = "https://x/manifest";

    fn base() -> Value {
        base_metadata(&BaseSettings::default())
    }

    fn one_canvas() -> Vec<Value> {
        let descriptor = ImageDescriptor::new("https://img/a").with_dimensions(1000, 800);
        vec![
            build_canvas(
                &descriptor,
                1,
                MANIFEST,
                &MockResolver::new(),
                &Languages::default(),
            )
            .unwrap(),
        ]
    }

    fn keys(value: &Value) -> Vec<&str> {
        value
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect()
    }

    // =========================================================================
    // Preconditions
    // =========================================================================

    #[test]
    fn empty_items_rejected() {
        let result = build_manifest(MANIFEST, vec![], &base(), &ManifestOptions::default());
        let err = result.unwrap_err();
        assert!(matches!(err, ManifestError::InvalidArgument(_)));
        assert!(err.to_string().contains("at least one image required"));
    }

    #[test]
    fn all_null_items_rejected() {
        let result = build_manifest(
            MANIFEST,
            vec![Value::Null, Value::Null],
            &base(),
            &ManifestOptions::default(),
        );
        assert!(matches!(result, Err(ManifestError::InvalidArgument(_))));
    }

    #[test]
    fn empty_image_list_rejected() {
        let result = build_manifest_from_images(
            MANIFEST,
            &[],
            &base(),
            &ManifestOptions::default(),
            &MockResolver::new(),
        );
        assert!(matches!(result, Err(ManifestError::InvalidArgument(_))));
    }

    // =========================================================================
    // Shape
    // =========================================================================

    #[test]
    fn minimal_manifest_shape() {
        let manifest =
            build_manifest(MANIFEST, one_canvas(), &base(), &ManifestOptions::default()).unwrap();

        assert_eq!(manifest["id"], "https://x/manifest.json");
        assert_eq!(manifest["type"], "Manifest");
        assert_eq!(
            keys(&manifest),
            vec![
                "@context",
                "type",
                "rights",
                "homepage",
                "provider",
                "viewingDirection",
                "id",
                "items"
            ]
        );
    }

    #[test]
    fn manifest_id_ignores_trailing_slash() {
        let manifest = build_manifest(
            "https://x/manifest/",
            one_canvas(),
            &base(),
            &ManifestOptions::default(),
        )
        .unwrap();
        assert_eq!(manifest["id"], "https://x/manifest.json");
    }

    #[test]
    fn label_and_summary_expanded() {
        let options = ManifestOptions {
            label: Some(LocalizedText::from("Programmheft 1952")),
            summary: Some(LocalizedText::by_language([("de", "Saison 1952/53")])),
            languages: Languages::new(["de", "fr"]),
            ..ManifestOptions::default()
        };
        let manifest = build_manifest(MANIFEST, one_canvas(), &base(), &options).unwrap();
        assert_eq!(
            manifest["label"],
            json!({"de": ["Programmheft 1952"], "fr": ["Programmheft 1952"]})
        );
        assert_eq!(manifest["summary"], json!({"de": ["Saison 1952/53"]}));
    }

    #[test]
    fn record_link_default_and_custom_label() {
        let mut options = ManifestOptions {
            record: Some(RecordLink::new("https://performing-arts.ch/r/9")),
            ..ManifestOptions::default()
        };
        let manifest = build_manifest(MANIFEST, one_canvas(), &base(), &options).unwrap();
        assert_eq!(
            manifest["seeAlso"],
            json!([{
                "id": "https://performing-arts.ch/r/9",
                "type": "Text",
                "label": {"en": [DEFAULT_RECORD_LABEL]},
                "format": "text/html",
            }])
        );

        options.record = Some(RecordLink {
            uri: "https://performing-arts.ch/r/9".to_string(),
            label: Some("Catalog entry".to_string()),
        });
        let manifest = build_manifest(MANIFEST, one_canvas(), &base(), &options).unwrap();
        assert_eq!(manifest["seeAlso"][0]["label"], json!({"en": ["Catalog entry"]}));
    }

    #[test]
    fn metadata_order_is_identifier_description_creator() {
        let options = ManifestOptions {
            creator: MetadataValue::from(vec!["A", "B"]),
            description: MetadataValue::from("Poster"),
            identifier: MetadataValue::from("SAPA-1"),
            ..ManifestOptions::default()
        };
        let manifest = build_manifest(MANIFEST, one_canvas(), &base(), &options).unwrap();
        let metadata = manifest["metadata"].as_array().unwrap();
        let labels: Vec<&str> = metadata
            .iter()
            .map(|m| m["label"]["en"][0].as_str().unwrap())
            .collect();
        assert_eq!(
            labels,
            vec!["Identifier", "Description", "Creator", "Creator"]
        );
        assert_eq!(metadata[0]["value"]["en"], json!(["SAPA-1"]));
        assert_eq!(metadata[2]["value"]["it"], json!(["A"]));
        assert_eq!(metadata[3]["value"]["it"], json!(["B"]));
        assert_eq!(metadata[0]["label"]["de"], json!(["Signatur"]));
    }

    #[test]
    fn absent_metadata_fields_are_pruned() {
        let options = ManifestOptions {
            creator: MetadataValue::from("Someone"),
            ..ManifestOptions::default()
        };
        let manifest = build_manifest(MANIFEST, one_canvas(), &base(), &options).unwrap();
        let metadata = manifest["metadata"].as_array().unwrap();
        assert_eq!(metadata.len(), 1);
        assert_eq!(metadata[0]["label"]["fr"], json!(["Auteur"]));
    }

    #[test]
    fn thumbnail_from_options() {
        let options = ManifestOptions {
            thumbnail_base_url: Some("https://img/a/".to_string()),
            ..ManifestOptions::default()
        };
        let manifest = build_manifest(MANIFEST, one_canvas(), &base(), &options).unwrap();
        assert_eq!(
            manifest["thumbnail"],
            json!([{
                "id": "https://img/a/full/80,/0/default.jpg",
                "type": "Image",
                "format": "image/jpeg",
                "service": [{"id": "https://img/a", "type": "ImageService3", "profile": "level2"}],
            }])
        );
    }

    #[test]
    fn manifest_fields_override_base() {
        let base = json!({"type": "Manifest", "id": "stale", "rights": "cc"});
        let manifest =
            build_manifest(MANIFEST, one_canvas(), &base, &ManifestOptions::default()).unwrap();
        assert_eq!(manifest["id"], "https://x/manifest.json");
        assert_eq!(keys(&manifest), vec!["type", "id", "rights", "items"]);
    }

    // =========================================================================
    // build_manifest_from_images()
    // =========================================================================

    #[test]
    fn single_image_end_to_end() {
        let images = vec![ImageDescriptor::new("https://img/a").with_dimensions(1000, 800)];
        let manifest = build_manifest_from_images(
            MANIFEST,
            &images,
            &base(),
            &ManifestOptions::default(),
            &MockResolver::new(),
        )
        .unwrap();

        let items = manifest["items"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        let canvas = &items[0];
        assert_eq!(canvas["width"], 1000);
        assert_eq!(canvas["height"], 800);
        assert_eq!(canvas["thumbnail"].as_array().unwrap().len(), 1);
        assert_eq!(canvas["rendering"].as_array().unwrap().len(), 1);
        let annotations = canvas["items"][0]["items"].as_array().unwrap();
        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[0]["motivation"], "painting");
        assert_eq!(
            annotations[0]["body"]["id"],
            "https://img/a/full/max/0/default.jpg"
        );

        assert_eq!(
            manifest["thumbnail"][0]["id"],
            "https://img/a/full/80,/0/default.jpg"
        );
    }

    #[test]
    fn unresolved_images_are_dropped_keeping_positions() {
        let resolver = MockResolver::new().with("https://img/c", 300, 400);
        let images = vec![
            ImageDescriptor::new("https://img/a").with_dimensions(10, 10),
            ImageDescriptor::new("https://img/b"),
            ImageDescriptor::new("https://img/c"),
        ];
        let manifest = build_manifest_from_images(
            MANIFEST,
            &images,
            &base(),
            &ManifestOptions::default(),
            &resolver,
        )
        .unwrap();

        let ids: Vec<&str> = manifest["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["https://x/manifest/p001", "https://x/manifest/p003"]);
    }

    #[test]
    fn sole_unresolved_image_fails_the_build() {
        let images = vec![ImageDescriptor::new("https://img/gone")];
        let result = build_manifest_from_images(
            MANIFEST,
            &images,
            &base(),
            &ManifestOptions::default(),
            &MockResolver::new(),
        );
        assert!(matches!(result, Err(ManifestError::InvalidArgument(_))));
    }

    #[test]
    fn explicit_thumbnail_is_kept() {
        let images = vec![ImageDescriptor::new("https://img/a").with_dimensions(10, 10)];
        let options = ManifestOptions {
            thumbnail_base_url: Some("https://img/cover".to_string()),
            ..ManifestOptions::default()
        };
        let manifest =
            build_manifest_from_images(MANIFEST, &images, &base(), &options, &MockResolver::new())
                .unwrap();
        assert_eq!(
            manifest["thumbnail"][0]["service"][0]["id"],
            "https://img/cover"
        );
    }

    #[test]
    fn manifest_is_fully_pruned() {
        let images = vec![ImageDescriptor::new("https://img/a").with_dimensions(10, 10)];
        let manifest = build_manifest_from_images(
            MANIFEST,
            &images,
            &base(),
            &ManifestOptions::default(),
            &MockResolver::new(),
        )
        .unwrap();
        assert_eq!(prune(manifest.clone()), manifest);
        assert!(manifest.get("seeAlso").is_none());
        assert!(manifest.get("metadata").is_none());
        assert!(manifest.get("label").is_none());
    }
}
