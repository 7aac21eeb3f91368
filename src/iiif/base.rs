//! Organization-wide manifest block.
//!
//! Every SAPA manifest carries the same context, rights statement, homepage
//! and provider. This block is built once per run and merged under the
//! manifest-specific fields.

use super::PRESENTATION_CONTEXT;
use crate::config::ManifestConfig;
use crate::multilingual::{Languages, LocalizedText, expand};
use crate::prune::prune;
use serde_json::{Value, json};

const HOMEPAGE: &str = "https://sapa.swiss";
const PROVIDER_ID: &str = "https://www.wikidata.org/entity/Q50920401";
const PROVIDER_HOMEPAGE: &str = "https://sapa.swiss/";
const PROVIDER_LOGO: &str = "https://memobase.ch/sites/default/files/2021-05/sap-logo.jpg";

/// Inputs for [`base_metadata`].
#[derive(Debug, Clone)]
pub struct BaseSettings {
    pub rights: String,
    pub copyright: Option<String>,
    pub languages: Languages,
}

impl From<&ManifestConfig> for BaseSettings {
    fn from(config: &ManifestConfig) -> Self {
        Self {
            rights: config.rights.clone(),
            copyright: config.copyright.clone(),
            languages: config.languages.clone(),
        }
    }
}

impl Default for BaseSettings {
    fn default() -> Self {
        Self::from(&ManifestConfig::default())
    }
}

/// Build the shared block. `requiredStatement` only appears with a copyright.
pub fn base_metadata(settings: &BaseSettings) -> Value {
    let required_statement = settings.copyright.as_deref().map(|copyright| {
        json!({
            "label": expand(Some(&LocalizedText::from("Copyright")), &settings.languages),
            "value": expand(Some(&LocalizedText::from(copyright)), &settings.languages),
        })
    });

    prune(json!({
        "@context": PRESENTATION_CONTEXT,
        "type": "Manifest",
        "rights": settings.rights,
        "homepage": [{
            "id": HOMEPAGE,
            "type": "Text",
            "label": {"en": ["SAPA Homepage"]},
            "format": "text/html",
        }],
        "requiredStatement": required_statement,
        "provider": [provider()],
        "viewingDirection": "left-to-right",
    }))
}

fn provider() -> Value {
    json!({
        "id": PROVIDER_ID,
        "type": "Agent",
        "label": {
            "en": ["SAPA, Swiss Archive of the Performing Arts"],
            "de": ["Stiftung SAPA, Schweizer Archiv der Darstellenden Künste"],
            "fr": ["Fondation SAPA, Archives suisses des arts de la scène"],
            "it": ["Fondazione SAPA, Archivio svizzero delle arti della scena"],
        },
        "homepage": [{
            "id": PROVIDER_HOMEPAGE,
            "type": "Text",
            "label": {
                "en": ["The SAPA Foundation, Swiss Archive of the Performing Arts, collects documents and objects of importance to the history of the performing arts and makes them accessible to a wider audience."],
                "de": ["Die Stiftung SAPA, Schweizer Archiv der Darstellenden Künste, sammelt Dokumente und Objekte, die für die Geschichte der Darstellenden Künste bedeutsam sind, und stellt diese einem breiten Publikum zur Verfügung."],
                "fr": ["La Fondation SAPA, Archives suisses des arts de la scène, collecte et met à disposition de tous les publics les documents et objets constituant l‘histoire des arts de la scène en Suisse. Sa mission: préserver les traces de ces arts éphémères et complexes pour les transmettre aux générations futures."],
                "it": ["SAPA raccoglie e mette a disposizione del pubblico documenti e oggetti di rilevanza storica per le arti sceniche in Svizzera. La Fondazione si pone l’obiettivo di preservare le tracce di queste arti effimere e complesse per tramandarle alle generazioni future."],
            },
            "format": "text/html",
        }],
        "logo": [{
            "id": PROVIDER_LOGO,
            "type": "Image",
            "format": "image/jpeg",
            "height": 100,
            "width": 260,
        }],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(value: &Value) -> Vec<&str> {
        value
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect()
    }

    #[test]
    fn default_block_shape() {
        let base = base_metadata(&BaseSettings::default());
        assert_eq!(
            keys(&base),
            vec![
                "@context",
                "type",
                "rights",
                "homepage",
                "provider",
                "viewingDirection"
            ]
        );
        assert_eq!(base["@context"], PRESENTATION_CONTEXT);
        assert_eq!(base["type"], "Manifest");
        assert_eq!(base["rights"], "http://creativecommons.org/licenses/by-sa/4.0/");
        assert_eq!(base["viewingDirection"], "left-to-right");
    }

    #[test]
    fn no_copyright_means_no_required_statement() {
        let base = base_metadata(&BaseSettings::default());
        assert!(base.get("requiredStatement").is_none());
    }

    #[test]
    fn copyright_adds_required_statement() {
        let settings = BaseSettings {
            copyright: Some("© Stiftung SAPA".to_string()),
            languages: Languages::new(["en", "de"]),
            ..BaseSettings::default()
        };
        let base = base_metadata(&settings);
        assert_eq!(
            base["requiredStatement"],
            json!({
                "label": {"en": ["Copyright"], "de": ["Copyright"]},
                "value": {"en": ["© Stiftung SAPA"], "de": ["© Stiftung SAPA"]},
            })
        );
    }

    #[test]
    fn custom_rights() {
        let settings = BaseSettings {
            rights: "http://rightsstatements.org/vocab/InC/1.0/".to_string(),
            ..BaseSettings::default()
        };
        assert_eq!(
            base_metadata(&settings)["rights"],
            "http://rightsstatements.org/vocab/InC/1.0/"
        );
    }

    #[test]
    fn provider_is_sapa_agent() {
        let base = base_metadata(&BaseSettings::default());
        let provider = &base["provider"][0];
        assert_eq!(provider["type"], "Agent");
        assert_eq!(provider["id"], PROVIDER_ID);
        assert_eq!(keys(&provider["label"]), vec!["en", "de", "fr", "it"]);
        assert_eq!(provider["logo"][0]["width"], 260);
    }
}
