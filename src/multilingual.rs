//! Language maps for IIIF `label`, `summary`, `value` and `requiredStatement`.
//!
//! IIIF Presentation 3 expresses every human-readable string as a language map:
//! `{"en": ["Picture"], "de": ["Bild"]}`. Callers rarely have real
//! translations, so two input shapes are accepted:
//!
//! - **Plain** text is repeated verbatim under every configured language. This
//!   is a structural placeholder so viewers in any UI language show something;
//!   it is not translation.
//! - **By-language** text keeps exactly the languages the caller supplied, in
//!   the order supplied.
//!
//! Metadata fields add a third shape, a list, which becomes one metadata entry
//! per element (e.g. several creators under the same "Creator" label).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// The ordered set of language codes that plain text is expanded into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Languages(Vec<String>);

impl Languages {
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(codes.into_iter().map(Into::into).collect())
    }

    pub fn codes(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for Languages {
    fn default() -> Self {
        Self::new(["en", "de", "fr", "it"])
    }
}

/// Caller-supplied human-readable text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocalizedText {
    Plain(String),
    ByLanguage(IndexMap<String, String>),
}

impl LocalizedText {
    /// Build a by-language text from `(code, text)` pairs, keeping their order.
    pub fn by_language<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self::ByLanguage(
            pairs
                .into_iter()
                .map(|(code, text)| (code.to_string(), text.to_string()))
                .collect(),
        )
    }

    /// True when there is no text at all (empty string or no languages).
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Plain(text) => text.is_empty(),
            Self::ByLanguage(map) => map.is_empty(),
        }
    }
}

impl From<&str> for LocalizedText {
    fn from(text: &str) -> Self {
        Self::Plain(text.to_string())
    }
}

impl From<String> for LocalizedText {
    fn from(text: String) -> Self {
        Self::Plain(text)
    }
}

/// Expand caller text into a IIIF language map; `None` becomes `null`.
pub fn expand(value: Option<&LocalizedText>, languages: &Languages) -> Value {
    match value {
        None => Value::Null,
        Some(LocalizedText::Plain(text)) => Value::Object(
            languages
                .codes()
                .iter()
                .map(|code| (code.clone(), json!([text])))
                .collect::<Map<String, Value>>(),
        ),
        Some(LocalizedText::ByLanguage(map)) => Value::Object(
            map.iter()
                .map(|(code, text)| (code.clone(), json!([text])))
                .collect::<Map<String, Value>>(),
        ),
    }
}

/// A metadata field value: nothing, one value, or several values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    #[default]
    Absent,
    Scalar(String),
    Keyed(IndexMap<String, String>),
    List(Vec<LocalizedText>),
}

impl MetadataValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

impl From<&str> for MetadataValue {
    fn from(text: &str) -> Self {
        Self::Scalar(text.to_string())
    }
}

impl From<Option<&str>> for MetadataValue {
    fn from(text: Option<&str>) -> Self {
        text.map_or(Self::Absent, Self::from)
    }
}

impl From<Vec<&str>> for MetadataValue {
    fn from(items: Vec<&str>) -> Self {
        Self::List(items.into_iter().map(LocalizedText::from).collect())
    }
}

impl From<LocalizedText> for MetadataValue {
    fn from(text: LocalizedText) -> Self {
        match text {
            LocalizedText::Plain(text) => Self::Scalar(text),
            LocalizedText::ByLanguage(map) => Self::Keyed(map),
        }
    }
}

fn metadata_entry(label: &LocalizedText, value: &LocalizedText, languages: &Languages) -> Value {
    json!({
        "label": expand(Some(label), languages),
        "value": expand(Some(value), languages),
    })
}

/// Build `{label, value}` metadata entries for one field.
///
/// An absent value yields `[null]` rather than `[]` so callers can concatenate
/// field lists unconditionally and leave the cleanup to pruning.
pub fn build_metadata_entries(
    value: &MetadataValue,
    label: &LocalizedText,
    languages: &Languages,
) -> Vec<Value> {
    match value {
        MetadataValue::Absent => vec![Value::Null],
        MetadataValue::Scalar(text) => {
            vec![metadata_entry(label, &LocalizedText::Plain(text.clone()), languages)]
        }
        MetadataValue::Keyed(map) => vec![metadata_entry(
            label,
            &LocalizedText::ByLanguage(map.clone()),
            languages,
        )],
        MetadataValue::List(items) => items
            .iter()
            .map(|item| metadata_entry(label, item, languages))
            .collect(),
    }
}
