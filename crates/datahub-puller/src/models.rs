//! STS records and the vocabulary records derived from them
//!
//! STS marks missing data in several ways: an absent key, JSON `null`, an
//! empty string, or the literal string `"null"`. All of them deserialize to
//! `None` here, so the rest of the crate works with plain `Option`s.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Configuration type holding the data commons whose models are pulled
pub const DATA_COMMONS_LIST: &str = "DATA_COMMONS_LIST";
/// Configuration type holding models excluded from pulling
pub const HIDDEN_MODELS: &str = "HIDDEN_MODELS";

/// One property as returned by the STS "all properties" endpoint
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawTermRecord {
    #[serde(default, deserialize_with = "nullable_text")]
    pub property: Option<String>,

    #[serde(default, deserialize_with = "nullable_text")]
    pub model: Option<String>,

    #[serde(default, deserialize_with = "nullable_text")]
    pub version: Option<String>,

    #[serde(rename = "permissibleValues", default, deserialize_with = "pv_entries")]
    pub permissible_values: Vec<PvEntry>,
}

/// One permissible value of a property, with its NCIt annotations
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PvEntry {
    /// Kept even when empty; only a missing or null value is `None`
    #[serde(default, deserialize_with = "pv_value")]
    pub value: Option<String>,

    #[serde(default, deserialize_with = "text_list")]
    pub synonyms: Vec<String>,

    #[serde(default, deserialize_with = "nullable_text")]
    pub ncit_concept_code: Option<String>,
}

/// Permissible values of one property in one model version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyPvRecord {
    pub property: String,
    pub model: Option<String>,
    /// Numeric prefix of the STS version, e.g. "1.2." for "1.2.beta"
    pub version: Option<String>,
    /// `None` when the property has no usable values or they are URLs
    pub permissible_values: Option<Vec<String>>,
}

impl PropertyPvRecord {
    /// The upsert key: property, model and normalized version
    pub fn key(&self) -> (&str, Option<&str>, Option<&str>) {
        (&self.property, self.model.as_deref(), self.version.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynonymRecord {
    pub synonym: String,
    pub permissible_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConceptCodeRecord {
    pub model: Option<String>,
    pub property: String,
    pub permissible_value: Option<String>,
    pub concept_code: String,
}

/// A configuration document listing model or data commons names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationEntry {
    #[serde(rename = "type")]
    pub config_type: String,
    #[serde(default)]
    pub key: Vec<String>,
}

impl ConfigurationEntry {
    pub fn new(config_type: impl Into<String>, key: Vec<String>) -> Self {
        Self {
            config_type: config_type.into(),
            key,
        }
    }
}

/// Render scalars as text; arrays, objects and null have no text form
fn value_to_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn nullable_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .and_then(value_to_text)
        .filter(|s| !s.is_empty() && s != "null"))
}

fn pv_value<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(value_to_text))
}

fn text_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(values.into_iter().filter_map(value_to_text).collect())
}

fn pv_entries<'de, D>(deserializer: D) -> Result<Vec<PvEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<PvEntry>>::deserialize(deserializer)?.unwrap_or_default())
}
