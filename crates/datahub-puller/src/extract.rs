//! Deduplication of STS records into property PVs, synonyms and concept codes
//!
//! Every function here is pure: the caller hands in the raw records of one
//! pull and gets back fresh collections. Dedup sets live only for the
//! duration of a single [`VocabularyExtractor::extract`] call, so running the
//! same input twice yields the same output.

use crate::error::Result;
use crate::models::{ConceptCodeRecord, PropertyPvRecord, PvEntry, RawTermRecord, SynonymRecord};
use regex::Regex;
use std::collections::HashSet;
use tracing::{error, warn};

const URL_PREFIXES: [&str; 2] = ["http:", "https:"];

/// Knobs for a single extraction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Only build property PV records, skip synonyms and concept codes
    pub properties_only: bool,
}

/// The three deduplicated collections of one pull, in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedVocabulary {
    pub properties: Vec<PropertyPvRecord>,
    pub synonyms: Vec<SynonymRecord>,
    pub concept_codes: Vec<ConceptCodeRecord>,
    /// Records dropped because their version has no numeric prefix
    pub skipped: usize,
}

/// Turns raw STS records into deduplicated vocabulary records
#[derive(Debug, Clone)]
pub struct VocabularyExtractor {
    version_prefix: Regex,
    options: ExtractOptions,
}

impl VocabularyExtractor {
    pub fn new(options: ExtractOptions) -> Result<Self> {
        let version_prefix = Regex::new(r"^[\d.]+")?;
        Ok(Self {
            version_prefix,
            options,
        })
    }

    /// Leading digits-and-dots of an STS version: "1.2.beta" becomes "1.2."
    ///
    /// Returns `None` when the version does not start with a digit or a dot.
    pub fn normalize_version(&self, raw: &str) -> Option<String> {
        self.version_prefix
            .find(raw)
            .map(|m| m.as_str().to_string())
    }

    /// Deduplicate the records of one pull
    ///
    /// Returns `None` when there is nothing to extract, either because the
    /// input is empty or because no record names a property. Records sharing
    /// (property, model, normalized version) collapse to the first one seen;
    /// synonyms and concept codes come only from those first records.
    pub fn extract(&self, records: &[RawTermRecord]) -> Option<ExtractedVocabulary> {
        if records.is_empty() {
            error!("No property/pvs retrieve from STS API.");
            return None;
        }

        let with_property: Vec<(&RawTermRecord, &str)> = records
            .iter()
            .filter_map(|r| r.property.as_deref().map(|p| (r, p)))
            .collect();
        if with_property.is_empty() {
            error!("No property found in STS API results.");
            return None;
        }

        let mut vocabulary = ExtractedVocabulary::default();
        let mut property_keys = HashSet::new();
        let mut synonym_keys = HashSet::new();
        let mut concept_code_keys = HashSet::new();

        for (record, property) in with_property {
            let version = match record.version.as_deref() {
                Some(raw) => match self.normalize_version(raw) {
                    Some(v) => Some(v),
                    None => {
                        warn!(
                            property = %property,
                            model = record.model.as_deref().unwrap_or("-"),
                            version = %raw,
                            "Skipping property with a version that has no numeric prefix"
                        );
                        vocabulary.skipped += 1;
                        continue;
                    }
                },
                None => None,
            };

            let key = (property.to_string(), record.model.clone(), version.clone());
            if !property_keys.insert(key) {
                continue;
            }

            vocabulary.properties.push(PropertyPvRecord {
                property: property.to_string(),
                model: record.model.clone(),
                version,
                permissible_values: extract_pv_list(&record.permissible_values),
            });

            if self.options.properties_only {
                continue;
            }

            for synonym in extract_synonyms(record) {
                if synonym_keys.insert(synonym.clone()) {
                    vocabulary.synonyms.push(synonym);
                }
            }
            for code in extract_concept_codes(record) {
                if concept_code_keys.insert(code.clone()) {
                    vocabulary.concept_codes.push(code);
                }
            }
        }

        Some(vocabulary)
    }
}

/// Permissible values of one property
///
/// `None` unless at least one entry carries a non-empty value. Code lists made
/// of URLs are not vocabularies, so any value starting with `http:` or
/// `https:` discards the whole list.
pub fn extract_pv_list(entries: &[PvEntry]) -> Option<Vec<String>> {
    let has_value = entries
        .iter()
        .any(|e| e.value.as_deref().is_some_and(|v| !v.is_empty()));
    if !has_value {
        return None;
    }

    let values: Vec<&str> = entries.iter().filter_map(|e| e.value.as_deref()).collect();
    if values
        .iter()
        .any(|v| URL_PREFIXES.iter().any(|prefix| v.starts_with(prefix)))
    {
        return None;
    }

    Some(values.into_iter().map(|v| v.trim().to_string()).collect())
}

/// One (synonym, value) pair per non-empty synonym, duplicates included
pub fn extract_synonyms(record: &RawTermRecord) -> Vec<SynonymRecord> {
    record
        .permissible_values
        .iter()
        .flat_map(|entry| {
            entry
                .synonyms
                .iter()
                .filter(|s| !s.is_empty())
                .map(move |s| SynonymRecord {
                    synonym: s.clone(),
                    permissible_value: entry.value.clone(),
                })
        })
        .collect()
}

/// One (model, property, value, code) tuple per entry carrying a concept code
pub fn extract_concept_codes(record: &RawTermRecord) -> Vec<ConceptCodeRecord> {
    let Some(property) = record.property.as_deref() else {
        return Vec::new();
    };

    record
        .permissible_values
        .iter()
        .filter_map(|entry| {
            entry
                .ncit_concept_code
                .as_ref()
                .map(|code| ConceptCodeRecord {
                    model: record.model.clone(),
                    property: property.to_string(),
                    permissible_value: entry.value.clone(),
                    concept_code: code.clone(),
                })
        })
        .collect()
}
