//! Domain types shared by retrievers, filters and the search orchestrator.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::flavor::FlavorVector;

pub type DocId = String;
pub type Meta = HashMap<String, MetaValue>;

/// Metadata key -> expected value. Matching is exact and case-insensitive;
/// an empty map filters nothing.
pub type FilterSpec = BTreeMap<String, String>;

/// Free-text negative terms, in the order the user gave them.
pub type ExclusionSpec = Vec<String>;

/// A metadata value as stored alongside a document (roast, origin, price...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Text(String),
    Number(f64),
}

impl MetaValue {
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Self::Text(s) => Cow::Borrowed(s.as_str()),
            Self::Number(n) => Cow::Owned(n.to_string()),
        }
    }
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl From<&str> for MetaValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for MetaValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// A coffee-bean record as held by the index collaborators.
///
/// - `id`: stable source identity, also the deduplication key
/// - `text`: the flavor description that gets embedded and lexically indexed
/// - `metadata`: structured attributes used by exact-match filters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub text: String,
    #[serde(default)]
    pub metadata: Meta,
}

impl Document {
    pub fn new(id: impl Into<DocId>, text: impl Into<String>) -> Self {
        Self { id: id.into(), text: text.into(), metadata: Meta::new() }
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<MetaValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// True when every `(key, value)` of `filters` is present in the metadata
    /// and equal ignoring case. A missing key fails the filter.
    pub fn matches_filters(&self, filters: &FilterSpec) -> bool {
        filters.iter().all(|(key, expected)| {
            self.metadata
                .get(key)
                .is_some_and(|value| value.as_text().to_lowercase() == expected.to_lowercase())
        })
    }
}

impl AsRef<Document> for Document {
    fn as_ref(&self) -> &Document {
        self
    }
}

/// Indicates which engine produced a result.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Vector,
    Text,
    Hybrid,
}

/// A document as returned by one retriever. `score` is engine-specific but
/// higher is always better. `source` labels the origin engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub document: Document,
    pub score: f32,
    pub source: SourceKind,
}

impl SearchHit {
    pub fn new(document: Document, score: f32, source: SourceKind) -> Self {
        Self { document, score, source }
    }
}

impl AsRef<Document> for SearchHit {
    fn as_ref(&self) -> &Document {
        &self.document
    }
}

/// A search result handed back to callers. Lives for one search call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedResult {
    pub document: Document,
    /// 1-based position in the final ranking.
    pub rank: usize,
    /// Fused or semantic score before any penalty.
    pub score: f32,
    pub rejection_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flavor_profile: Option<FlavorVector>,
}

impl RankedResult {
    /// Score after subtracting the weighted rejection penalty, if any.
    pub fn final_score(&self, rejection_weight: f32) -> f32 {
        self.score - rejection_weight * self.rejection_penalty.unwrap_or(0.0)
    }
}

impl From<SearchHit> for RankedResult {
    fn from(hit: SearchHit) -> Self {
        Self { document: hit.document, rank: 0, score: hit.score, rejection_penalty: None, flavor_profile: None }
    }
}

impl AsRef<Document> for RankedResult {
    fn as_ref(&self) -> &Document {
        &self.document
    }
}

/// Input handed to the embedding layer: either plain text or a structured
/// prompt-like value that must be flattened first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextInput {
    Plain(String),
    Structured(serde_json::Value),
}

impl TextInput {
    /// Canonical string form used by every downstream consumer.
    ///
    /// Structured values yield their `text` field when present, otherwise all
    /// string leaves in document order joined by single spaces.
    pub fn canonical(&self) -> String {
        match self {
            Self::Plain(s) => s.clone(),
            Self::Structured(value) => {
                if let Some(text) = value.get("text").and_then(|v| v.as_str()) {
                    return text.to_string();
                }
                let mut parts = Vec::new();
                collect_strings(value, &mut parts);
                parts.join(" ")
            }
        }
    }
}

fn collect_strings<'a>(value: &'a serde_json::Value, out: &mut Vec<&'a str>) {
    match value {
        serde_json::Value::String(s) => out.push(s),
        serde_json::Value::Array(items) => items.iter().for_each(|v| collect_strings(v, out)),
        serde_json::Value::Object(map) => map.values().for_each(|v| collect_strings(v, out)),
        _ => {}
    }
}

impl From<&str> for TextInput {
    fn from(value: &str) -> Self {
        Self::Plain(value.to_string())
    }
}

impl From<String> for TextInput {
    fn from(value: String) -> Self {
        Self::Plain(value)
    }
}
