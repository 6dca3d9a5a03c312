//! Report builder records, mirrored from the backend's JSON

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Fresh client-side identifier
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Root object of a report
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Template {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionType {
    #[default]
    Llm,
    Text,
    Chart,
    Table,
}

impl SectionType {
    pub const ALL: [SectionType; 4] = [
        SectionType::Llm,
        SectionType::Text,
        SectionType::Chart,
        SectionType::Table,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionType::Llm => "llm",
            SectionType::Text => "text",
            SectionType::Chart => "chart",
            SectionType::Table => "table",
        }
    }
}

impl fmt::Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SectionType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "Unknown section type '{}' (expected one of llm, text, chart, table)",
                    s
                )
            })
    }
}

/// A block within a template
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Section {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub section_template: String,
    #[serde(default)]
    pub example: String,
    #[serde(default)]
    pub section_type: SectionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionResponse {
    #[serde(flatten)]
    pub section: Section,
    #[serde(default)]
    pub template_id: String,
}

/// SQL backing a section (one per section)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Query {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub sql: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub data_source_id: String,
    #[serde(default)]
    pub section_id: String,
}

impl Query {
    /// Blank query with a fresh id, used when a section has none yet
    pub fn empty() -> Self {
        Self {
            id: new_id(),
            ..Default::default()
        }
    }
}

/// Read-only reference data for the data-source select
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSource {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub connection_string: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::One(s)) if s.is_empty() => Vec::new(),
        Some(OneOrMany::One(s)) => vec![s],
        Some(OneOrMany::Many(v)) => v,
        None => Vec::new(),
    })
}

/// Transformation applied to query results
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProcessingStep {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub function_name: String,
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub parameters: serde_json::Value,
    #[serde(default, alias = "output_key", deserialize_with = "one_or_many")]
    pub outputs: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqlPredictRequest {
    pub original_sql: String,
    pub description: String,
    pub old_title: String,
    pub new_title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SqlPredictResponse {
    pub predicted_sql: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqlSearchRequest {
    pub sql: String,
    pub data_source_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SqlSearchResponse {
    #[serde(default)]
    pub result: Vec<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateStepsRequest {
    pub section: Section,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_source_example: Option<serde_json::Value>,
}
