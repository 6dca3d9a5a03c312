//! Shared preview selection and the content it resolves to

use super::client::ReportClient;
use super::models::{Query, SqlPredictRequest};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreviewKind {
    Template,
    Section,
    Query,
    ProcessingStep,
    Report,
}

/// What the preview panel is currently pointed at
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PreviewState {
    pub test_title: String,
    pub template_title: String,
    pub template_id: String,
    pub id: String,
    pub kind: Option<PreviewKind>,
}

/// Partial update; unset fields keep their current value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviewUpdate {
    pub test_title: Option<String>,
    pub template_title: Option<String>,
    pub template_id: Option<String>,
    pub id: Option<String>,
    pub kind: Option<PreviewKind>,
}

impl PreviewUpdate {
    pub fn target(kind: PreviewKind, id: impl Into<String>) -> Self {
        Self {
            kind: Some(kind),
            id: Some(id.into()),
            ..Default::default()
        }
    }

    pub fn with_template(mut self, id: impl Into<String>, title: impl Into<String>) -> Self {
        self.template_id = Some(id.into());
        self.template_title = Some(title.into());
        self
    }

    pub fn with_test_title(mut self, title: impl Into<String>) -> Self {
        self.test_title = Some(title.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewContent {
    Placeholder(&'static str),
    Query { query: Query, predicted_sql: String },
    Error(String),
    Empty,
}

impl fmt::Display for PreviewContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreviewContent::Placeholder(label) => write!(f, "{}", label),
            PreviewContent::Query {
                query,
                predicted_sql,
            } => {
                writeln!(f, "Original SQL:\n{}\n", query.sql)?;
                write!(f, "Predicted SQL:\n{}", predicted_sql)
            }
            PreviewContent::Error(message) => write!(f, "Error: {}", message),
            PreviewContent::Empty => write!(f, "Select an item to preview"),
        }
    }
}

impl PreviewState {
    pub fn apply(&mut self, update: PreviewUpdate) {
        if let Some(v) = update.test_title {
            self.test_title = v;
        }
        if let Some(v) = update.template_title {
            self.template_title = v;
        }
        if let Some(v) = update.template_id {
            self.template_id = v;
        }
        if let Some(v) = update.id {
            self.id = v;
        }
        if update.kind.is_some() {
            self.kind = update.kind;
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub async fn render(&self, client: &ReportClient) -> PreviewContent {
        match self.kind {
            Some(PreviewKind::Template) => PreviewContent::Placeholder("Template Preview"),
            Some(PreviewKind::Section) => PreviewContent::Placeholder("Section Preview"),
            Some(PreviewKind::Report) => PreviewContent::Placeholder("Report Preview"),
            Some(PreviewKind::Query) => self.render_query(client).await,
            Some(PreviewKind::ProcessingStep) | None => PreviewContent::Empty,
        }
    }

    async fn render_query(&self, client: &ReportClient) -> PreviewContent {
        let query = match client.get_query(&self.id).await {
            Ok(query) => query,
            Err(e) => {
                error!("Preview failed to fetch query {}: {}", self.id, e);
                return PreviewContent::Error("Failed to fetch data".to_string());
            }
        };

        let request = SqlPredictRequest {
            original_sql: query.sql.clone(),
            description: query.description.clone(),
            old_title: self.template_title.clone(),
            new_title: self.test_title.clone(),
        };
        match client.predict_sql(&request).await {
            Ok(predicted_sql) => PreviewContent::Query {
                query,
                predicted_sql,
            },
            Err(e) => {
                error!("Preview failed to predict SQL: {}", e);
                PreviewContent::Error("Failed to fetch data".to_string())
            }
        }
    }
}
