use crate::notice::Notice;
use crate::report::client::ReportClient;
use crate::report::form::QueryForm;
use crate::report::models::{DataSource, Query};
use crate::report::preview::{PreviewKind, PreviewUpdate};
use tracing::error;

/// Query card nested in a section
#[derive(Debug, Clone)]
pub struct QueryEditor {
    pub template_id: String,
    pub template_title: String,
    pub section_id: String,
    pub query: Query,
    pub data_sources: Vec<DataSource>,
}

impl QueryEditor {
    pub fn new(
        template_id: impl Into<String>,
        template_title: impl Into<String>,
        section_id: impl Into<String>,
        query: Query,
    ) -> Self {
        Self {
            template_id: template_id.into(),
            template_title: template_title.into(),
            section_id: section_id.into(),
            query,
            data_sources: Vec::new(),
        }
    }

    /// Fill the data-source choices
    pub async fn load_data_sources(&mut self, client: &ReportClient) -> Option<Notice> {
        match client.list_data_sources(0).await {
            Ok(sources) => {
                self.data_sources = sources;
                None
            }
            Err(e) => {
                error!("Error fetching data sources: {}", e);
                Some(Notice::error(
                    "Failed to fetch data sources. Please try again later.",
                ))
            }
        }
    }

    pub async fn submit(&mut self, client: &ReportClient, form: QueryForm) -> Notice {
        if let Err(e) = form.validate() {
            return Notice::error(e.user_message());
        }

        let updated = Query {
            sql: form.sql,
            description: form.description.unwrap_or_else(|| self.query.description.clone()),
            data_source_id: form.data_source_id,
            section_id: self.section_id.clone(),
            ..self.query.clone()
        };

        match client.upsert_query(&self.section_id, &updated).await {
            Ok(_) => {
                self.query = updated;
                Notice::success(format!("Query {} updated successfully", self.query.id))
            }
            Err(e) => {
                error!("Error saving query: {}", e);
                Notice::error(format!(
                    "Failed to save query {}: {}",
                    self.query.id,
                    e.user_message()
                ))
            }
        }
    }

    pub async fn delete(&mut self, client: &ReportClient) -> Notice {
        if self.query.id.is_empty() {
            return Notice::error("Cannot delete a query without an ID");
        }

        match client.delete_query(&self.query.id).await {
            Ok(()) => Notice::success(format!("Query {} deleted successfully", self.query.id)),
            Err(e) => {
                error!("Error deleting query: {}", e);
                Notice::error(format!(
                    "Failed to delete query {}: {}",
                    self.query.id,
                    e.user_message()
                ))
            }
        }
    }

    pub fn preview(&self) -> PreviewUpdate {
        PreviewUpdate::target(PreviewKind::Query, self.query.id.clone())
            .with_template(self.template_id.clone(), self.template_title.clone())
    }
}
