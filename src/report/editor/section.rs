use crate::notice::Notice;
use crate::report::client::ReportClient;
use crate::report::form::SectionForm;
use crate::report::models::{
    new_id, GenerateStepsRequest, ProcessingStep, Query, Section, SqlSearchRequest,
};
use crate::report::preview::{PreviewKind, PreviewUpdate};
use tracing::{debug, error};

/// Section card: the section itself, its query, and its processing steps
#[derive(Debug, Clone)]
pub struct SectionEditor {
    pub template_id: String,
    pub template_title: String,
    /// Record the card was opened with
    pub section: Section,
    /// Last value written locally; reverted if a save fails
    pub saved: Section,
    pub query: Option<Query>,
    pub steps: Vec<ProcessingStep>,
}

impl SectionEditor {
    pub fn new(
        template_id: impl Into<String>,
        template_title: impl Into<String>,
        section: Section,
    ) -> Self {
        Self {
            template_id: template_id.into(),
            template_title: template_title.into(),
            saved: section.clone(),
            section,
            query: None,
            steps: Vec::new(),
        }
    }

    /// Fetch the section's query, falling back to an empty one.
    ///
    /// A 404 falls back silently; any other failure also falls back but
    /// returns a notice.
    pub async fn load_query(&mut self, client: &ReportClient) -> Option<Notice> {
        if self.section.id.is_empty() {
            self.query = Some(Query::empty());
            return None;
        }

        match client.get_query_by_section(&self.section.id).await {
            Ok(query) => {
                self.query = Some(query);
                None
            }
            Err(e) if e.is_not_found() => {
                debug!("Section {} has no query yet", self.section.id);
                self.query = Some(Query::empty());
                None
            }
            Err(e) => {
                error!("Failed to fetch query for section {}: {}", self.section.id, e);
                self.query = Some(Query::empty());
                Some(Notice::error(
                    "Failed to load query data. Using a default query.",
                ))
            }
        }
    }

    /// Load the steps already stored for this section
    pub async fn load_steps(&mut self, client: &ReportClient) -> Option<Notice> {
        if self.section.id.is_empty() {
            return None;
        }
        match client.list_steps(&self.section.id).await {
            Ok(mut steps) => {
                steps.sort_by_key(|s| s.order);
                self.steps = steps;
                None
            }
            Err(e) => Some(Notice::error(e.user_message())),
        }
    }

    pub async fn submit(&mut self, client: &ReportClient, form: SectionForm) -> Notice {
        if let Err(e) = form.validate() {
            return Notice::error(e.user_message());
        }
        if self.template_id.is_empty() {
            return Notice::error("Template ID is required");
        }

        let id = [&self.section.id, &self.saved.id]
            .into_iter()
            .find(|id| !id.is_empty())
            .cloned()
            .unwrap_or_else(new_id);
        let updated = Section {
            id,
            section_template: form.section_template,
            example: form.example,
            section_type: form.section_type,
            ..self.section.clone()
        };

        let previous = std::mem::replace(&mut self.saved, updated);
        match client.upsert_section(&self.template_id, &self.saved).await {
            Ok(_) => Notice::success(format!(
                "Section {} updated successfully",
                self.saved.id
            )),
            Err(e) => {
                self.saved = previous;
                Notice::error(format!(
                    "Failed to save section {}: {}",
                    self.section.id,
                    e.user_message()
                ))
            }
        }
    }

    /// Delete the section; a section that was never saved is left alone
    pub async fn delete(&mut self, client: &ReportClient) -> Option<Notice> {
        if self.section.id.is_empty() || self.template_id.is_empty() {
            return None;
        }

        Some(
            match client.delete_section(&self.template_id, &self.section.id).await {
                Ok(()) => Notice::success(format!(
                    "Section {} deleted successfully",
                    self.section.id
                )),
                Err(e) => {
                    error!("Failed to delete section {}: {}", self.section.id, e);
                    Notice::error(format!("Failed to delete section {}", self.section.id))
                }
            },
        )
    }

    /// Ask the backend for processing steps and replace the current list
    pub async fn generate_steps(&mut self, client: &ReportClient) -> Notice {
        let ready = self
            .query
            .as_ref()
            .filter(|q| !self.template_id.is_empty() && !q.sql.is_empty() && !q.data_source_id.is_empty());
        let Some(query) = ready else {
            return Notice::error("Please ensure all section and query information is complete.");
        };

        let search = SqlSearchRequest {
            sql: query.sql.clone(),
            data_source_id: query.data_source_id.clone(),
        };
        let example = match client.search_sql(&search).await {
            Ok(response) => serde_json::to_value(response.result).ok(),
            Err(e) => {
                error!("Failed to fetch data source example: {}", e);
                return Notice::error(e.user_message());
            }
        };

        let request = GenerateStepsRequest {
            section: self.saved.clone(),
            data_source_example: example,
        };
        match client.generate_steps(&self.saved.id, &request).await {
            Ok(mut steps) => {
                for step in &mut steps {
                    step.section_id = Some(self.saved.id.clone());
                }
                debug!("Generated steps: {:?}", steps);
                self.steps = steps;
                Notice::success("Processing steps generated successfully.")
            }
            Err(e) => {
                error!("Failed to generate processing steps: {}", e);
                Notice::error(e.user_message())
            }
        }
    }

    /// Drop a step from the local list only
    pub fn remove_step(&mut self, step_id: &str) {
        self.steps.retain(|step| step.id != step_id);
    }

    pub fn preview(&self) -> PreviewUpdate {
        PreviewUpdate::target(PreviewKind::Section, self.section.id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::client::tests::client_for;
    use crate::report::models::SectionType;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn section(id: &str) -> Section {
        Section {
            id: id.to_string(),
            section_template: "Revenue by region".to_string(),
            example: "North: 10".to_string(),
            section_type: SectionType::Table,
            description: None,
        }
    }

    fn section_form(text: &str) -> SectionForm {
        SectionForm {
            section_template: text.to_string(),
            example: "East: 4".to_string(),
            section_type: SectionType::Chart,
        }
    }

    #[tokio::test]
    async fn test_load_query_404_creates_empty_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/report/sections/s1/query"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let mut editor = SectionEditor::new("t1", "Weekly", section("s1"));
        let notice = editor.load_query(&client).await;

        assert!(notice.is_none());
        let query = editor.query.expect("query should be set");
        assert!(!query.id.is_empty());
        assert!(query.sql.is_empty());
    }

    #[tokio::test]
    async fn test_load_query_other_error_falls_back_with_notice() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/report/sections/s1/query"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let mut editor = SectionEditor::new("t1", "Weekly", section("s1"));
        let notice = editor.load_query(&client).await.expect("notice expected");

        assert!(notice.is_destructive());
        assert_eq!(
            notice.description,
            "Failed to load query data. Using a default query."
        );
        assert!(editor.query.is_some());
    }

    #[tokio::test]
    async fn test_load_query_for_unsaved_section_skips_request() {
        let server = MockServer::start().await;
        Mock::given(path_regex(".*"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let mut editor = SectionEditor::new("t1", "Weekly", Section::default());
        assert!(editor.load_query(&client).await.is_none());
        assert!(editor.query.is_some());
        server.verify().await;
    }

    #[tokio::test]
    async fn test_load_query_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/report/sections/s1/query"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "q1", "sql": "select 1", "description": "", "data_source_id": "ds1",
                "section_id": "s1"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let mut editor = SectionEditor::new("t1", "Weekly", section("s1"));
        editor.load_query(&client).await;
        assert_eq!(editor.query.unwrap().id, "q1");
    }

    #[tokio::test]
    async fn test_section_submit_failure_reverts_saved() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/report/templates/t1/sections"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let original = section("s1");
        let mut editor = SectionEditor::new("t1", "Weekly", original.clone());
        let notice = editor.submit(&client, section_form("Revenue by month")).await;

        assert!(notice.is_destructive());
        assert!(notice.description.starts_with("Failed to save section s1"));
        assert_eq!(editor.saved, original);
    }

    #[tokio::test]
    async fn test_section_submit_success_assigns_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/report/templates/t1/sections"))
            .and(body_partial_json(json!({"section_type": "chart"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "generated", "section_template": "Revenue by month", "example": "",
                "section_type": "chart", "template_id": "t1"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let mut editor = SectionEditor::new("t1", "Weekly", Section::default());
        let notice = editor.submit(&client, section_form("Revenue by month")).await;

        assert!(!notice.is_destructive());
        assert!(!editor.saved.id.is_empty());
        assert_eq!(editor.saved.section_template, "Revenue by month");
        assert_eq!(editor.saved.section_type, SectionType::Chart);
    }

    #[tokio::test]
    async fn test_section_submit_requires_template_and_valid_form() {
        let server = MockServer::start().await;
        Mock::given(path_regex(".*"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let mut editor = SectionEditor::new("", "", section("s1"));
        let notice = editor.submit(&client, section_form("Revenue")).await;
        assert_eq!(notice.description, "Template ID is required");

        let mut editor = SectionEditor::new("t1", "Weekly", section("s1"));
        let notice = editor.submit(&client, section_form("ab")).await;
        assert_eq!(
            notice.description,
            "Section template must be at least 3 characters."
        );
        server.verify().await;
    }

    #[tokio::test]
    async fn test_section_delete_without_id_is_silent() {
        let server = MockServer::start().await;
        let client = client_for(&server);
        let mut editor = SectionEditor::new("t1", "Weekly", Section::default());
        assert!(editor.delete(&client).await.is_none());
    }

    #[tokio::test]
    async fn test_generate_steps_requires_complete_query() {
        let server = MockServer::start().await;
        Mock::given(path_regex(".*"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let mut editor = SectionEditor::new("t1", "Weekly", section("s1"));
        editor.query = Some(Query {
            sql: "select 1".to_string(),
            ..Query::empty()
        });

        let notice = editor.generate_steps(&client).await;
        assert_eq!(
            notice.description,
            "Please ensure all section and query information is complete."
        );
        server.verify().await;
    }

    #[tokio::test]
    async fn test_generate_steps_replaces_list() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/report/search_sql_by_datasource"))
            .and(body_partial_json(json!({"sql": "select region, amount from sales", "data_source_id": "ds1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": [{"region": "north", "amount": 10}]
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/report/sections/s1/generate_steps"))
            .and(body_partial_json(json!({
                "section": {"id": "s1"},
                "data_source_example": [{"region": "north", "amount": 10}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": "p1", "function_name": "sum", "order": 1, "parameters": {"column": "amount"},
                 "outputs": ["total"], "description": "Total amount"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let mut editor = SectionEditor::new("t1", "Weekly", section("s1"));
        editor.steps = vec![ProcessingStep {
            id: "stale".to_string(),
            ..Default::default()
        }];
        editor.query = Some(Query {
            sql: "select region, amount from sales".to_string(),
            data_source_id: "ds1".to_string(),
            ..Query::empty()
        });

        let notice = editor.generate_steps(&client).await;
        assert!(!notice.is_destructive(), "{}", notice);
        assert_eq!(editor.steps.len(), 1);
        assert_eq!(editor.steps[0].id, "p1");
        assert_eq!(editor.steps[0].section_id.as_deref(), Some("s1"));

        editor.remove_step("p1");
        assert!(editor.steps.is_empty());
    }

    #[tokio::test]
    async fn test_generate_steps_surfaces_backend_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/report/search_sql_by_datasource"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": []})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/report/sections/s1/generate_steps"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(json!({"detail": "LLM quota exceeded"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let mut editor = SectionEditor::new("t1", "Weekly", section("s1"));
        editor.query = Some(Query {
            sql: "select 1".to_string(),
            data_source_id: "ds1".to_string(),
            ..Query::empty()
        });

        let notice = editor.generate_steps(&client).await;
        assert!(notice.is_destructive());
        assert_eq!(notice.description, "LLM quota exceeded");
    }
}
