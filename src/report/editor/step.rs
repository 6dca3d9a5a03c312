use crate::notice::Notice;
use crate::report::client::ReportClient;
use crate::report::form::StepForm;
use crate::report::models::{new_id, ProcessingStep};
use tracing::error;

/// Processing-step card
#[derive(Debug, Clone)]
pub struct StepEditor {
    pub section_id: String,
    pub step: ProcessingStep,
}

impl StepEditor {
    pub fn new(section_id: impl Into<String>, step: ProcessingStep) -> Self {
        Self {
            section_id: section_id.into(),
            step,
        }
    }

    pub fn card_title(&self) -> &str {
        if self.step.description.is_empty() {
            "Processing Step"
        } else {
            &self.step.description
        }
    }

    pub async fn submit(&mut self, client: &ReportClient, form: StepForm) -> Notice {
        if let Err(e) = form.validate() {
            return Notice::error(e.user_message());
        }
        let parameters = match form.parsed_parameters() {
            Ok(parameters) => parameters,
            Err(e) => return Notice::error(e.user_message()),
        };

        let updated = ProcessingStep {
            id: if self.step.id.is_empty() {
                new_id()
            } else {
                self.step.id.clone()
            },
            outputs: form.output_keys(),
            function_name: form.function_name,
            description: form.description,
            parameters,
            ..self.step.clone()
        };

        match client.upsert_step(&self.section_id, &updated).await {
            Ok(_) => {
                self.step = updated;
                Notice::success(format!(
                    "Processing step {} updated successfully",
                    self.step.id
                ))
            }
            Err(e) => {
                error!("Failed to save processing step {}: {}", updated.id, e);
                Notice::error(format!("Failed to save processing step {}", updated.id))
            }
        }
    }

    pub async fn delete(&mut self, client: &ReportClient) -> Notice {
        if self.step.id.is_empty() {
            return Notice::error("Cannot delete a processing step without an ID");
        }

        match client.delete_step(&self.step.id).await {
            Ok(()) => Notice::success(format!(
                "Processing step {} deleted successfully",
                self.step.id
            )),
            Err(e) => {
                error!("Failed to delete processing step {}: {}", self.step.id, e);
                Notice::error(format!(
                    "Failed to delete processing step {}",
                    self.step.id
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::client::tests::client_for;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_step_submit_rejects_bad_json_without_request() {
        let server = MockServer::start().await;
        Mock::given(path_regex(".*"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let mut editor = StepEditor::new("s1", ProcessingStep::default());
        let notice = editor
            .submit(
                &client,
                StepForm {
                    function_name: "sum".to_string(),
                    parameters: "{oops".to_string(),
                    outputs: "total".to_string(),
                    description: "Sum amounts".to_string(),
                },
            )
            .await;
        assert_eq!(notice.description, "Parameters must be valid JSON.");
        assert_eq!(editor.card_title(), "Processing Step");
        server.verify().await;
    }

    #[tokio::test]
    async fn test_step_submit_and_delete() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/report/processing_steps"))
            .and(body_partial_json(json!({"id": "p1", "outputs": ["total", "count"]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "p1"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/report/processing_steps/p1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let mut editor = StepEditor::new(
            "s1",
            ProcessingStep {
                id: "p1".to_string(),
                order: 3,
                ..Default::default()
            },
        );
        let notice = editor
            .submit(
                &client,
                StepForm {
                    function_name: "sum".to_string(),
                    parameters: r#"{"column": "amount"}"#.to_string(),
                    outputs: "total, count".to_string(),
                    description: "Sum amounts".to_string(),
                },
            )
            .await;
        assert!(!notice.is_destructive(), "{}", notice);
        assert_eq!(editor.step.order, 3);
        assert_eq!(editor.card_title(), "Sum amounts");

        let notice = editor.delete(&client).await;
        assert_eq!(notice.description, "Processing step p1 deleted successfully");
    }
}
