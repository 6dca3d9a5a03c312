use crate::notice::Notice;
use crate::report::client::ReportClient;
use crate::report::form::TemplateForm;
use crate::report::models::{new_id, Template};
use crate::report::preview::{PreviewKind, PreviewUpdate};
use tracing::error;

/// Template settings card
#[derive(Debug, Clone)]
pub struct TemplateEditor {
    pub template: Template,
}

impl TemplateEditor {
    pub fn new(template: Template) -> Self {
        Self { template }
    }

    /// Start a new template with a generated id
    pub fn blank() -> Self {
        Self::new(Template {
            id: new_id(),
            ..Default::default()
        })
    }

    /// Header text: the current title, or the default label
    pub fn card_title(&self) -> &str {
        if self.template.title.is_empty() {
            "Basic information"
        } else {
            &self.template.title
        }
    }

    /// Save the form. A failed save keeps the edited values in place.
    pub async fn submit(&mut self, client: &ReportClient, form: TemplateForm) -> Notice {
        if let Err(e) = form.validate() {
            return Notice::error(e.user_message());
        }

        if self.template.id.is_empty() {
            self.template.id = new_id();
        }
        self.template.title = form.title;
        self.template.description = form.description;

        match client.upsert_template(&self.template).await {
            Ok(_) => Notice::success(format!(
                "Template {} updated successfully",
                self.template.id
            )),
            Err(e) => {
                error!("Failed to save template {}: {}", self.template.id, e);
                Notice::error(format!("Failed to save template {}", self.template.id))
            }
        }
    }

    pub async fn delete(&mut self, client: &ReportClient) -> Notice {
        if self.template.id.is_empty() {
            return Notice::error("Cannot delete a template without an ID");
        }

        match client.delete_template(&self.template.id).await {
            Ok(()) => Notice::success(format!(
                "Template {} deleted successfully",
                self.template.id
            )),
            Err(e) => {
                error!("Failed to delete template {}: {}", self.template.id, e);
                Notice::error(format!("Failed to delete template {}", self.template.id))
            }
        }
    }

    pub fn preview(&self) -> PreviewUpdate {
        PreviewUpdate::target(PreviewKind::Template, self.template.id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::client::tests::client_for;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_template_submit_failure_keeps_edits() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/report/templates"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let mut editor = TemplateEditor::new(Template {
            id: "t1".to_string(),
            title: "Old".to_string(),
            description: "Old description".to_string(),
        });
        let notice = editor
            .submit(
                &client,
                TemplateForm {
                    title: "New title".to_string(),
                    description: "A much longer description".to_string(),
                },
            )
            .await;

        assert_eq!(notice.description, "Failed to save template t1");
        assert_eq!(editor.template.title, "New title");
        assert_eq!(editor.card_title(), "New title");
    }

    #[tokio::test]
    async fn test_template_delete_requires_id() {
        let server = MockServer::start().await;
        let client = client_for(&server);
        let mut editor = TemplateEditor::new(Template::default());
        let notice = editor.delete(&client).await;
        assert_eq!(notice.description, "Cannot delete a template without an ID");
    }
}
