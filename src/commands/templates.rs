//! Template commands

use crate::error::Result;
use crate::notice::Notice;
use crate::progress::InFlight;
use crate::report::{
    PreviewContent, PreviewState, ReportClient, Template, TemplateEditor, TemplateForm,
};
use tracing::debug;

pub async fn cmd_list_templates(client: &ReportClient, skip: u32) -> Result<Vec<Template>> {
    let _spinner = InFlight::start("Loading templates...");
    client.list_templates(skip).await
}

pub async fn cmd_get_template(client: &ReportClient, template_id: &str) -> Result<Template> {
    let _spinner = InFlight::start("Loading template...");
    client.get_template(template_id).await
}

/// Create a template (no id) or update an existing one
pub async fn cmd_save_template(
    client: &ReportClient,
    template_id: Option<String>,
    form: TemplateForm,
) -> Result<(Template, Notice)> {
    let mut editor = match template_id {
        Some(id) => TemplateEditor::new(Template {
            id,
            ..Default::default()
        }),
        None => TemplateEditor::blank(),
    };
    debug!("Saving template {}", editor.template.id);

    let notice = {
        let _spinner = InFlight::start("Submitting...");
        editor.submit(client, form).await
    };
    Ok((editor.template, notice))
}

pub async fn cmd_delete_template(client: &ReportClient, template_id: &str) -> Notice {
    let mut editor = TemplateEditor::new(Template {
        id: template_id.to_string(),
        ..Default::default()
    });
    let _spinner = InFlight::start("Deleting...");
    editor.delete(client).await
}

/// Point the preview pane at a template and render it
pub async fn cmd_preview_template(client: &ReportClient, template_id: &str) -> PreviewContent {
    let editor = TemplateEditor::new(Template {
        id: template_id.to_string(),
        ..Default::default()
    });
    let mut state = PreviewState::default();
    state.apply(editor.preview());
    state.render(client).await
}

pub fn print_templates(templates: &[Template]) {
    println!("\n📄 Report Templates\n");

    if templates.is_empty() {
        println!("No templates yet. Use 'lexreport template save' to create one.");
        return;
    }

    for template in templates {
        print_template(template);
        println!();
    }
}

pub fn print_template(template: &Template) {
    let editor = TemplateEditor::new(template.clone());
    println!("• {}", editor.card_title());
    println!("  ID: {}", template.id);
    if !template.description.is_empty() {
        println!("  {}", template.description);
    }
}
