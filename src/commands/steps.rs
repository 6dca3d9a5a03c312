//! Processing-step commands

use crate::error::Result;
use crate::notice::Notice;
use crate::progress::InFlight;
use crate::report::{ProcessingStep, ReportClient, SectionEditor, StepEditor, StepForm};
use tracing::debug;

pub async fn cmd_list_steps(client: &ReportClient, section_id: &str) -> Result<Vec<ProcessingStep>> {
    let _spinner = InFlight::start("Loading processing steps...");
    let mut steps = client.list_steps(section_id).await?;
    steps.sort_by_key(|s| s.order);
    Ok(steps)
}

pub async fn cmd_get_step(client: &ReportClient, step_id: &str) -> Result<ProcessingStep> {
    let _spinner = InFlight::start("Loading processing step...");
    client.get_step(step_id).await
}

/// Generated steps and what happened on the way
#[derive(Debug, Clone, serde::Serialize)]
pub struct GeneratedSteps {
    pub steps: Vec<ProcessingStep>,
    pub notices: Vec<Notice>,
}

/// Generate steps for a saved section, optionally persisting each one
pub async fn cmd_generate_steps(
    client: &ReportClient,
    template_id: &str,
    section_id: &str,
    save: bool,
) -> Result<GeneratedSteps> {
    let _spinner = InFlight::start("Generating processing steps...");
    let section = client.get_section(template_id, section_id).await?.section;
    let mut editor = SectionEditor::new(template_id, "", section);

    let mut notices: Vec<Notice> = editor.load_query(client).await.into_iter().collect();
    let generated = editor.generate_steps(client).await;
    let failed = generated.is_destructive();
    notices.push(generated);

    if save && !failed {
        for step in &editor.steps {
            debug!("Persisting generated step {}", step.id);
            let mut step_editor = StepEditor::new(section_id, step.clone());
            let form = StepForm::from_step(step);
            notices.push(step_editor.submit(client, form).await);
        }
    }

    Ok(GeneratedSteps {
        steps: editor.steps,
        notices,
    })
}

async fn open_step(
    client: &ReportClient,
    step_id: Option<&str>,
) -> Result<ProcessingStep> {
    let Some(id) = step_id else {
        return Ok(ProcessingStep::default());
    };
    match client.get_step(id).await {
        Ok(step) => Ok(step),
        Err(e) if e.is_not_found() => Ok(ProcessingStep {
            id: id.to_string(),
            ..Default::default()
        }),
        Err(e) => Err(e),
    }
}

pub async fn cmd_save_step(
    client: &ReportClient,
    section_id: &str,
    step_id: Option<&str>,
    order: Option<i64>,
    form: StepForm,
) -> Result<(ProcessingStep, Notice)> {
    let _spinner = InFlight::start("Submitting...");
    let mut step = open_step(client, step_id).await?;
    if let Some(order) = order {
        step.order = order;
    }
    let mut editor = StepEditor::new(section_id, step);
    let notice = editor.submit(client, form).await;
    Ok((editor.step, notice))
}

pub async fn cmd_delete_step(client: &ReportClient, step_id: &str) -> Notice {
    let step = ProcessingStep {
        id: step_id.to_string(),
        ..Default::default()
    };
    let mut editor = StepEditor::new("", step);
    let _spinner = InFlight::start("Deleting...");
    editor.delete(client).await
}

pub fn print_steps(steps: &[ProcessingStep]) {
    println!("\n⚙  Processing Steps\n");

    if steps.is_empty() {
        println!("No processing steps.");
        return;
    }

    for step in steps {
        print_step(step);
        println!();
    }
}

pub fn print_step(step: &ProcessingStep) {
    let editor = StepEditor::new("", step.clone());
    println!("{}. {} ({})", step.order, editor.card_title(), step.function_name);
    println!("  ID: {}", step.id);
    println!("  Parameters: {}", step.parameters);
    if !step.outputs.is_empty() {
        println!("  Outputs: {}", step.outputs.join(", "));
    }
}
