//! Submitted form values and their required-field rules

use super::models::SectionType;
use crate::error::{Error, Result};

fn min_chars(value: &str, min: usize, message: &str) -> Result<()> {
    if value.chars().count() < min {
        return Err(Error::Validation(message.to_string()));
    }
    Ok(())
}

#[derive(Debug, Clone, Default)]
pub struct TemplateForm {
    pub title: String,
    pub description: String,
}

impl TemplateForm {
    pub fn validate(&self) -> Result<()> {
        min_chars(&self.title, 2, "Title must be at least 2 characters.")?;
        min_chars(
            &self.description,
            10,
            "Description must be at least 10 characters.",
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct SectionForm {
    pub section_template: String,
    pub example: String,
    pub section_type: SectionType,
}

impl SectionForm {
    pub fn validate(&self) -> Result<()> {
        min_chars(
            &self.section_template,
            3,
            "Section template must be at least 3 characters.",
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct QueryForm {
    pub sql: String,
    pub description: Option<String>,
    pub data_source_id: String,
}

impl QueryForm {
    pub fn validate(&self) -> Result<()> {
        min_chars(&self.sql, 1, "SQL query is required.")?;
        min_chars(&self.data_source_id, 1, "Data source is required.")
    }
}

/// Processing-step form; `parameters` is JSON text, `outputs` comma-separated
#[derive(Debug, Clone, Default)]
pub struct StepForm {
    pub function_name: String,
    pub parameters: String,
    pub outputs: String,
    pub description: String,
}

impl StepForm {
    pub fn validate(&self) -> Result<()> {
        min_chars(&self.function_name, 1, "Function name is required.")?;
        min_chars(&self.parameters, 2, "Parameters must be valid JSON.")?;
        self.parsed_parameters()?;
        min_chars(&self.outputs, 1, "Output key is required.")?;
        min_chars(
            &self.description,
            5,
            "Description must be at least 5 characters.",
        )
    }

    pub fn parsed_parameters(&self) -> Result<serde_json::Value> {
        serde_json::from_str(&self.parameters)
            .map_err(|_| Error::Validation("Parameters must be valid JSON.".to_string()))
    }

    pub fn output_keys(&self) -> Vec<String> {
        self.outputs
            .split(',')
            .map(|output| output.trim().to_string())
            .collect()
    }

    /// Prefill from an existing step the way the edit form shows it
    pub fn from_step(step: &super::models::ProcessingStep) -> Self {
        Self {
            function_name: step.function_name.clone(),
            parameters: serde_json::to_string_pretty(&step.parameters).unwrap_or_default(),
            outputs: step.outputs.join(", "),
            description: step.description.clone(),
        }
    }
}
