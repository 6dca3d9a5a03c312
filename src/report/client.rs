//! Typed client for the report builder REST API

use super::models::*;
use crate::backend::{BackendClient, Failure};
use crate::config::Config;
use crate::error::Result;
use tracing::info;

pub struct ReportClient {
    backend: BackendClient,
    page_size: u32,
}

impl ReportClient {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            backend: BackendClient::new(&config.report.base_url, &config.http)?,
            page_size: config.report.page_size,
        })
    }

    fn page(&self, skip: u32) -> [(&'static str, u32); 2] {
        [("skip", skip), ("limit", self.page_size)]
    }

    // Templates

    pub async fn upsert_template(&self, template: &Template) -> Result<Template> {
        let url = self.backend.endpoint(&["templates"])?;
        let saved: Template = self
            .backend
            .send_json(
                self.backend.post(url).json(template),
                Failure::new("Failed to create or update template"),
            )
            .await?;
        info!("Saved template {}", saved.id);
        Ok(saved)
    }

    pub async fn get_template(&self, template_id: &str) -> Result<Template> {
        let url = self.backend.endpoint(&["templates", template_id])?;
        self.backend
            .send_json(self.backend.get(url), Failure::new("Failed to fetch template"))
            .await
    }

    pub async fn list_templates(&self, skip: u32) -> Result<Vec<Template>> {
        let url = self.backend.endpoint(&["templates"])?;
        self.backend
            .send_json(
                self.backend.get(url).query(&self.page(skip)),
                Failure::new("Failed to fetch templates"),
            )
            .await
    }

    pub async fn delete_template(&self, template_id: &str) -> Result<()> {
        let url = self.backend.endpoint(&["templates", template_id])?;
        self.backend
            .send_empty(self.backend.delete(url), Failure::new("Failed to delete template"))
            .await?;
        info!("Deleted template {}", template_id);
        Ok(())
    }

    // Sections

    pub async fn upsert_section(
        &self,
        template_id: &str,
        section: &Section,
    ) -> Result<SectionResponse> {
        let url = self.backend.endpoint(&["templates", template_id, "sections"])?;
        let saved: SectionResponse = self
            .backend
            .send_json(
                self.backend.post(url).json(section),
                Failure::new("Failed to create or update section")
                    .not_found(format!("Template with id {} not found", template_id)),
            )
            .await?;
        info!("Saved section {} in template {}", saved.section.id, template_id);
        Ok(saved)
    }

    pub async fn list_sections(&self, template_id: &str, skip: u32) -> Result<Vec<SectionResponse>> {
        let url = self.backend.endpoint(&["templates", template_id, "sections"])?;
        self.backend
            .send_json(
                self.backend.get(url).query(&self.page(skip)),
                Failure::new("Failed to fetch sections"),
            )
            .await
    }

    pub async fn get_section(&self, template_id: &str, section_id: &str) -> Result<SectionResponse> {
        let url = self
            .backend
            .endpoint(&["templates", template_id, "sections", section_id])?;
        self.backend
            .send_json(self.backend.get(url), Failure::new("Failed to fetch section"))
            .await
    }

    pub async fn delete_section(&self, template_id: &str, section_id: &str) -> Result<()> {
        let url = self
            .backend
            .endpoint(&["templates", template_id, "sections", section_id])?;
        self.backend
            .send_empty(self.backend.delete(url), Failure::new("Failed to delete section"))
            .await?;
        info!("Deleted section {}", section_id);
        Ok(())
    }

    // Queries and data sources

    pub async fn list_data_sources(&self, skip: u32) -> Result<Vec<DataSource>> {
        let url = self.backend.endpoint(&["datasources"])?;
        self.backend
            .send_json(
                self.backend.get(url).query(&self.page(skip)),
                Failure::new("Failed to fetch data sources").prefixed(),
            )
            .await
    }

    pub async fn upsert_query(&self, section_id: &str, query: &Query) -> Result<Query> {
        let url = self.backend.endpoint(&["sections", section_id, "query"])?;
        let saved: Query = self
            .backend
            .send_json(
                self.backend.put(url).json(query),
                Failure::new("Failed to create or update query"),
            )
            .await?;
        info!("Saved query {} for section {}", saved.id, section_id);
        Ok(saved)
    }

    pub async fn get_query_by_section(&self, section_id: &str) -> Result<Query> {
        let url = self.backend.endpoint(&["sections", section_id, "query"])?;
        self.backend
            .send_json(
                self.backend.get(url),
                Failure::new("Failed to fetch query").not_found("Query not found"),
            )
            .await
    }

    pub async fn get_query(&self, query_id: &str) -> Result<Query> {
        let url = self.backend.endpoint(&["queries", query_id])?;
        self.backend
            .send_json(
                self.backend.get(url),
                Failure::new("Failed to fetch query")
                    .not_found(format!("Query with id {} not found", query_id)),
            )
            .await
    }

    pub async fn delete_query(&self, query_id: &str) -> Result<()> {
        let url = self.backend.endpoint(&["queries", query_id])?;
        self.backend
            .send_empty(
                self.backend.delete(url),
                Failure::new("Failed to delete query")
                    .not_found(format!("Query with id {} not found", query_id)),
            )
            .await?;
        info!("Deleted query {}", query_id);
        Ok(())
    }

    // AI assistance

    pub async fn predict_sql(&self, request: &SqlPredictRequest) -> Result<String> {
        let url = self.backend.endpoint(&["predict_sql"])?;
        let response: SqlPredictResponse = self
            .backend
            .send_json(
                self.backend.post(url).json(request),
                Failure::new("AI error").prefixed(),
            )
            .await?;
        Ok(response.predicted_sql)
    }

    pub async fn search_sql(&self, request: &SqlSearchRequest) -> Result<SqlSearchResponse> {
        let url = self.backend.endpoint(&["search_sql_by_datasource"])?;
        let response: SqlSearchResponse = self
            .backend
            .send_json(
                self.backend.post(url).json(request),
                Failure::new("AI error").prefixed(),
            )
            .await?;
        info!("SQL search returned {} rows", response.result.len());
        Ok(response)
    }

    pub async fn generate_steps(
        &self,
        section_id: &str,
        request: &GenerateStepsRequest,
    ) -> Result<Vec<ProcessingStep>> {
        let url = self
            .backend
            .endpoint(&["sections", section_id, "generate_steps"])?;
        let steps: Vec<ProcessingStep> = self
            .backend
            .send_json(
                self.backend.post(url).json(request),
                Failure::new("Failed to generate processing steps"),
            )
            .await?;
        info!("Generated {} processing steps for section {}", steps.len(), section_id);
        Ok(steps)
    }

    // Processing steps

    pub async fn upsert_step(
        &self,
        section_id: &str,
        step: &ProcessingStep,
    ) -> Result<ProcessingStep> {
        let url = self.backend.endpoint(&["processing_steps"])?;
        let body = ProcessingStep {
            section_id: Some(section_id.to_string()),
            ..step.clone()
        };
        let saved: ProcessingStep = self
            .backend
            .send_json(
                self.backend
                    .post(url)
                    .query(&[("section_id", section_id)])
                    .json(&body),
                Failure::new("Failed to create or update processing step").prefixed(),
            )
            .await?;
        info!("Saved processing step {}", saved.id);
        Ok(saved)
    }

    pub async fn get_step(&self, step_id: &str) -> Result<ProcessingStep> {
        let url = self.backend.endpoint(&["processing_steps", step_id])?;
        self.backend
            .send_json(
                self.backend.get(url),
                Failure::new("Failed to fetch processing step").prefixed(),
            )
            .await
    }

    pub async fn list_steps(&self, section_id: &str) -> Result<Vec<ProcessingStep>> {
        let url = self
            .backend
            .endpoint(&["sections", section_id, "processing_steps"])?;
        self.backend
            .send_json(
                self.backend.get(url),
                Failure::new("Failed to fetch processing steps").prefixed(),
            )
            .await
    }

    pub async fn delete_step(&self, step_id: &str) -> Result<()> {
        let url = self.backend.endpoint(&["processing_steps", step_id])?;
        self.backend
            .send_empty(
                self.backend.delete(url),
                Failure::new("Failed to delete processing step").prefixed(),
            )
            .await?;
        info!("Deleted processing step {}", step_id);
        Ok(())
    }
}
