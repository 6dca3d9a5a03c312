//! Data source, SQL and preview commands

use crate::error::Result;
use crate::progress::InFlight;
use crate::report::{
    DataSource, PreviewContent, PreviewKind, PreviewState, PreviewUpdate, ReportClient,
    SqlPredictRequest, SqlSearchRequest, SqlSearchResponse,
};

pub async fn cmd_data_sources(client: &ReportClient, skip: u32) -> Result<Vec<DataSource>> {
    let _spinner = InFlight::start("Loading data sources...");
    client.list_data_sources(skip).await
}

pub async fn cmd_predict_sql(client: &ReportClient, request: SqlPredictRequest) -> Result<String> {
    let _spinner = InFlight::start("Predicting SQL...");
    client.predict_sql(&request).await
}

pub async fn cmd_search_sql(
    client: &ReportClient,
    sql: &str,
    data_source_id: &str,
) -> Result<SqlSearchResponse> {
    let request = SqlSearchRequest {
        sql: sql.to_string(),
        data_source_id: data_source_id.to_string(),
    };
    let _spinner = InFlight::start("Running query...");
    client.search_sql(&request).await
}

/// Options for rendering a preview pane
#[derive(Debug, Clone)]
pub struct PreviewOptions {
    pub kind: PreviewKind,
    pub id: String,
    pub template_id: Option<String>,
    pub template_title: Option<String>,
    pub test_title: Option<String>,
}

pub async fn cmd_preview(client: &ReportClient, options: PreviewOptions) -> PreviewContent {
    let mut update = PreviewUpdate::target(options.kind, options.id);
    if let Some(template_id) = options.template_id {
        update = update.with_template(template_id, options.template_title.unwrap_or_default());
    }
    if let Some(title) = options.test_title {
        update = update.with_test_title(title);
    }

    let mut state = PreviewState::default();
    state.apply(update);

    let _spinner = InFlight::start("Rendering preview...");
    state.render(client).await
}

pub fn print_data_sources(sources: &[DataSource]) {
    println!("\n🔌 Data Sources\n");

    if sources.is_empty() {
        println!("No data sources configured.");
        return;
    }

    for source in sources {
        println!("• {} ({})", source.name, source.id);
        if let Some(description) = &source.description {
            println!("  {}", description);
        }
    }
}

/// Print rows as `column: value` blocks
pub fn print_rows(response: &SqlSearchResponse) {
    if response.result.is_empty() {
        println!("No rows returned.");
        return;
    }

    for (i, row) in response.result.iter().enumerate() {
        println!("--- row {} ---", i + 1);
        for (column, value) in row {
            match value {
                serde_json::Value::String(s) => println!("{}: {}", column, s),
                other => println!("{}: {}", column, other),
            }
        }
    }
    println!("\n{} row(s)", response.result.len());
}
