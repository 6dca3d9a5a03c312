//! Section and query commands

use crate::error::Result;
use crate::notice::Notice;
use crate::progress::InFlight;
use crate::report::{
    Query, QueryEditor, QueryForm, ReportClient, Section, SectionEditor, SectionForm,
    SectionResponse,
};
use tracing::{debug, warn};

pub async fn cmd_list_sections(
    client: &ReportClient,
    template_id: &str,
    skip: u32,
) -> Result<Vec<SectionResponse>> {
    let _spinner = InFlight::start("Loading sections...");
    client.list_sections(template_id, skip).await
}

pub async fn cmd_get_section(
    client: &ReportClient,
    template_id: &str,
    section_id: &str,
) -> Result<SectionResponse> {
    let _spinner = InFlight::start("Loading section...");
    client.get_section(template_id, section_id).await
}

/// Fetch an existing section, or start a fresh one when the id is unknown
async fn open_section(
    client: &ReportClient,
    template_id: &str,
    section_id: Option<&str>,
) -> Result<Section> {
    let Some(id) = section_id else {
        return Ok(Section::default());
    };
    match client.get_section(template_id, id).await {
        Ok(existing) => Ok(existing.section),
        Err(e) if e.is_not_found() => {
            debug!("Section {} not found, creating it", id);
            Ok(Section {
                id: id.to_string(),
                ..Default::default()
            })
        }
        Err(e) => Err(e),
    }
}

pub async fn cmd_save_section(
    client: &ReportClient,
    template_id: &str,
    section_id: Option<&str>,
    form: SectionForm,
) -> Result<(Section, Notice)> {
    let _spinner = InFlight::start("Submitting...");
    let section = open_section(client, template_id, section_id).await?;
    let mut editor = SectionEditor::new(template_id, "", section);
    let notice = editor.submit(client, form).await;
    Ok((editor.saved, notice))
}

pub async fn cmd_delete_section(
    client: &ReportClient,
    template_id: &str,
    section_id: &str,
) -> Option<Notice> {
    let section = Section {
        id: section_id.to_string(),
        ..Default::default()
    };
    let mut editor = SectionEditor::new(template_id, "", section);
    let _spinner = InFlight::start("Deleting...");
    editor.delete(client).await
}

/// A section's query, falling back to an empty one
pub async fn cmd_show_query(
    client: &ReportClient,
    section_id: &str,
) -> (Query, Option<Notice>) {
    let section = Section {
        id: section_id.to_string(),
        ..Default::default()
    };
    let mut editor = SectionEditor::new("", "", section);
    let notice = {
        let _spinner = InFlight::start("Loading query...");
        editor.load_query(client).await
    };
    (editor.query.unwrap_or_else(Query::empty), notice)
}

pub async fn cmd_get_query(client: &ReportClient, query_id: &str) -> Result<Query> {
    let _spinner = InFlight::start("Loading query...");
    client.get_query(query_id).await
}

pub async fn cmd_save_query(
    client: &ReportClient,
    section_id: &str,
    form: QueryForm,
) -> (Query, Vec<Notice>) {
    let (existing, load_notice) = cmd_show_query(client, section_id).await;
    let mut notices: Vec<Notice> = load_notice.into_iter().collect();

    let mut editor = QueryEditor::new("", "", section_id, existing);
    let _spinner = InFlight::start("Submitting...");
    if let Some(notice) = editor.load_data_sources(client).await {
        notices.push(notice);
    } else if !editor
        .data_sources
        .iter()
        .any(|ds| ds.id == form.data_source_id)
    {
        warn!(
            "Data source '{}' is not in the backend's list",
            form.data_source_id
        );
    }
    notices.push(editor.submit(client, form).await);
    (editor.query, notices)
}

pub async fn cmd_delete_query(client: &ReportClient, query_id: &str) -> Notice {
    let query = Query {
        id: query_id.to_string(),
        ..Default::default()
    };
    let mut editor = QueryEditor::new("", "", "", query);
    let _spinner = InFlight::start("Deleting...");
    editor.delete(client).await
}

pub fn print_sections(sections: &[SectionResponse]) {
    println!("\n🧩 Sections\n");

    if sections.is_empty() {
        println!("No sections in this template.");
        return;
    }

    for response in sections {
        print_section(&response.section);
        println!();
    }
}

pub fn print_section(section: &Section) {
    println!("• [{}] {}", section.section_type, section.section_template);
    println!("  ID: {}", section.id);
    if !section.example.is_empty() {
        println!("  Example: {}", section.example.replace('\n', " "));
    }
    if let Some(description) = &section.description {
        println!("  {}", description);
    }
}

pub fn print_query(query: &Query) {
    println!("\n🗄  Query {}\n", query.id);
    if query.sql.is_empty() {
        println!("(no SQL yet)");
    } else {
        println!("{}", query.sql);
    }
    if !query.description.is_empty() {
        println!("\nDescription: {}", query.description);
    }
    if !query.data_source_id.is_empty() {
        println!("Data source: {}", query.data_source_id);
    }
}
