//! lexreport CLI entry point

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use lexreport::{
    commands::{
        cmd_data_sources, cmd_delete_query, cmd_delete_section, cmd_delete_step,
        cmd_delete_template, cmd_generate_steps, cmd_get_query, cmd_get_section, cmd_get_step,
        cmd_get_template, cmd_init, cmd_list_sections, cmd_list_steps, cmd_list_templates,
        cmd_practice, cmd_predict_sql, cmd_preview, cmd_preview_template, cmd_save_query,
        cmd_save_section, cmd_save_step, cmd_save_template, cmd_search_sql, cmd_show_query,
        cmd_words,
        print_data_sources, print_query, print_rows, print_section, print_sections, print_step,
        print_steps, print_template, print_templates, print_words, PracticeOptions,
        PreviewOptions,
    },
    config::Config,
    error::Result,
    listen::{ListenClient, WordFilter},
    notice::{all_succeeded, print_notice, Notice},
    progress::LogWriterFactory,
    report::{
        PreviewContent, PreviewKind, QueryForm, ReportClient, SectionForm, SectionType,
        SqlPredictRequest, StepForm, TemplateForm,
    },
};
use serde::Serialize;
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "lexreport")]
#[command(version, about = "Listening-practice words and report template builder", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output as JSON (logs become JSON lines too)
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Word-filter flags shared by `words` and `practice`
#[derive(clap::Args, Debug, Clone, Default)]
struct FilterArgs {
    /// Case-insensitive substring the word must contain
    #[arg(long, default_value = "")]
    text: String,

    /// Minimum occurrence count
    #[arg(long, default_value = "0")]
    min_count: u64,

    /// Maximum occurrence count (unbounded when omitted)
    #[arg(long)]
    max_count: Option<u64>,
}

impl From<FilterArgs> for WordFilter {
    fn from(args: FilterArgs) -> Self {
        WordFilter::new(args.text, args.min_count, args.max_count)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init {
        /// Force overwrite existing config
        #[arg(long)]
        force: bool,
    },

    /// Show the word list
    Words {
        #[command(flatten)]
        filter: FilterArgs,

        /// API key for the word-list service
        #[arg(long, env = "LEXREPORT_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
    },

    /// Generate listening-practice audio from selected words
    Practice {
        /// Words to select
        words: Vec<String>,

        #[command(flatten)]
        filter: FilterArgs,

        /// Also select every word matching the filter
        #[arg(long)]
        all_matching: bool,

        /// Directory the audio file is written to
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// API key for the word-list service
        #[arg(long, env = "LEXREPORT_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
    },

    /// Manage report templates
    Template {
        #[command(subcommand)]
        action: TemplateAction,
    },

    /// Manage template sections
    Section {
        #[command(subcommand)]
        action: SectionAction,
    },

    /// Manage section queries
    Query {
        #[command(subcommand)]
        action: QueryAction,
    },

    /// List data sources
    Datasources {
        /// Number of records to skip
        #[arg(long, default_value = "0")]
        skip: u32,
    },

    /// AI-assisted SQL
    Sql {
        #[command(subcommand)]
        action: SqlAction,
    },

    /// Manage processing steps
    Steps {
        #[command(subcommand)]
        action: StepAction,
    },

    /// Render the preview pane for an item
    Preview {
        /// What to preview
        #[arg(value_enum)]
        kind: PreviewTarget,

        /// Item ID
        id: String,

        /// Owning template ID
        #[arg(long)]
        template_id: Option<String>,

        /// Owning template title (the title the query was written for)
        #[arg(long)]
        template_title: Option<String>,

        /// Title to rewrite the query for
        #[arg(long)]
        test_title: Option<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum TemplateAction {
    /// List templates
    List {
        #[arg(long, default_value = "0")]
        skip: u32,

        /// Output only template IDs (one per line, for scripting)
        #[arg(long)]
        ids_only: bool,
    },

    /// Show a template
    Get { id: String },

    /// Create or update a template
    Save {
        /// Existing template ID (omit to create)
        #[arg(long)]
        id: Option<String>,

        #[arg(long)]
        title: String,

        #[arg(long)]
        description: String,
    },

    /// Delete a template
    Delete { id: String },

    /// Render the template preview pane
    Preview { id: String },
}

#[derive(Subcommand)]
enum SectionAction {
    /// List a template's sections
    List {
        template_id: String,

        #[arg(long, default_value = "0")]
        skip: u32,
    },

    /// Show a section
    Get { template_id: String, id: String },

    /// Create or update a section
    Save {
        template_id: String,

        /// Existing section ID (omit to create)
        #[arg(long)]
        id: Option<String>,

        /// Section template text
        #[arg(long = "template-text")]
        section_template: String,

        /// Example output
        #[arg(long, default_value = "")]
        example: String,

        /// llm, text, chart or table
        #[arg(long = "type", default_value = "llm")]
        section_type: SectionType,
    },

    /// Delete a section
    Delete { template_id: String, id: String },
}

#[derive(Subcommand)]
enum QueryAction {
    /// Show the query attached to a section
    Show { section_id: String },

    /// Show a query by ID
    Get { id: String },

    /// Create or update a section's query
    Save {
        section_id: String,

        #[arg(long)]
        sql: String,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        data_source: String,
    },

    /// Delete a query
    Delete { id: String },
}

#[derive(Subcommand)]
enum SqlAction {
    /// Rewrite a query for a different report title
    Predict {
        #[arg(long)]
        sql: String,

        #[arg(long, default_value = "")]
        description: String,

        #[arg(long)]
        old_title: String,

        #[arg(long)]
        new_title: String,
    },

    /// Run SQL against a data source
    Search {
        #[arg(long)]
        sql: String,

        #[arg(long)]
        data_source: String,
    },
}

#[derive(Subcommand)]
enum StepAction {
    /// List a section's processing steps
    List { section_id: String },

    /// Show a processing step
    Get { id: String },

    /// Generate processing steps from the section's query
    Generate {
        template_id: String,
        section_id: String,

        /// Persist each generated step
        #[arg(long)]
        save: bool,
    },

    /// Create or update a processing step
    Save {
        section_id: String,

        /// Existing step ID (omit to create)
        #[arg(long)]
        id: Option<String>,

        #[arg(long)]
        order: Option<i64>,

        #[arg(long = "function")]
        function_name: String,

        /// JSON object
        #[arg(long, default_value = "{}")]
        parameters: String,

        /// Comma-separated output keys
        #[arg(long)]
        outputs: String,

        #[arg(long)]
        description: String,
    },

    /// Delete a processing step
    Delete { id: String },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PreviewTarget {
    Template,
    Section,
    Query,
    Step,
    Report,
}

impl From<PreviewTarget> for PreviewKind {
    fn from(target: PreviewTarget) -> Self {
        match target {
            PreviewTarget::Template => PreviewKind::Template,
            PreviewTarget::Section => PreviewKind::Section,
            PreviewTarget::Query => PreviewKind::Query,
            PreviewTarget::Step => PreviewKind::ProcessingStep,
            PreviewTarget::Report => PreviewKind::Report,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    match run().await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!("{}", e.user_message());
            std::process::exit(1);
        }
    }
}

/// Returns false when the command ended with a failure notice
async fn run() -> Result<bool> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    if cli.json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(LogWriterFactory::default()))
            .with(filter)
            .init();
    }

    match cli.command {
        Commands::Init { force } => {
            let path = cmd_init(cli.config, force)?;
            if cli.json {
                emit_json(&serde_json::json!({ "config_file": path }))?;
            } else {
                println!("✓ Wrote config to {}", path.display());
            }
            return Ok(true);
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "lexreport", &mut std::io::stdout());
            return Ok(true);
        }
        _ => {}
    }

    let config = match cli.config.as_deref() {
        Some(path) => Config::load(path)?,
        None => Config::load_from(None)?,
    };
    let json = cli.json;

    match cli.command {
        Commands::Init { .. } | Commands::Completions { .. } => unreachable!(),
        Commands::Words { filter, api_key } => {
            let backend = ListenClient::new(&config, api_key)?;
            let listing = cmd_words(&backend, filter.into()).await?;
            if json {
                emit_json(&listing)?;
            } else {
                print_words(&listing);
            }
            Ok(true)
        }
        Commands::Practice {
            words,
            filter,
            all_matching,
            output_dir,
            api_key,
        } => {
            let backend = ListenClient::new(&config, api_key)?;
            let options = PracticeOptions {
                words,
                filter: filter.into(),
                all_matching,
                output_dir,
            };
            let report = cmd_practice(&config, &backend, options).await?;
            if json {
                emit_json(&report)?;
            } else {
                print_notice(&report.notice);
                if let Some(path) = &report.saved_to {
                    println!("  Saved to {}", path.display());
                }
            }
            Ok(!report.notice.is_destructive())
        }
        Commands::Template { action } => {
            handle_template(&ReportClient::new(&config)?, action, json).await
        }
        Commands::Section { action } => {
            handle_section(&ReportClient::new(&config)?, action, json).await
        }
        Commands::Query { action } => {
            handle_query(&ReportClient::new(&config)?, action, json).await
        }
        Commands::Datasources { skip } => {
            let sources = cmd_data_sources(&ReportClient::new(&config)?, skip).await?;
            if json {
                emit_json(&sources)?;
            } else {
                print_data_sources(&sources);
            }
            Ok(true)
        }
        Commands::Sql { action } => handle_sql(&ReportClient::new(&config)?, action, json).await,
        Commands::Steps { action } => {
            handle_steps(&ReportClient::new(&config)?, action, json).await
        }
        Commands::Preview {
            kind,
            id,
            template_id,
            template_title,
            test_title,
        } => {
            let options = PreviewOptions {
                kind: kind.into(),
                id,
                template_id,
                template_title,
                test_title,
            };
            let content = cmd_preview(&ReportClient::new(&config)?, options).await;
            let ok = !matches!(content, PreviewContent::Error(_));
            if json {
                emit_json(&serde_json::json!({ "preview": content.to_string() }))?;
            } else {
                println!("{}", content);
            }
            Ok(ok)
        }
    }
}

fn emit_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a notice and report whether it was a success
fn finish(notice: &Notice, json: bool) -> Result<bool> {
    if json {
        emit_json(notice)?;
    } else {
        print_notice(notice);
    }
    Ok(!notice.is_destructive())
}

/// Print several notices; fails if any of them did
fn finish_all(notices: &[Notice], json: bool) -> Result<bool> {
    if json {
        emit_json(notices)?;
    } else {
        notices.iter().for_each(print_notice);
    }
    Ok(all_succeeded(notices))
}

async fn handle_template(client: &ReportClient, action: TemplateAction, json: bool) -> Result<bool> {
    match action {
        TemplateAction::List { skip, ids_only } => {
            let templates = cmd_list_templates(client, skip).await?;
            if ids_only {
                for template in &templates {
                    println!("{}", template.id);
                }
            } else if json {
                emit_json(&templates)?;
            } else {
                print_templates(&templates);
            }
            Ok(true)
        }
        TemplateAction::Get { id } => {
            let template = cmd_get_template(client, &id).await?;
            if json {
                emit_json(&template)?;
            } else {
                print_template(&template);
            }
            Ok(true)
        }
        TemplateAction::Save {
            id,
            title,
            description,
        } => {
            let form = TemplateForm { title, description };
            let (template, notice) = cmd_save_template(client, id, form).await?;
            if json {
                emit_json(&serde_json::json!({ "template": template, "notice": notice }))?;
                return Ok(!notice.is_destructive());
            }
            finish(&notice, json)
        }
        TemplateAction::Delete { id } => finish(&cmd_delete_template(client, &id).await, json),
        TemplateAction::Preview { id } => {
            let content = cmd_preview_template(client, &id).await;
            if json {
                emit_json(&serde_json::json!({ "preview": content.to_string() }))?;
            } else {
                println!("{}", content);
            }
            Ok(true)
        }
    }
}

async fn handle_section(client: &ReportClient, action: SectionAction, json: bool) -> Result<bool> {
    match action {
        SectionAction::List { template_id, skip } => {
            let sections = cmd_list_sections(client, &template_id, skip).await?;
            if json {
                emit_json(&sections)?;
            } else {
                print_sections(&sections);
            }
            Ok(true)
        }
        SectionAction::Get { template_id, id } => {
            let response = cmd_get_section(client, &template_id, &id).await?;
            if json {
                emit_json(&response)?;
            } else {
                print_section(&response.section);
            }
            Ok(true)
        }
        SectionAction::Save {
            template_id,
            id,
            section_template,
            example,
            section_type,
        } => {
            let form = SectionForm {
                section_template,
                example,
                section_type,
            };
            let (section, notice) =
                cmd_save_section(client, &template_id, id.as_deref(), form).await?;
            if json {
                emit_json(&serde_json::json!({ "section": section, "notice": notice }))?;
                return Ok(!notice.is_destructive());
            }
            if !notice.is_destructive() {
                println!("Section ID: {}", section.id);
            }
            finish(&notice, json)
        }
        SectionAction::Delete { template_id, id } => {
            match cmd_delete_section(client, &template_id, &id).await {
                Some(notice) => finish(&notice, json),
                None => Ok(true),
            }
        }
    }
}

async fn handle_query(client: &ReportClient, action: QueryAction, json: bool) -> Result<bool> {
    match action {
        QueryAction::Show { section_id } => {
            let (query, notice) = cmd_show_query(client, &section_id).await;
            let ok = all_succeeded(&notice);
            if json {
                emit_json(&serde_json::json!({ "query": query, "notice": notice }))?;
                return Ok(ok);
            }
            if let Some(notice) = &notice {
                print_notice(notice);
            }
            print_query(&query);
            Ok(ok)
        }
        QueryAction::Get { id } => {
            let query = cmd_get_query(client, &id).await?;
            if json {
                emit_json(&query)?;
            } else {
                print_query(&query);
            }
            Ok(true)
        }
        QueryAction::Save {
            section_id,
            sql,
            description,
            data_source,
        } => {
            let form = QueryForm {
                sql,
                description,
                data_source_id: data_source,
            };
            let (query, notices) = cmd_save_query(client, &section_id, form).await;
            if json {
                emit_json(&serde_json::json!({ "query": query, "notices": notices }))?;
                return Ok(all_succeeded(&notices));
            }
            finish_all(&notices, json)
        }
        QueryAction::Delete { id } => finish(&cmd_delete_query(client, &id).await, json),
    }
}

async fn handle_sql(client: &ReportClient, action: SqlAction, json: bool) -> Result<bool> {
    match action {
        SqlAction::Predict {
            sql,
            description,
            old_title,
            new_title,
        } => {
            let request = SqlPredictRequest {
                original_sql: sql,
                description,
                old_title,
                new_title,
            };
            let predicted = cmd_predict_sql(client, request).await?;
            if json {
                emit_json(&serde_json::json!({ "predicted_sql": predicted }))?;
            } else {
                println!("{}", predicted);
            }
            Ok(true)
        }
        SqlAction::Search { sql, data_source } => {
            let rows = cmd_search_sql(client, &sql, &data_source).await?;
            if json {
                emit_json(&rows)?;
            } else {
                print_rows(&rows);
            }
            Ok(true)
        }
    }
}

async fn handle_steps(client: &ReportClient, action: StepAction, json: bool) -> Result<bool> {
    match action {
        StepAction::List { section_id } => {
            let steps = cmd_list_steps(client, &section_id).await?;
            if json {
                emit_json(&steps)?;
            } else {
                print_steps(&steps);
            }
            Ok(true)
        }
        StepAction::Get { id } => {
            let step = cmd_get_step(client, &id).await?;
            if json {
                emit_json(&step)?;
            } else {
                print_step(&step);
            }
            Ok(true)
        }
        StepAction::Generate {
            template_id,
            section_id,
            save,
        } => {
            let generated = cmd_generate_steps(client, &template_id, &section_id, save).await?;
            if json {
                emit_json(&generated)?;
                return Ok(all_succeeded(&generated.notices));
            }
            print_steps(&generated.steps);
            finish_all(&generated.notices, json)
        }
        StepAction::Save {
            section_id,
            id,
            order,
            function_name,
            parameters,
            outputs,
            description,
        } => {
            let form = StepForm {
                function_name,
                parameters,
                outputs,
                description,
            };
            let (step, notice) =
                cmd_save_step(client, &section_id, id.as_deref(), order, form).await?;
            if json {
                emit_json(&serde_json::json!({ "step": step, "notice": notice }))?;
                return Ok(!notice.is_destructive());
            }
            finish(&notice, json)
        }
        StepAction::Delete { id } => finish(&cmd_delete_step(client, &id).await, json),
    }
}
