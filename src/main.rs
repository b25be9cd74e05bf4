use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use docspace::chat::{ChatEntry, ChatRole};
use docspace::config::{ClientConfig, ConfigError};
use docspace::form::{FieldKind, FormError, FormValue};
use docspace::net::{ApiError, FormBackend, HttpBackend, ProjectBackend, ProjectId};
use docspace::panel::{ChatPanel, ChatPanelView, FormPanel, FormPanelView, Notice, SendOutcome, SubmitOutcome};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("backend request failed: {0}")]
    Api(#[from] ApiError),
    #[error("invalid edit: {0}")]
    Form(#[from] FormError),
    #[error("{0}")]
    PanelFailed(String),
    #[error("{0} error notice(s) raised")]
    ErrorNotices(usize),
}

#[derive(Parser, Debug)]
#[command(name = "docspace", about = "Document workspace forms and chat CLI")]
struct Cli {
    /// Overrides `DOCSPACE_API_BASE_URL`.
    #[arg(long)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List projects.
    Projects,
    /// Show one project.
    Project { project: ProjectId },
    /// Delete a project and its pages.
    Delete { project: ProjectId },
    /// List the pages of a project.
    Pages { project: ProjectId },
    Form(FormCommand),
    Chat(ChatCommand),
}

#[derive(Args, Debug)]
struct FormCommand {
    #[command(subcommand)]
    command: FormSubcommand,
}

#[derive(Subcommand, Debug)]
enum FormSubcommand {
    /// Generate the page form and print fields with saved values.
    Show { project: ProjectId, page: u32 },
    /// Apply `key=value` edits and save.
    Fill {
        project: ProjectId,
        page: u32,
        #[arg(value_parser = parse_assignment, required = true)]
        edits: Vec<(String, String)>,
    },
    /// Regenerate fields, keeping values whose field survives.
    Regenerate { project: ProjectId, page: u32 },
    /// Print the backend's HTML rendering of the generated form.
    Html { project: ProjectId, page: u32 },
}

#[derive(Args, Debug)]
struct ChatCommand {
    #[command(subcommand)]
    command: ChatSubcommand,
}

#[derive(Subcommand, Debug)]
enum ChatSubcommand {
    /// Print the project chat history.
    History { project: ProjectId },
    /// Send a message and print the refreshed history.
    Ask {
        project: ProjectId,
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url);
    }
    let backend = Arc::new(HttpBackend::new(&config)?);
    tracing::debug!(base_url = %config.api_base_url, "docspace client ready");

    match cli.command {
        Command::Projects => run_projects(backend.as_ref()).await,
        Command::Project { project } => run_project(backend.as_ref(), project).await,
        Command::Delete { project } => {
            backend.delete_project(project).await?;
            println!("deleted project {project}");
            Ok(())
        }
        Command::Pages { project } => run_pages(backend.as_ref(), project).await,
        Command::Form(form) => run_form(backend, form).await,
        Command::Chat(chat) => run_chat(backend, chat).await,
    }
}

// =============================================================================
// PROJECTS
// =============================================================================

async fn run_projects(backend: &HttpBackend) -> Result<(), CliError> {
    let projects = backend.list_projects().await?;
    if projects.is_empty() {
        println!("no projects");
    }
    for project in projects {
        println!("{}\t{}\t{} pages\t{}", project.id, project.name, project.total_pages, project.created_at);
    }
    Ok(())
}

async fn run_project(backend: &HttpBackend, project_id: ProjectId) -> Result<(), CliError> {
    let project = backend.project(project_id).await?;
    let rendered = serde_json::to_string_pretty(&project).unwrap_or_else(|_| project.name.clone());
    println!("{rendered}");
    Ok(())
}

async fn run_pages(backend: &HttpBackend, project_id: ProjectId) -> Result<(), CliError> {
    for page in backend.pages(project_id).await? {
        let preview: String = page.text_content.chars().take(60).collect();
        println!("{}\t{}", page.page_number, preview.replace('\n', " "));
    }
    Ok(())
}

// =============================================================================
// FORM
// =============================================================================

async fn run_form(backend: Arc<HttpBackend>, form: FormCommand) -> Result<(), CliError> {
    if let FormSubcommand::Html { project, page } = form.command {
        match backend.generated_form_html(project, page).await? {
            Some(html) => println!("{html}"),
            None => println!("no generated form HTML for this page"),
        }
        return Ok(());
    }

    let (project, page) = match &form.command {
        FormSubcommand::Show { project, page }
        | FormSubcommand::Fill { project, page, .. }
        | FormSubcommand::Regenerate { project, page }
        | FormSubcommand::Html { project, page } => (*project, *page),
    };
    let panel = FormPanel::mount(backend, project, page);
    panel.load().await;
    let mut errors = report(panel.take_notices());

    match form.command {
        FormSubcommand::Show { .. } | FormSubcommand::Html { .. } => {}
        FormSubcommand::Regenerate { .. } => {
            panel.regenerate().await;
            errors += report(panel.take_notices());
        }
        FormSubcommand::Fill { edits, .. } => {
            ensure_form_ready(&panel.view())?;
            for (key, value) in edits {
                panel.edit(&key, value)?;
            }
            let outcome = panel.submit().await;
            errors += report(panel.take_notices());
            match outcome {
                SubmitOutcome::Saved => {}
                SubmitOutcome::Invalid(violations) => {
                    let joined = violations.iter().map(ToString::to_string).collect::<Vec<_>>();
                    return Err(CliError::PanelFailed(joined.join("; ")));
                }
                SubmitOutcome::NotReady => return Err(CliError::PanelFailed("form is not ready".to_owned())),
                SubmitOutcome::Failed | SubmitOutcome::Discarded => {}
            }
        }
    }

    let view = panel.view();
    print_form(&view);
    ensure_form_ready(&view)?;
    finish(errors)
}

fn ensure_form_ready(view: &FormPanelView) -> Result<(), CliError> {
    match view {
        FormPanelView::Failed { message } => Err(CliError::PanelFailed(message.clone())),
        FormPanelView::Loading => Err(CliError::PanelFailed("form did not finish loading".to_owned())),
        FormPanelView::Empty { .. } | FormPanelView::Ready { .. } => Ok(()),
    }
}

fn print_form(view: &FormPanelView) {
    match view {
        FormPanelView::Loading | FormPanelView::Failed { .. } => {}
        FormPanelView::Empty { page_text_missing: true } => {
            println!("no form fields: this page has no extractable text");
        }
        FormPanelView::Empty { page_text_missing: false } => println!("no form fields for this page"),
        FormPanelView::Ready { fields, values, dirty, .. } => {
            for field in fields {
                let value = values.get(&field.key).map(render_value).unwrap_or_default();
                let options = if field.options.is_empty() {
                    String::new()
                } else {
                    format!(" ({})", field.options.join(" | "))
                };
                println!("{}\t[{}] {}{}: {}", field.key, kind_name(&field.kind), field.label, options, value);
            }
            if *dirty {
                println!("(unsaved changes)");
            }
        }
    }
}

fn kind_name(kind: &FieldKind) -> &str {
    match kind {
        FieldKind::Text => "text",
        FieldKind::MultiLineText => "multi-line text",
        FieldKind::Checkbox => "checkbox",
        FieldKind::Radio => "radio",
        FieldKind::Dropdown => "dropdown",
        FieldKind::Unknown(raw) if raw.is_empty() => "unknown",
        FieldKind::Unknown(raw) => raw,
    }
}

fn render_value(value: &FormValue) -> String {
    match value {
        FormValue::Bool(b) => b.to_string(),
        FormValue::Number(n) => n.to_string(),
        FormValue::Text(s) => s.clone(),
        FormValue::List(items) => items.join(", "),
    }
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.trim().to_owned(), value.to_owned()))
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| format!("expected key=value, got `{raw}`"))
}

// =============================================================================
// CHAT
// =============================================================================

async fn run_chat(backend: Arc<HttpBackend>, chat: ChatCommand) -> Result<(), CliError> {
    let project = match &chat.command {
        ChatSubcommand::History { project } | ChatSubcommand::Ask { project, .. } => *project,
    };
    let panel = ChatPanel::mount(backend, project);
    panel.load().await;
    let mut errors = report(panel.take_notices());

    if let ChatSubcommand::Ask { text, .. } = chat.command {
        if let ChatPanelView::Failed { message } = panel.view() {
            return Err(CliError::PanelFailed(message));
        }
        panel.set_draft(text.join(" "));
        let outcome = panel.send_draft().await;
        errors += report(panel.take_notices());
        if outcome == SendOutcome::Ignored {
            return Err(CliError::PanelFailed("nothing to send".to_owned()));
        }
    }

    match panel.view() {
        ChatPanelView::Failed { message } => return Err(CliError::PanelFailed(message)),
        ChatPanelView::Loading => return Err(CliError::PanelFailed("chat did not finish loading".to_owned())),
        ChatPanelView::Ready { session, degraded, entries, .. } => {
            let mode = if degraded { " (offline)" } else { "" };
            println!("# {} [{}]{mode}", session.title, session.id);
            for entry in &entries {
                print_entry(entry);
            }
        }
    }
    finish(errors)
}

fn print_entry(entry: &ChatEntry) {
    let who = match entry.role() {
        ChatRole::User => "you",
        ChatRole::Assistant => "assistant",
    };
    let marker = if entry.is_pending() { " (sending)" } else { "" };
    println!("{who}{marker}: {}", entry.content());
}

// =============================================================================
// NOTICES
// =============================================================================

/// Print notices to stderr and return how many were errors.
fn report(notices: Vec<Notice>) -> usize {
    let mut errors = 0;
    for notice in notices {
        if notice.is_error() {
            errors += 1;
            eprintln!("error: {}: {}", notice.title, notice.description);
        } else {
            eprintln!("{}: {}", notice.title, notice.description);
        }
    }
    errors
}

fn finish(errors: usize) -> Result<(), CliError> {
    if errors > 0 { Err(CliError::ErrorNotices(errors)) } else { Ok(()) }
}
