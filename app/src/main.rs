use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use todo_core::{FilterMode, SortKey, TodoClient};
use todo_app::{logging, AppConfig, FormField, ToastService, TodoApi, TodoApp, UreqTransport};

#[derive(Parser)]
#[command(name = "todo-app", version, about = "Manage todos on a remote todo API")]
struct Cli {
    /// Base URL of the API (overrides TODO_API_URL).
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Which todos to show.
    #[arg(long, global = true, default_value_t = FilterMode::All)]
    filter: FilterMode,

    /// How to order the list.
    #[arg(long, global = true, default_value_t = SortKey::DueDate)]
    sort: SortKey,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Show the list (default).
    List,
    /// Create a todo.
    Add {
        #[arg(long, value_parser = non_blank)]
        title: String,
        #[arg(long)]
        description: Option<String>,
        /// Due date as YYYY-MM-DD.
        #[arg(long)]
        due: Option<String>,
    },
    /// Change fields of an existing todo. Pass an empty --due to clear it.
    Edit {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        due: Option<String>,
    },
    /// Mark a todo as done.
    Complete { id: i64 },
    /// Mark a todo as not done.
    Incomplete { id: i64 },
    /// Delete a todo.
    Delete { id: i64 },
    /// Delete every todo.
    Clear,
}

fn non_blank(raw: &str) -> Result<String, String> {
    if raw.trim().is_empty() {
        Err("the title must not be empty".to_string())
    } else {
        Ok(raw.to_string())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = AppConfig::load().context("loading configuration")?;
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url;
        config.validate().context("checking --api-url")?;
    }
    logging::init(&config.log_level);
    tracing::debug!(?config, "starting");

    let toasts = ToastService::new(config.toast_duration());
    let api = TodoApi::new(TodoClient::new(&config.api_url), UreqTransport::new());
    let mut app = TodoApp::new(api, toasts.clone());
    app.set_filter(cli.filter);
    app.set_sort_key(cli.sort);

    let loaded = app.load().await;
    let ok = match cli.command.unwrap_or(Command::List) {
        Command::List => loaded,
        Command::Add {
            title,
            description,
            due,
        } => {
            app.toggle_form();
            app.set_draft(FormField::Title, title);
            app.set_draft(FormField::Description, description.unwrap_or_default());
            app.set_draft(FormField::DueDate, due.unwrap_or_default());
            app.submit_new().await
        }
        Command::Edit {
            id,
            title,
            description,
            due,
        } => {
            if app.begin_edit(id) {
                let fields = [
                    (FormField::Title, title),
                    (FormField::Description, description),
                    (FormField::DueDate, due),
                ];
                for (field, value) in fields {
                    if let Some(value) = value {
                        app.set_editing_field(field, value);
                    }
                }
                app.submit_edit().await
            } else {
                false
            }
        }
        Command::Complete { id } => app.complete(id).await,
        Command::Incomplete { id } => app.incomplete(id).await,
        Command::Delete { id } => app.delete(id).await,
        Command::Clear => app.clear_all().await,
    };

    let mut screen = app.render();
    if app.has_render_fault() {
        tracing::warn!("screen failed to render, reloading");
        app.reload().await;
        screen = app.render();
    }
    print!("{screen}");
    if let Some(toast) = toasts.current() {
        eprintln!("[{}] {}", toast.kind, toast.message);
    }

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
