//! `todo-sync` -- command-line driver for the sync engine.
//!
//! Every run initializes the app (session check + first fetch), performs one
//! command and prints the resulting store.
//!
//! # Usage
//!
//! ```bash
//! # Against a local mock server
//! cargo run -p mock-server &
//! cargo run --bin todo-sync -- login demo@example.com demo
//! cargo run --bin todo-sync -- add-todolist "Groceries"
//! cargo run --bin todo-sync -- set-status <todolist-id> <task-id> completed
//! ```

use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use todo_sync::{
    ApiClient, ConfigArgs, LoginParams, RootState, Store, SyncConfig, SyncEngine, SyncError, TaskPatch, TaskStatus,
    UreqTransport,
};

#[derive(Parser, Debug)]
#[command(version, about = "Todolist sync client")]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print todolists and tasks.
    Show,
    /// Start a session, then load todolists.
    Login {
        email: String,
        password: String,
        #[arg(long)]
        remember_me: bool,
    },
    /// End the session.
    Logout,
    AddTodolist {
        title: String,
    },
    RemoveTodolist {
        todolist_id: String,
    },
    RenameTodolist {
        todolist_id: String,
        title: String,
    },
    AddTask {
        todolist_id: String,
        title: String,
    },
    RemoveTask {
        todolist_id: String,
        task_id: String,
    },
    RenameTask {
        todolist_id: String,
        task_id: String,
        title: String,
    },
    SetStatus {
        todolist_id: String,
        task_id: String,
        status: StatusArg,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum StatusArg {
    New,
    InProgress,
    Completed,
    Draft,
}

impl From<StatusArg> for TaskStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::New => Self::New,
            StatusArg::InProgress => Self::InProgress,
            StatusArg::Completed => Self::Completed,
            StatusArg::Draft => Self::Draft,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match SyncConfig::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let mut client = ApiClient::new(&config.base_url);
    if let Some(key) = &config.api_key {
        client = client.with_api_key(key.clone());
    }
    let engine = SyncEngine::new(client, UreqTransport::new(), Store::new()).with_options(config.engine_options());

    tracing::info!(base_url = %config.base_url, "initializing");
    let result = match engine.initialize_app().await {
        Ok(_) => run(&engine, cli.command).await,
        Err(e) => Err(e),
    };

    print!("{}", render(&engine.store().snapshot()));
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(engine: &SyncEngine<UreqTransport>, command: Command) -> Result<(), SyncError> {
    match command {
        Command::Show => Ok(()),
        Command::Login {
            email,
            password,
            remember_me,
        } => {
            let params = LoginParams {
                email,
                password,
                remember_me,
                captcha: None,
            };
            engine.login(&params).await?;
            engine.fetch_todolists().await.map(drop)
        }
        Command::Logout => engine.logout().await,
        Command::AddTodolist { title } => engine.add_todolist(&title).await.map(drop),
        Command::RemoveTodolist { todolist_id } => engine.remove_todolist(&todolist_id).await.map(drop),
        Command::RenameTodolist { todolist_id, title } => {
            engine.rename_todolist(&todolist_id, &title).await.map(drop)
        }
        Command::AddTask { todolist_id, title } => engine.add_task(&todolist_id, &title).await.map(drop),
        Command::RemoveTask { todolist_id, task_id } => engine.remove_task(&todolist_id, &task_id).await.map(drop),
        Command::RenameTask {
            todolist_id,
            task_id,
            title,
        } => engine
            .update_task(&todolist_id, &task_id, TaskPatch::title(title))
            .await
            .map(drop),
        Command::SetStatus {
            todolist_id,
            task_id,
            status,
        } => engine
            .update_task(&todolist_id, &task_id, TaskPatch::status(status.into()))
            .await
            .map(drop),
    }
}

fn render(state: &RootState) -> String {
    let mut out = String::new();
    if !state.auth.is_logged_in {
        out.push_str("not logged in\n");
    }
    for tl in state.todolists.as_slice() {
        out.push_str(&format!(
            "{} [{}] filter={:?} status={}\n",
            tl.todolist.title,
            tl.id(),
            tl.filter,
            tl.entity_status
        ));
        for task in state.tasks.visible(tl.id(), tl.filter) {
            let mark = if task.task.status == TaskStatus::Completed { 'x' } else { ' ' };
            out.push_str(&format!("  [{mark}] {} ({})\n", task.task.title, task.id()));
        }
    }
    if let Some(error) = &state.app.error {
        out.push_str(&format!("error: {error}\n"));
    }
    out
}
