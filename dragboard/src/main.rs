//! `dragboard`: command-line driver for a kanban board.
//!
//! Loads the board from a file-backed document store, applies one command
//! and prints the result. Configuration via CLI flags, environment
//! variables, or config file (`~/.config/dragboard/config.toml`).
//!
//! ```bash
//! dragboard add-column
//! dragboard add-task <COLUMN_ID>
//! dragboard drag task:<TASK_ID> --over column:<COLUMN_ID>
//! dragboard --json show
//! ```

use std::fmt::Write as _;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use dragboard::BoardSession;
use dragboard::config::{BoardConfig, CliArgs, Command};
use dragboard::drag::DragEvent;
use dragboard::ids::UuidIds;
use dragboard::remote::file::FileDocumentStore;
use dragboard_proto::board::{Board, ColumnId, TaskId};
use tracing_appender::non_blocking::WorkerGuard;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = CliArgs::parse();

    // Logs go to stderr so stdout carries only the board.
    let _log_guard = init_logging(&cli.log_level, cli.log_file.as_deref());

    let config = match BoardConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!(error = %e, "failed to load config file; using defaults");
            eprintln!("Warning: failed to load config file: {e}");
            BoardConfig::default()
        }
    };

    let remote = Arc::new(FileDocumentStore::new(&config.store_dir));
    let options = config.sync_options();
    let mut session = match BoardSession::load(remote, &options, UuidIds).await {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(
                error = %e,
                store_dir = %config.store_dir.display(),
                "failed to load board"
            );
            eprintln!("error: failed to load board: {e}");
            return ExitCode::FAILURE;
        }
    };

    let sync = session.synchronizer();
    tracing::info!(
        board_id = %session.board_id(),
        collection = sync.collection(),
        mode = %sync.mode(),
        origin = ?session.origin(),
        "board loaded"
    );

    execute(&mut session, cli.command.unwrap_or(Command::Show));
    session.flush().await;

    let board = session.to_board();
    if cli.json {
        match serde_json::to_string_pretty(&board) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("error: failed to encode board: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        print!("{}", render(&board));
    }
    ExitCode::SUCCESS
}

/// Initialize logging through a non-blocking writer.
///
/// Logs go to `file_path` when given and to stderr otherwise. The returned
/// [`WorkerGuard`] must be held until shutdown so buffered entries are
/// flushed.
fn init_logging(level: &str, file_path: Option<&Path>) -> WorkerGuard {
    let file = file_path.and_then(|p| Some((p.parent()?, p.file_name()?)));
    let to_file = file.is_some();
    let (non_blocking, guard) = match file {
        Some((dir, name)) => {
            tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name))
        }
        None => tracing_appender::non_blocking(std::io::stderr()),
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(!to_file)
        .init();

    guard
}

/// Applies one command to the session.
fn execute(session: &mut BoardSession<FileDocumentStore>, command: Command) {
    tracing::debug!(?command, "executing");
    match command {
        Command::Show => {}
        Command::AddColumn => {
            session.create_column();
        }
        Command::AddTask { column } => {
            session.create_task(&ColumnId::new(column));
        }
        Command::RenameColumn { id, title } => {
            session.rename_column(&ColumnId::new(id), &title);
        }
        Command::RenameTask { id, content } => {
            session.rename_task(&TaskId::new(id), &content);
        }
        Command::DeleteColumn { id } => {
            session.delete_column(&ColumnId::new(id));
        }
        Command::DeleteTask { id } => {
            session.delete_task(&TaskId::new(id));
        }
        Command::Drag {
            active,
            over,
            cancel,
        } => {
            session.drag_start(&active);
            let event = match over {
                Some(over) => DragEvent::new(active, over),
                None => DragEvent::without_target(active),
            };
            session.drag_over(&event);
            if cancel {
                session.drag_cancel();
            } else {
                session.drag_end(&event);
            }
        }
    }
}

/// Plain-text board listing, one column per block.
fn render(board: &Board) -> String {
    let mut out = format!("board {}\n", board.id);
    for column in &board.columns {
        writeln!(out, "\n{} [{}]", column.title, column.id).ok();
        for task in board.tasks_in(&column.id) {
            writeln!(out, "  - {} [{}]", task.content, task.id).ok();
        }
    }
    out
}
