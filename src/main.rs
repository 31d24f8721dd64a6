//! # todo - a personal to-do list for the terminal
//!
//! Tasks have a required title, optional description, due date and location,
//! and a status (`pending`, `in-progress`, `completed`, `cancelled`). They are
//! kept in a single JSON file and can be managed two ways:
//!
//! - **TUI** (`todo` or `todo ui`): browse, filter, sort, add, toggle,
//!   re-status and delete tasks interactively.
//! - **CLI** (`todo add`, `todo list`, `todo toggle`, ...): quick capture and
//!   scripting.
//!
//! ## Quick Start
//!
//! ```bash
//! todo add "Buy milk" --due 2030-01-01 --location "Corner shop"
//! todo list --filter active --sort due-date
//! todo status "Buy milk" completed
//! todo clear-completed
//! ```
//!
//! Data lives in `~/.todo/todos.json` (override with `--data-dir` or
//! `TODO_DATA_DIR`). Set `TODO_LOG=debug` for verbose diagnostics.

use clap::Parser;

pub mod cli;
pub mod cmd;
pub mod config;
pub mod db;
pub mod error;
pub mod fields;
pub mod logging;
pub mod storage;
pub mod task;
pub mod validate;
pub mod views;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod enums;
    pub mod input;
    pub mod run;
    pub mod task_form;
    pub mod utils;
    pub mod view_state;
}

use cli::Cli;
use cmd::*;
use config::Config;
use storage::{FileStore, TaskStore};

fn main() {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Ui);

    if let Commands::Completions { shell } = command {
        cmd_completions(shell);
        return;
    }

    let config = Config::resolve(cli.data_dir.as_deref());
    if let Err(e) = std::fs::create_dir_all(&config.data_dir) {
        eprintln!("Failed to create data directory {}: {}", config.data_dir.display(), e);
        std::process::exit(1);
    }

    match command {
        Commands::Ui => logging::init_file(&config.log_file()),
        _ => logging::init_stderr(),
    }
    tracing::debug!(data_dir = %config.data_dir.display(), key = %config.storage_key, "starting");

    let mut store = TaskStore::new(
        Box::new(FileStore::new(&config.data_dir)),
        config.storage_key.clone(),
    );
    let (mut db, load_error) = store.open_database();
    if let Some(e) = &load_error {
        if !matches!(command, Commands::Ui) {
            eprintln!("{}: {e}", e.headline());
        }
    }

    match command {
        Commands::Ui => {
            if let Err(e) = tui::run::run_tui(&config, store, db, load_error) {
                eprintln!("UI error: {e}");
                std::process::exit(1);
            }
        }
        Commands::Add { text, desc, due, location } =>
            cmd_add(&mut db, &mut store, text, desc, due, location),

        Commands::List { filter, sort, limit } => cmd_list(&db, filter, sort, limit),

        Commands::View { id } => cmd_view(&db, id),

        Commands::Toggle { id } => cmd_toggle(&mut db, &mut store, id),

        Commands::Status { id, status } => cmd_status(&mut db, &mut store, id, status),

        Commands::Delete { id, yes } => cmd_delete(&mut db, &mut store, id, yes),

        Commands::ClearCompleted { yes } => cmd_clear_completed(&mut db, &mut store, yes),

        Commands::Backup => cmd_backup(&mut store),

        Commands::Completions { .. } => unreachable!("completions handled above"),
    }
}
