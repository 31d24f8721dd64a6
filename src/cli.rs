use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Simple, file-backed to-do list.
/// Tasks are stored in ~/.todo/todos.json or the directory passed via --data-dir.
#[derive(Parser)]
#[command(name = "todo", version, about = "Personal to-do list for the terminal")]
pub struct Cli {
    /// Directory holding the task file.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Defaults to the interactive UI.
    #[command(subcommand)]
    pub command: Option<Commands>,
}
