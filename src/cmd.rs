//! Command implementations for the CLI interface.
//!
//! Each handler works on the already-loaded `Database`, flushes it through the
//! `TaskStore` after a mutation and reports problems on stderr.

use std::io::{self, BufRead, Write};

use chrono::Local;
use clap::Subcommand;
use clap_complete::{generate, Shell};

use crate::db::*;
use crate::fields::*;
use crate::storage::TaskStore;
use crate::task::TaskId;
use crate::validate::TaskDraft;
use crate::views::{visible_tasks, Summary};

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive UI (default).
    Ui,

    /// Add a new task.
    Add {
        /// Short title for the task (1-100 characters).
        text: String,
        /// Optional longer description.
        #[arg(long)]
        desc: Option<String>,
        /// Due date in YYYY-MM-DD format, today or later.
        #[arg(long)]
        due: Option<String>,
        /// Where the task happens.
        #[arg(long)]
        location: Option<String>,
    },

    /// List tasks.
    List {
        /// Which tasks to show.
        #[arg(long, value_enum, default_value_t = FilterMode::All)]
        filter: FilterMode,
        /// Sort order.
        #[arg(long, value_enum, default_value_t = SortKey::DateAdded)]
        sort: SortKey,
        /// Limit number of rows printed.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show every field of one task.
    View {
        /// Task id, id prefix or exact title.
        id: String,
    },

    /// Flip a task between completed and pending.
    Toggle {
        /// Task id, id prefix or exact title.
        id: String,
    },

    /// Set the status of a task.
    Status {
        /// Task id, id prefix or exact title.
        id: String,
        /// New status: pending | in-progress | completed | cancelled.
        #[arg(value_enum)]
        status: Status,
    },

    /// Delete a task.
    Delete {
        /// Task id, id prefix or exact title.
        id: String,
        /// Skip the confirmation prompt.
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Delete every completed task.
    ClearCompleted {
        /// Skip the confirmation prompt.
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Copy the task file to a timestamped backup.
    Backup,

    /// Generate shell completions.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn resolve_or_exit(db: &Database, id: &str) -> TaskId {
    match db.resolve(id) {
        Ok(id) => id,
        Err(e) => {
            eprintln!("Error resolving task: {}", e);
            std::process::exit(1);
        }
    }
}

fn flush_or_exit(db: &mut Database, store: &mut TaskStore) {
    if let Err(e) = store.flush(db) {
        eprintln!("{}: {e}", e.headline());
        std::process::exit(1);
    }
}

/// Ask a yes/no question on stdin. Anything but "y"/"yes" is a no.
pub fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(is_yes(&line))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Add a new task.
pub fn cmd_add(
    db: &mut Database,
    store: &mut TaskStore,
    text: String,
    desc: Option<String>,
    due: Option<String>,
    location: Option<String>,
) {
    let draft = TaskDraft {
        text,
        description: desc,
        due_date: due,
        location,
    };
    let id = match db.add(&draft) {
        Ok(task) => task.id.clone(),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    flush_or_exit(db, store);
    println!("Added task {}", id.short());
}

/// List tasks, filtered then sorted, with a summary line.
pub fn cmd_list(db: &Database, filter: FilterMode, sort: SortKey, limit: Option<usize>) {
    let mut tasks = visible_tasks(db.tasks(), filter, sort);
    if tasks.is_empty() {
        println!("No tasks.");
    } else {
        if let Some(limit) = limit {
            tasks.truncate(limit);
        }
        print_table(&tasks);
    }
    let summary = Summary::of(db.tasks());
    println!(
        "\n{} total, {} completed, {} remaining (filter: {}, sort: {})",
        summary.total,
        summary.completed,
        summary.remaining,
        filter.label(),
        sort.label()
    );
}

/// Print every field of a single task.
pub fn cmd_view(db: &Database, id: String) {
    let task_id = resolve_or_exit(db, &id);
    let Some(t) = db.get(&task_id) else {
        eprintln!("Task {} not found.", id);
        std::process::exit(1);
    };
    let today = Local::now().date_naive();
    println!("ID:          {}", t.id);
    println!("Title:       {}", t.text);
    println!("Status:      {}", t.status.label());
    println!("Completed:   {}", if t.is_completed() { "yes" } else { "no" });
    match t.due_date {
        Some(d) => println!("Due:         {} ({})", format_due_long(d), format_due_relative(Some(d), today)),
        None => println!("Due:         -"),
    }
    println!("Location:    {}", t.location.as_deref().unwrap_or("-"));
    println!(
        "Created:     {}",
        t.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
    );
    if let Some(desc) = &t.description {
        println!("\n{}", desc);
    }
}

/// Toggle completion of a task.
pub fn cmd_toggle(db: &mut Database, store: &mut TaskStore, id: String) {
    let task_id = resolve_or_exit(db, &id);
    db.toggle_completion(&task_id);
    flush_or_exit(db, store);
    if let Some(t) = db.get(&task_id) {
        println!("{} is now {}", task_id.short(), t.status.label());
    }
}

/// Set the status of a task.
pub fn cmd_status(db: &mut Database, store: &mut TaskStore, id: String, status: Status) {
    let task_id = resolve_or_exit(db, &id);
    db.set_status(&task_id, status);
    flush_or_exit(db, store);
    println!("{} is now {}", task_id.short(), status.label());
}

/// Delete a task after confirmation.
pub fn cmd_delete(db: &mut Database, store: &mut TaskStore, id: String, yes: bool) {
    let task_id = resolve_or_exit(db, &id);
    let title = db.get(&task_id).map(|t| t.text.clone()).unwrap_or_default();
    if !yes {
        match confirm(&format!("Delete task '{}'?", title)) {
            Ok(true) => {}
            Ok(false) => {
                println!("Cancelled.");
                return;
            }
            Err(e) => {
                eprintln!("Failed to read confirmation: {e}");
                std::process::exit(1);
            }
        }
    }
    db.remove(&task_id);
    flush_or_exit(db, store);
    println!("Deleted.");
}

/// Delete all completed tasks after confirmation.
pub fn cmd_clear_completed(db: &mut Database, store: &mut TaskStore, yes: bool) {
    let count = Summary::of(db.tasks()).completed;
    if count == 0 {
        println!("No completed tasks.");
        return;
    }
    if !yes {
        match confirm(&format!("Delete {} completed task(s)?", count)) {
            Ok(true) => {}
            Ok(false) => {
                println!("Cancelled.");
                return;
            }
            Err(e) => {
                eprintln!("Failed to read confirmation: {e}");
                std::process::exit(1);
            }
        }
    }
    let removed = db.clear_completed();
    flush_or_exit(db, store);
    println!("Deleted {} task(s).", removed);
}

/// Back up the task file.
pub fn cmd_backup(store: &mut TaskStore) {
    match store.backup() {
        Ok(Some(location)) => println!("Backup created: {}", location),
        Ok(None) => println!("Nothing to back up yet."),
        Err(e) => {
            eprintln!("{}: {e}", e.headline());
            std::process::exit(1);
        }
    }
}

pub fn cmd_completions(shell: Shell) {
    use clap::CommandFactory;
    use crate::cli::Cli;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes("\n"));
        assert!(!is_yes("nope"));
    }

    #[test]
    fn test_parse_add() {
        let cli = Cli::try_parse_from([
            "todo", "add", "Buy milk", "--due", "2030-01-01", "--location", "Shop",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Add { text, desc, due, location }) => {
                assert_eq!(text, "Buy milk");
                assert_eq!(desc, None);
                assert_eq!(due.as_deref(), Some("2030-01-01"));
                assert_eq!(location.as_deref(), Some("Shop"));
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn test_parse_list_and_status_values() {
        let cli = Cli::try_parse_from(["todo", "list", "--filter", "in-progress", "--sort", "due-date"]).unwrap();
        match cli.command {
            Some(Commands::List { filter, sort, limit }) => {
                assert_eq!(filter, FilterMode::InProgress);
                assert_eq!(sort, SortKey::DueDate);
                assert_eq!(limit, None);
            }
            _ => panic!("expected list"),
        }

        let cli = Cli::try_parse_from(["todo", "status", "abc", "cancelled"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Status { status: Status::Cancelled, .. })));

        let cli = Cli::try_parse_from(["todo", "--data-dir", "/tmp/x"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.data_dir.is_some());
    }
}
