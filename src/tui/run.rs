//! TUI entry point and terminal setup.

use std::io;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{prelude::CrosstermBackend, Terminal};

use crate::config::Config;
use crate::db::Database;
use crate::error::PersistenceError;
use crate::storage::TaskStore;
use crate::tui::app::App;

/// Initialise the terminal, run the app until the user quits, then restore the terminal.
pub fn run_tui(
    config: &Config,
    store: TaskStore,
    db: Database,
    load_error: Option<PersistenceError>,
) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(store, db, config.view_state_key(), load_error);
    let result = app.run(&mut terminal);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        tracing::error!(error = %e, "terminal UI failed");
    }
    result
}
