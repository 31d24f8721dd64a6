//! Main application logic for the terminal user interface.
//!
//! `App` owns the task collection, its store and the view state. Every key
//! press is handled to completion and then the collection is flushed, so a
//! mutation shows up immediately and is written before the next key is read.

use std::io;
use std::time::Duration;

use chrono::Local;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};

use crate::db::{format_due_long, format_due_relative, Database};
use crate::error::{PersistenceError, ValidationError};
use crate::fields::Status;
use crate::storage::TaskStore;
use crate::task::{Task, TaskId};
use crate::tui::{
    colors::{status_color, ACCENT, DARK_RED},
    enums::{AppState, ConfirmAction},
    task_form::{TaskForm, DESCRIPTION_ORDER, DUE_ORDER, FIELD_LABELS, LOCATION_ORDER, TITLE_ORDER},
    utils::centered_rect,
    view_state::ViewState,
};
use crate::views::{visible_tasks, Summary};

pub struct App {
    state: AppState,
    db: Database,
    store: TaskStore,
    view: ViewState,
    view_key: String,
    visible: Vec<TaskId>,
    /// Task opened in the detail view. Pinned so that a status change that
    /// moves the list selection never redirects the detail keys.
    detail: Option<TaskId>,
    list_state: TableState,
    form: TaskForm,
    confirm: Option<ConfirmAction>,
    status_message: String,
}

impl App {
    /// Build the app around an already-loaded collection. A load error is
    /// shown in the status bar.
    pub fn new(
        store: TaskStore,
        db: Database,
        view_key: String,
        load_error: Option<PersistenceError>,
    ) -> Self {
        let view = ViewState::load(store.store(), &view_key);
        let mut app = App {
            state: AppState::TaskList,
            db,
            store,
            view,
            view_key,
            visible: Vec::new(),
            detail: None,
            list_state: TableState::default(),
            form: TaskForm::new(),
            confirm: None,
            status_message: String::new(),
        };
        if let Some(e) = load_error {
            app.status_message = format!("{}: {}", e.headline(), e);
        }
        app.refresh_visible();
        app
    }

    /// Recompute the visible list and keep the selection on the same task when possible.
    fn refresh_visible(&mut self) {
        self.visible = visible_tasks(self.db.tasks(), self.view.filter, self.view.sort)
            .into_iter()
            .map(|t| t.id.clone())
            .collect();

        let idx = self
            .view
            .selected
            .as_ref()
            .and_then(|id| self.visible.iter().position(|v| v == id))
            .or_else(|| {
                let previous = self.list_state.selected().unwrap_or(0);
                (!self.visible.is_empty()).then(|| previous.min(self.visible.len() - 1))
            });
        self.list_state.select(idx);
        self.view.selected = idx.map(|i| self.visible[i].clone());
    }

    fn selected_task(&self) -> Option<&Task> {
        self.view.selected.as_ref().and_then(|id| self.db.get(id))
    }

    fn detail_task(&self) -> Option<&Task> {
        self.detail.as_ref().and_then(|id| self.db.get(id))
    }

    fn open_detail(&mut self) {
        if let Some(id) = self.view.selected.clone() {
            self.detail = Some(id);
            self.state = AppState::TaskDetail;
        }
    }

    fn close_detail(&mut self) {
        self.detail = None;
        self.state = AppState::TaskList;
    }

    fn move_selection(&mut self, down: bool) {
        if self.visible.is_empty() {
            return;
        }
        let current = self.list_state.selected().unwrap_or(0);
        let next = if down {
            (current + 1).min(self.visible.len() - 1)
        } else {
            current.saturating_sub(1)
        };
        self.list_state.select(Some(next));
        self.view.selected = Some(self.visible[next].clone());
    }

    fn set_status_message(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }

    /// Write pending mutations. Save failures keep the in-memory state and are reported.
    fn persist(&mut self) {
        if let Err(e) = self.store.flush(&mut self.db) {
            self.set_status_message(format!("{}: {}", e.headline(), e));
        }
    }

    fn toggle(&mut self, id: Option<TaskId>) {
        if let Some(id) = id {
            self.db.toggle_completion(&id);
            self.refresh_visible();
        }
    }

    fn set_status(&mut self, id: Option<TaskId>, status: Status) {
        if let Some(id) = id {
            if self.db.set_status(&id, status) {
                self.set_status_message(format!("Status set to {}", status.label()));
            }
            self.refresh_visible();
        }
    }

    fn cycle_selected_status(&mut self) {
        if let Some(task) = self.selected_task() {
            let idx = Status::ALL.iter().position(|s| *s == task.status).unwrap_or(0);
            let next = Status::ALL[(idx + 1) % Status::ALL.len()];
            let id = task.id.clone();
            self.set_status(Some(id), next);
        }
    }

    fn ask_delete(&mut self, id: Option<TaskId>) {
        if let Some(task) = id.as_ref().and_then(|id| self.db.get(id)) {
            self.confirm = Some(ConfirmAction::Delete {
                id: task.id.clone(),
                title: task.text.clone(),
            });
            self.state = AppState::Confirm;
        }
    }

    fn ask_clear_completed(&mut self) {
        let count = Summary::of(self.db.tasks()).completed;
        if count == 0 {
            self.set_status_message("No completed tasks to clear");
            return;
        }
        self.confirm = Some(ConfirmAction::ClearCompleted { count });
        self.state = AppState::Confirm;
    }

    fn open_form(&mut self) {
        self.form.reset();
        self.view.adding = true;
        self.state = AppState::AddTask;
    }

    fn close_form(&mut self) {
        self.view.adding = false;
        self.state = AppState::TaskList;
    }

    fn submit_form(&mut self) {
        let draft = self.form.to_draft();
        match self.db.add(&draft) {
            Ok(task) => {
                let id = task.id.clone();
                self.view.selected = Some(id.clone());
                self.close_form();
                self.refresh_visible();
                if self.view.selected.as_ref() == Some(&id) {
                    self.set_status_message("Task added");
                } else {
                    self.set_status_message("Task added (hidden by current filter)");
                }
            }
            Err(e) => {
                self.form.focus(field_for_error(&e));
                self.set_status_message(format!("Error: {}", e));
            }
        }
    }

    /// Handle one key press and flush any resulting mutation.
    /// Returns true if the application should quit.
    pub fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) -> bool {
        self.status_message.clear();
        let quit = match self.state {
            AppState::TaskList => self.handle_task_list_input(key, modifiers),
            AppState::TaskDetail => self.handle_detail_input(key),
            AppState::AddTask => self.handle_form_input(key),
            AppState::Help => {
                self.state = AppState::TaskList;
                false
            }
            AppState::Confirm => self.handle_confirm_input(key),
        };
        self.persist();
        quit
    }

    fn handle_task_list_input(&mut self, key: KeyCode, modifiers: KeyModifiers) -> bool {
        match key {
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(false),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(true),
            KeyCode::Enter => self.open_detail(),
            KeyCode::Char('a') => self.open_form(),
            KeyCode::Char(' ') | KeyCode::Char('c') => self.toggle(self.view.selected.clone()),
            KeyCode::Char('s') => self.cycle_selected_status(),
            KeyCode::Char('f') => {
                self.view.filter = self.view.filter.next();
                self.refresh_visible();
            }
            KeyCode::Char('o') => {
                self.view.sort = self.view.sort.next();
                self.refresh_visible();
            }
            KeyCode::Char('d') | KeyCode::Delete => self.ask_delete(self.view.selected.clone()),
            KeyCode::Char('D') => self.ask_clear_completed(),
            KeyCode::Char('h') | KeyCode::F(1) => self.state = AppState::Help,
            _ => {}
        }
        false
    }

    fn handle_detail_input(&mut self, key: KeyCode) -> bool {
        let id = self.detail.clone();
        match key {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Backspace => self.close_detail(),
            KeyCode::Char(' ') => self.toggle(id),
            KeyCode::Char('p') => self.set_status(id, Status::Pending),
            KeyCode::Char('i') => self.set_status(id, Status::InProgress),
            KeyCode::Char('c') => self.set_status(id, Status::Completed),
            KeyCode::Char('x') => self.set_status(id, Status::Cancelled),
            KeyCode::Char('d') => self.ask_delete(id),
            _ => {}
        }
        // The opened task may have left the current filter.
        if self.state == AppState::TaskDetail {
            let still_visible = self
                .detail
                .as_ref()
                .is_some_and(|id| self.visible.contains(id));
            if !still_visible {
                self.close_detail();
            }
        }
        false
    }

    fn handle_form_input(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::Esc => self.close_form(),
            KeyCode::Tab | KeyCode::Down => self.form.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.form.prev_field(),
            KeyCode::Left => self.form.handle_left_right(false),
            KeyCode::Right => self.form.handle_left_right(true),
            KeyCode::Backspace => self.form.handle_backspace(),
            KeyCode::Delete => self.form.handle_delete(),
            KeyCode::Enter => self.submit_form(),
            KeyCode::Char(c) => self.form.handle_char(c),
            _ => {}
        }
        false
    }

    fn handle_confirm_input(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                match self.confirm.take() {
                    Some(ConfirmAction::Delete { id, .. }) => {
                        if self.db.remove(&id).is_some() {
                            self.set_status_message("Task deleted");
                        }
                    }
                    Some(ConfirmAction::ClearCompleted { .. }) => {
                        let removed = self.db.clear_completed();
                        self.set_status_message(format!("Cleared {} completed task(s)", removed));
                    }
                    None => {}
                }
                self.close_detail();
                self.refresh_visible();
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.confirm = None;
                self.close_detail();
            }
            _ => {}
        }
        false
    }

    fn handle_input(&mut self) -> io::Result<bool> {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(self.handle_key(key.code, key.modifiers));
                }
            }
        }
        Ok(false)
    }

    /// Final flush and view-state save on exit.
    pub fn shutdown(&mut self) {
        self.persist();
        self.view.adding = false;
        self.view.save(self.store.store_mut(), &self.view_key);
    }

    fn render_header(&self, f: &mut Frame, area: Rect) {
        let summary = Summary::of(self.db.tasks());
        let header = Line::from(vec![
            Span::styled("TASKS", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::styled(
                format!(
                    "{} total | {} completed | {} remaining",
                    summary.total, summary.completed, summary.remaining
                ),
                Style::default().fg(Color::Cyan),
            ),
            Span::raw("  "),
            Span::styled(
                format!("Filter: {}  Sort: {}", self.view.filter.label(), self.view.sort.label()),
                Style::default().add_modifier(Modifier::ITALIC),
            ),
        ]);
        let block = Paragraph::new(header)
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Center);
        f.render_widget(block, area);
    }

    fn render_task_list(&mut self, f: &mut Frame, area: Rect) {
        let today = Local::now().date_naive();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);
        self.render_header(f, chunks[0]);

        let header = Row::new(["", "Status", "Due", "Title", "Location"].map(|h| {
            Cell::from(h).style(Style::default().add_modifier(Modifier::BOLD))
        }))
        .style(Style::default().bg(ACCENT).fg(Color::White))
        .height(1);

        let rows: Vec<Row> = self
            .visible
            .iter()
            .filter_map(|id| self.db.get(id))
            .map(|task| {
                let check = if task.is_completed() { "[x]" } else { "[ ]" };
                let title_style = if task.is_completed() || task.status == Status::Cancelled {
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT)
                } else {
                    Style::default().fg(Color::White)
                };
                Row::new(vec![
                    Cell::from(check),
                    Cell::from(task.status.label()).style(Style::default().fg(status_color(task.status))),
                    Cell::from(format_due_relative(task.due_date, today)),
                    Cell::from(task.text.clone()).style(title_style),
                    Cell::from(task.location.clone().unwrap_or_default()),
                ])
            })
            .collect();

        let widths = [
            Constraint::Length(3),
            Constraint::Length(12),
            Constraint::Length(10),
            Constraint::Min(25),
            Constraint::Length(20),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title(format!(
                "Tasks ({}/{}) - Press 'h' for help",
                self.visible.len(),
                self.db.len()
            )))
            .row_highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
            .highlight_symbol(">> ");

        f.render_stateful_widget(table, chunks[1], &mut self.list_state);
    }

    fn render_task_detail(&self, f: &mut Frame, area: Rect) {
        let Some(task) = self.detail_task() else {
            return;
        };
        let today = Local::now().date_naive();
        let label = |s: &'static str| Span::styled(s, Style::default().add_modifier(Modifier::BOLD));

        let mut lines = vec![
            Line::from(Span::styled(
                task.text.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(vec![
                label("Status:   "),
                Span::styled(task.status.label(), Style::default().fg(status_color(task.status))),
            ]),
            Line::from(vec![
                label("Due:      "),
                Span::raw(match task.due_date {
                    Some(d) => format!("{} ({})", format_due_long(d), format_due_relative(Some(d), today)),
                    None => "-".to_string(),
                }),
            ]),
            Line::from(vec![
                label("Location: "),
                Span::raw(task.location.clone().unwrap_or_else(|| "-".to_string())),
            ]),
            Line::from(vec![
                label("Created:  "),
                Span::raw(task.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()),
            ]),
            Line::from(vec![label("ID:       "), Span::raw(task.id.to_string())]),
            Line::from(""),
        ];
        match &task.description {
            Some(d) => lines.extend(d.lines().map(|l| Line::from(l.to_string()))),
            None => lines.push(Line::from(Span::styled(
                "No description",
                Style::default().fg(Color::DarkGray),
            ))),
        }
        lines.push(Line::from(""));
        lines.push(Line::from(
            "Space toggle | p pending | i in progress | c completed | x cancelled | d delete | Esc back",
        ));

        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Task Details"))
            .wrap(Wrap { trim: false });
        f.render_widget(paragraph, area);
    }

    fn render_task_form(&self, f: &mut Frame, area: Rect) {
        let area = centered_rect(70, 80, area);
        f.render_widget(Clear, area);
        let outer = Block::default().borders(Borders::ALL).title("New Task");
        let inner = outer.inner(area);
        f.render_widget(outer, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(0),
            ])
            .split(inner);

        for (i, (field, label)) in self.form.fields().into_iter().zip(FIELD_LABELS).enumerate() {
            let style = if field.active {
                Style::default().fg(ACCENT)
            } else {
                Style::default()
            };
            let input = Paragraph::new(field.value.as_str())
                .block(Block::default().borders(Borders::ALL).title(label).border_style(style));
            f.render_widget(input, chunks[i]);
            if field.active {
                let x = chunks[i].x + 1 + field.cursor as u16;
                f.set_cursor_position((x.min(chunks[i].right().saturating_sub(2)), chunks[i].y + 1));
            }
        }

        let hint = Paragraph::new("Tab/↑↓ move between fields | Enter create | Esc cancel")
            .style(Style::default().fg(Color::DarkGray));
        f.render_widget(hint, chunks[4]);
    }

    fn render_help(&self, f: &mut Frame, area: Rect) {
        let bold = |s: &'static str| Line::from(Span::styled(s, Style::default().add_modifier(Modifier::BOLD)));
        let help_text = vec![
            bold("Task List:"),
            Line::from("  ↑/k, ↓/j     Navigate tasks"),
            Line::from("  Enter        View task details"),
            Line::from("  a            Add new task"),
            Line::from("  Space/c      Toggle completion"),
            Line::from("  s            Cycle status (Pending → In Progress → Completed → Cancelled)"),
            Line::from("  f            Cycle filter (All → Active → Completed → In Progress → Cancelled)"),
            Line::from("  o            Cycle sort (Date Added → Due Date → Status)"),
            Line::from("  d            Delete selected task"),
            Line::from("  D            Clear completed tasks"),
            Line::from("  h/F1         Show this help"),
            Line::from("  q/Esc        Quit"),
            Line::from(""),
            bold("Task Detail:"),
            Line::from("  p/i/c/x      Set Pending / In Progress / Completed / Cancelled"),
            Line::from("  Space        Toggle completion"),
            Line::from("  d            Delete task"),
            Line::from("  Esc/q        Back to list"),
            Line::from(""),
            bold("New Task Form:"),
            Line::from("  Tab/↑↓       Move between fields"),
            Line::from("  Enter        Create task"),
            Line::from("  Esc          Cancel"),
            Line::from("  Due date must be YYYY-MM-DD, today or later"),
        ];
        let paragraph = Paragraph::new(help_text)
            .block(Block::default().borders(Borders::ALL).title("Help - Press any key to return"))
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    fn render_confirm(&self, f: &mut Frame, area: Rect) {
        let Some(action) = &self.confirm else {
            return;
        };
        let block = Block::default()
            .title(action.title())
            .borders(Borders::ALL)
            .style(Style::default().bg(DARK_RED));

        let area = centered_rect(50, 20, area);
        f.render_widget(Clear, area);

        let text = vec![
            Line::from(""),
            Line::from(Span::styled(action.question(), Style::default().add_modifier(Modifier::BOLD))),
            Line::from(""),
            Line::from("This action cannot be undone."),
            Line::from(""),
            Line::from("Press 'y' to confirm, 'n' to cancel"),
        ];
        let paragraph = Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else {
            match self.state {
                AppState::TaskList => "a add | Space toggle | f filter | o sort | h help | q quit".to_string(),
                AppState::TaskDetail => "Task Details".to_string(),
                AppState::AddTask => "Add New Task".to_string(),
                AppState::Help => "Help".to_string(),
                AppState::Confirm => "Confirm Action".to_string(),
            }
        };
        let status = Paragraph::new(text)
            .style(Style::default().bg(ACCENT).fg(Color::White))
            .alignment(Alignment::Left);
        f.render_widget(status, area);
    }

    fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(f.area());

        match self.state {
            AppState::TaskList => self.render_task_list(f, chunks[0]),
            AppState::TaskDetail => self.render_task_detail(f, chunks[0]),
            AppState::AddTask => {
                self.render_task_list(f, chunks[0]);
                self.render_task_form(f, chunks[0]);
            }
            AppState::Help => self.render_help(f, chunks[0]),
            AppState::Confirm => {
                self.render_task_list(f, chunks[0]);
                self.render_confirm(f, chunks[0]);
            }
        }
        self.render_status_bar(f, chunks[1]);
    }

    /// Main event loop for the TUI application.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;
            if self.handle_input()? {
                break;
            }
        }
        self.shutdown();
        Ok(())
    }
}

/// Form field to focus after a validation failure.
fn field_for_error(e: &ValidationError) -> usize {
    match e {
        ValidationError::TitleRequired | ValidationError::TitleTooLong(_) => TITLE_ORDER,
        ValidationError::DescriptionTooLong(_) => DESCRIPTION_ORDER,
        ValidationError::InvalidDateFormat
        | ValidationError::InvalidDate(_)
        | ValidationError::DateInPast(_) => DUE_ORDER,
        ValidationError::LocationTooLong(_) => LOCATION_ORDER,
    }
}
