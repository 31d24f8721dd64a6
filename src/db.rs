//! In-memory task collection and display helpers.
//!
//! `Database` owns the ordered task list and every mutation on it. It does no
//! I/O itself: mutations set a dirty flag that `storage::TaskStore::flush`
//! consults before writing the collection back.

use chrono::{DateTime, Local, NaiveDate, Utc};

use crate::error::ValidationError;
use crate::fields::Status;
use crate::task::{Task, TaskId};
use crate::validate::{validate, TaskDraft};

/// The task collection for the current session.
#[derive(Debug, Default, Clone)]
pub struct Database {
    tasks: Vec<Task>,
    dirty: bool,
}

impl Database {
    /// Wrap tasks loaded from storage. The result starts clean.
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        Database { tasks, dirty: false }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Whether there are mutations not yet written to storage.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Get a task by ID.
    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    fn get_mut(&mut self, id: &TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| &t.id == id)
    }

    /// Validate a draft against today's local date and append it as a new pending task.
    pub fn add(&mut self, draft: &TaskDraft) -> Result<&Task, ValidationError> {
        self.add_at(draft, Local::now().date_naive(), Utc::now())
    }

    /// Like [`Database::add`] with an explicit clock.
    pub fn add_at(
        &mut self,
        draft: &TaskDraft,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<&Task, ValidationError> {
        let valid = validate(draft, today)?;
        let mut id = TaskId::generate();
        while self.get(&id).is_some() {
            id = TaskId::generate();
        }
        self.tasks.push(Task {
            id,
            text: valid.text,
            description: valid.description,
            due_date: valid.due_date,
            location: valid.location,
            status: Status::Pending,
            created_at: now,
        });
        self.dirty = true;
        let task = &self.tasks[self.tasks.len() - 1];
        tracing::debug!(id = %task.id, "task added");
        Ok(task)
    }

    /// Flip completion: a completed task goes back to pending, anything else
    /// becomes completed. Returns false when the id is unknown.
    pub fn toggle_completion(&mut self, id: &TaskId) -> bool {
        let Some(task) = self.get_mut(id) else {
            return false;
        };
        task.status = if task.is_completed() {
            Status::Pending
        } else {
            Status::Completed
        };
        tracing::debug!(id = %id, status = task.status.as_str(), "completion toggled");
        self.dirty = true;
        true
    }

    /// Set the status directly. Returns false when the id is unknown.
    pub fn set_status(&mut self, id: &TaskId, status: Status) -> bool {
        let Some(task) = self.get_mut(id) else {
            return false;
        };
        task.status = status;
        tracing::debug!(id = %id, status = status.as_str(), "status set");
        self.dirty = true;
        true
    }

    /// Remove a task. Callers confirm with the user first.
    pub fn remove(&mut self, id: &TaskId) -> Option<Task> {
        let idx = self.tasks.iter().position(|t| &t.id == id)?;
        self.dirty = true;
        tracing::debug!(id = %id, "task removed");
        Some(self.tasks.remove(idx))
    }

    /// Remove every completed task and return how many went. Callers confirm first.
    pub fn clear_completed(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|t| !t.is_completed());
        let removed = before - self.tasks.len();
        if removed > 0 {
            self.dirty = true;
            tracing::debug!(removed, "completed tasks cleared");
        }
        removed
    }

    /// Resolve a user-supplied identifier: full id, unique id prefix, or
    /// unique case-insensitive title.
    pub fn resolve(&self, identifier: &str) -> Result<TaskId, String> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err("Empty task identifier".to_string());
        }
        if let Some(task) = self.tasks.iter().find(|t| t.id.as_str() == identifier) {
            return Ok(task.id.clone());
        }

        let by_prefix: Vec<&Task> = self
            .tasks
            .iter()
            .filter(|t| t.id.as_str().starts_with(identifier))
            .collect();
        if by_prefix.len() == 1 {
            return Ok(by_prefix[0].id.clone());
        }
        if by_prefix.len() > 1 {
            return Err(ambiguous(identifier, &by_prefix));
        }

        let lower = identifier.to_lowercase();
        let by_title: Vec<&Task> = self
            .tasks
            .iter()
            .filter(|t| t.text.to_lowercase() == lower)
            .collect();
        match by_title.len() {
            0 => Err(format!("No task found with id or title '{}'", identifier)),
            1 => Ok(by_title[0].id.clone()),
            _ => Err(ambiguous(identifier, &by_title)),
        }
    }
}

fn ambiguous(identifier: &str, matches: &[&Task]) -> String {
    let mut msg = format!("Multiple tasks match '{}':\n", identifier);
    for task in matches {
        msg.push_str(&format!("  {}  {} ({})\n", task.id.short(), task.text, task.status.label()));
    }
    msg.push_str("Please use a longer id prefix.");
    msg
}

/// Format a due date relative to today ("today", "tomorrow", "in 3d", "2d late").
pub fn format_due_relative(due: Option<NaiveDate>, today: NaiveDate) -> String {
    match due {
        None => "-".into(),
        Some(d) => {
            let days = (d - today).num_days();
            if days == 0 {
                "today".into()
            } else if days == 1 {
                "tomorrow".into()
            } else if days > 1 {
                format!("in {}d", days)
            } else {
                format!("{}d late", -days)
            }
        }
    }
}

/// Format a due date for detail views, e.g. "Dec 31, 2024".
pub fn format_due_long(due: NaiveDate) -> String {
    due.format("%b %-d, %Y").to_string()
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}

/// Print tasks as a plain table.
pub fn print_table(tasks: &[&Task]) {
    println!("{:<9} {:<12} {:<10} {:<16} {}", "ID", "Status", "Due", "Location", "Title");
    let today = Local::now().date_naive();
    for t in tasks {
        let location = t.location.as_deref().unwrap_or("-");
        println!(
            "{:<9} {:<12} {:<10} {:<16} {}",
            t.id.short(),
            t.status.label(),
            format_due_relative(t.due_date, today),
            truncate(location, 16),
            t.text
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn add(db: &mut Database, text: &str) -> TaskId {
        db.add_at(&TaskDraft::new(text), today(), Utc::now()).unwrap().id.clone()
    }

    #[test]
    fn test_add_defaults() {
        let mut db = Database::default();
        let before = Utc::now();
        let task = db.add(&TaskDraft::new("Buy milk")).unwrap().clone();
        assert_eq!(task.status, Status::Pending);
        assert!(!task.is_completed());
        assert!(!task.id.as_str().is_empty());
        assert!(task.created_at >= before);
        assert_eq!(task.description, None);
        assert_eq!(task.due_date, None);
        assert_eq!(task.location, None);
        assert!(db.is_dirty());
    }

    #[test]
    fn test_add_assigns_distinct_ids() {
        let mut db = Database::default();
        let ids: Vec<TaskId> = (0..50).map(|i| add(&mut db, &format!("task {i}"))).collect();
        let mut unique = ids.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn test_invalid_draft_changes_nothing() {
        let mut db = Database::default();
        assert_eq!(
            db.add_at(&TaskDraft::new("   "), today(), Utc::now()).unwrap_err(),
            ValidationError::TitleRequired
        );
        assert!(db.is_empty());
        assert!(!db.is_dirty());
    }

    #[test]
    fn test_toggle_is_an_involution() {
        let mut db = Database::default();
        let id = add(&mut db, "Water plants");
        for start in Status::ALL {
            db.set_status(&id, start);
            let before = db.get(&id).unwrap().clone();
            assert!(db.toggle_completion(&id));
            assert!(db.toggle_completion(&id));
            let after = db.get(&id).unwrap();
            if start == Status::Completed || start == Status::Pending {
                assert_eq!(after, &before);
            }
            assert_eq!(after.is_completed(), after.status == Status::Completed);
        }
    }

    #[test]
    fn test_toggle_sets_status() {
        let mut db = Database::default();
        let id = add(&mut db, "Call mum");
        db.toggle_completion(&id);
        assert_eq!(db.get(&id).unwrap().status, Status::Completed);
        db.toggle_completion(&id);
        assert_eq!(db.get(&id).unwrap().status, Status::Pending);

        db.set_status(&id, Status::Cancelled);
        db.toggle_completion(&id);
        assert_eq!(db.get(&id).unwrap().status, Status::Completed);
    }

    #[test]
    fn test_set_status_keeps_completion_in_sync() {
        let mut db = Database::default();
        let id = add(&mut db, "File taxes");
        for status in Status::ALL {
            assert!(db.set_status(&id, status));
            let task = db.get(&id).unwrap();
            assert_eq!(task.is_completed(), status == Status::Completed);
        }
    }

    #[test]
    fn test_unknown_id_is_a_noop() {
        let mut db = Database::default();
        add(&mut db, "Only task");
        db.mark_clean();
        let missing = TaskId::from("missing");
        assert!(!db.toggle_completion(&missing));
        assert!(!db.set_status(&missing, Status::Completed));
        assert!(db.remove(&missing).is_none());
        assert!(!db.is_dirty());
    }

    #[test]
    fn test_buy_milk_scenario() {
        let mut db = Database::default();
        let id = add(&mut db, "Buy milk");
        add(&mut db, "Walk dog");
        db.set_status(&id, Status::Completed);
        assert!(db.get(&id).unwrap().is_completed());
        assert_eq!(db.clear_completed(), 1);
        assert!(db.get(&id).is_none());
        assert_eq!(db.len(), 1);
    }

    #[test]
    fn test_clear_completed_without_matches_stays_clean() {
        let mut db = Database::default();
        add(&mut db, "Pending");
        db.mark_clean();
        assert_eq!(db.clear_completed(), 0);
        assert!(!db.is_dirty());
    }

    #[test]
    fn test_resolve() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let mut tasks = Vec::new();
        for (id, text) in [("abc123", "Buy milk"), ("abd456", "Walk dog"), ("xyz789", "walk DOG")] {
            tasks.push(Task {
                id: TaskId::from(id),
                text: text.into(),
                description: None,
                due_date: None,
                location: None,
                status: Status::Pending,
                created_at: now,
            });
        }
        let db = Database::from_tasks(tasks);
        assert_eq!(db.resolve("abc123").unwrap().as_str(), "abc123");
        assert_eq!(db.resolve("abd").unwrap().as_str(), "abd456");
        assert_eq!(db.resolve("BUY MILK").unwrap().as_str(), "abc123");
        assert!(db.resolve("ab").unwrap_err().starts_with("Multiple tasks match"));
        assert!(db.resolve("walk dog").unwrap_err().starts_with("Multiple tasks match"));
        assert!(db.resolve("nothing").is_err());
    }

    #[test]
    fn test_format_due_relative() {
        let t = today();
        assert_eq!(format_due_relative(None, t), "-");
        assert_eq!(format_due_relative(Some(t), t), "today");
        assert_eq!(format_due_relative(Some(t + Duration::days(1)), t), "tomorrow");
        assert_eq!(format_due_relative(Some(t + Duration::days(5)), t), "in 5d");
        assert_eq!(format_due_relative(Some(t - Duration::days(2)), t), "2d late");
        assert_eq!(format_due_long(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()), "Dec 31, 2024");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a longer location", 8), "a longe…");
    }
}
