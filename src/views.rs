//! Display-ordered, display-filtered views of the task collection.
//!
//! Everything here is pure. Views are always built filter-first, then sorted.

use std::cmp::Ordering;

use crate::fields::{FilterMode, SortKey, Status};
use crate::task::Task;

/// Whether a task is selected by the given filter mode.
pub fn matches_filter(task: &Task, mode: FilterMode) -> bool {
    match mode {
        FilterMode::All => true,
        FilterMode::Active => !task.is_completed(),
        FilterMode::Completed => task.is_completed(),
        FilterMode::InProgress => task.status == Status::InProgress,
        FilterMode::Cancelled => task.status == Status::Cancelled,
    }
}

/// Tasks selected by `mode`, in collection order.
pub fn filter_tasks(tasks: &[Task], mode: FilterMode) -> Vec<&Task> {
    tasks.iter().filter(|t| matches_filter(t, mode)).collect()
}

/// Order tasks by `key`. The sort is stable, so ties keep their input order.
///
/// Status ordering compares the stored status names, which puts cancelled
/// first and pending last.
pub fn sort_tasks(mut tasks: Vec<&Task>, key: SortKey) -> Vec<&Task> {
    tasks.sort_by(|a, b| compare(a, b, key));
    tasks
}

fn compare(a: &Task, b: &Task, key: SortKey) -> Ordering {
    match key {
        SortKey::DateAdded => b.created_at.cmp(&a.created_at),
        // Undated tasks go after every dated one.
        SortKey::DueDate => (a.due_date.is_none(), a.due_date).cmp(&(b.due_date.is_none(), b.due_date)),
        SortKey::Status => a.status.as_str().cmp(b.status.as_str()),
    }
}

/// The list shown to the user: filter first, then sort the survivors.
pub fn visible_tasks(tasks: &[Task], mode: FilterMode, key: SortKey) -> Vec<&Task> {
    sort_tasks(filter_tasks(tasks, mode), key)
}

/// Counts shown alongside the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Summary {
    pub total: usize,
    pub completed: usize,
    pub remaining: usize,
}

impl Summary {
    pub fn of(tasks: &[Task]) -> Self {
        let total = tasks.len();
        let completed = tasks.iter().filter(|t| t.is_completed()).count();
        Summary {
            total,
            completed,
            remaining: total - completed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskId;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn task(id: &str, status: Status, due: Option<(i32, u32, u32)>, created_minute: u32) -> Task {
        Task {
            id: TaskId::from(id),
            text: format!("task {id}"),
            description: None,
            due_date: due.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
            location: None,
            status,
            created_at: Utc.with_ymd_and_hms(2026, 5, 1, 8, created_minute, 0).unwrap(),
        }
    }

    fn ids(tasks: &[&Task]) -> Vec<String> {
        tasks.iter().map(|t| t.id.to_string()).collect()
    }

    fn fixture() -> Vec<Task> {
        vec![
            task("a", Status::Pending, Some((2027, 3, 1)), 0),
            task("b", Status::Completed, None, 5),
            task("c", Status::InProgress, Some((2026, 12, 24)), 10),
            task("d", Status::Cancelled, None, 15),
            task("e", Status::Pending, Some((2026, 12, 24)), 20),
        ]
    }

    #[test]
    fn test_filter_modes() {
        let tasks = fixture();
        assert_eq!(ids(&filter_tasks(&tasks, FilterMode::All)), ["a", "b", "c", "d", "e"]);
        assert_eq!(ids(&filter_tasks(&tasks, FilterMode::Active)), ["a", "c", "d", "e"]);
        assert_eq!(ids(&filter_tasks(&tasks, FilterMode::Completed)), ["b"]);
        assert_eq!(ids(&filter_tasks(&tasks, FilterMode::InProgress)), ["c"]);
        assert_eq!(ids(&filter_tasks(&tasks, FilterMode::Cancelled)), ["d"]);
        let lossy = FilterMode::from_str_lossy("someday");
        assert_eq!(filter_tasks(&tasks, lossy).len(), tasks.len());
    }

    #[test]
    fn test_active_and_completed_partition() {
        let tasks: Vec<Task> = (0..8)
            .map(|i| {
                let status = if i % 3 == 0 { Status::Completed } else { Status::Pending };
                task(&i.to_string(), status, None, i)
            })
            .collect();
        let active = filter_tasks(&tasks, FilterMode::Active);
        let completed = filter_tasks(&tasks, FilterMode::Completed);
        assert_eq!(active.len() + completed.len(), tasks.len());
        for t in &tasks {
            let in_active = active.iter().any(|a| a.id == t.id);
            let in_completed = completed.iter().any(|c| c.id == t.id);
            assert!(in_active ^ in_completed);
        }
    }

    #[test]
    fn test_sort_date_added_newest_first() {
        let tasks = fixture();
        let sorted = sort_tasks(tasks.iter().collect(), SortKey::DateAdded);
        assert_eq!(ids(&sorted), ["e", "d", "c", "b", "a"]);
    }

    #[test]
    fn test_sort_due_date_undated_last_and_stable() {
        let tasks = fixture();
        let sorted = sort_tasks(tasks.iter().collect(), SortKey::DueDate);
        assert_eq!(ids(&sorted), ["c", "e", "a", "b", "d"]);
    }

    #[test]
    fn test_sort_status_is_alphabetical() {
        let tasks = fixture();
        let sorted = sort_tasks(tasks.iter().collect(), SortKey::Status);
        assert_eq!(ids(&sorted), ["d", "b", "c", "a", "e"]);
    }

    #[test]
    fn test_sort_is_idempotent() {
        let tasks = fixture();
        for key in SortKey::ALL {
            let once = sort_tasks(tasks.iter().collect(), key);
            let twice = sort_tasks(once.clone(), key);
            assert_eq!(ids(&once), ids(&twice));
        }
    }

    #[test]
    fn test_sort_leaves_collection_untouched() {
        let tasks = fixture();
        let _ = visible_tasks(&tasks, FilterMode::All, SortKey::Status);
        assert_eq!(tasks, fixture());
    }

    #[test]
    fn test_visible_filters_then_sorts() {
        let tasks = fixture();
        let visible = visible_tasks(&tasks, FilterMode::Active, SortKey::DueDate);
        assert_eq!(ids(&visible), ["c", "e", "a", "d"]);
    }

    #[test]
    fn test_summary() {
        let tasks = fixture();
        assert_eq!(
            Summary::of(&tasks),
            Summary { total: 5, completed: 1, remaining: 4 }
        );
    }
}
