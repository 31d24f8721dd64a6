//! Task data structure and its storage representation.
//!
//! A `Task` keeps `status` as the single source of truth; completion is
//! derived from it. The stored JSON record still carries a `completed`
//! flag so files written by older builds keep loading.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::fields::Status;

/// Opaque, immutable task identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        TaskId(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First eight characters, enough to tell tasks apart in a listing.
    pub fn short(&self) -> &str {
        let end = self.0.char_indices().nth(8).map_or(self.0.len(), |(i, _)| i);
        &self.0[..end]
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        TaskId(s.to_string())
    }
}

/// A single to-do record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TaskRecord", into = "TaskRecord")]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub location: Option<String>,
    pub status: Status,
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn is_completed(&self) -> bool {
        self.status == Status::Completed
    }
}

/// On-disk layout of a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskRecord {
    id: TaskId,
    text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    location: Option<String>,
    status: Status,
    #[serde(default)]
    completed: Option<bool>,
    created_at: DateTime<Utc>,
}

impl From<TaskRecord> for Task {
    fn from(r: TaskRecord) -> Self {
        if let Some(completed) = r.completed {
            if completed != (r.status == Status::Completed) {
                tracing::warn!(
                    id = %r.id,
                    status = r.status.as_str(),
                    completed,
                    "stored completion flag disagrees with status; keeping status"
                );
            }
        }
        Task {
            id: r.id,
            text: r.text,
            description: r.description,
            due_date: r.due_date,
            location: r.location,
            status: r.status,
            created_at: r.created_at,
        }
    }
}

impl From<Task> for TaskRecord {
    fn from(t: Task) -> Self {
        let completed = Some(t.is_completed());
        TaskRecord {
            id: t.id,
            text: t.text,
            description: t.description,
            due_date: t.due_date,
            location: t.location,
            status: t.status,
            completed,
            created_at: t.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Task {
        Task {
            id: TaskId::from("0b7e2c1a-5f3d-4c2e-9a61-1d2f3e4a5b6c"),
            text: "Buy milk".into(),
            description: None,
            due_date: NaiveDate::from_ymd_opt(2030, 1, 15),
            location: Some("Corner shop".into()),
            status: Status::InProgress,
            created_at: Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_record_layout() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["id"], "0b7e2c1a-5f3d-4c2e-9a61-1d2f3e4a5b6c");
        assert_eq!(value["text"], "Buy milk");
        assert_eq!(value["dueDate"], "2030-01-15");
        assert_eq!(value["location"], "Corner shop");
        assert_eq!(value["status"], "in-progress");
        assert_eq!(value["completed"], false);
        assert_eq!(value["createdAt"], "2026-03-01T09:30:00Z");
        assert!(value.get("description").is_none());
    }

    #[test]
    fn test_status_wins_over_stale_completed_flag() {
        let json = r#"{
            "id": "a1",
            "text": "Water plants",
            "status": "pending",
            "completed": true,
            "createdAt": "2025-06-01T12:00:00.000Z"
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.status, Status::Pending);
        assert!(!task.is_completed());
        assert_eq!(task.due_date, None);
    }

    #[test]
    fn test_generated_ids_differ() {
        let a = TaskId::generate();
        let b = TaskId::generate();
        assert_ne!(a, b);
        assert_eq!(a.short().len(), 8);
    }
}
