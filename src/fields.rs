//! Enumerations used to classify, filter and order tasks.
//!
//! The wire names (kebab-case) are shared by the JSON storage layout, the
//! CLI value parsers and the persisted view state.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl Status {
    pub const ALL: [Status; 4] = [
        Status::Pending,
        Status::InProgress,
        Status::Completed,
        Status::Cancelled,
    ];

    /// Storage and CLI spelling of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::InProgress => "in-progress",
            Status::Completed => "completed",
            Status::Cancelled => "cancelled",
        }
    }

    /// Human-readable label for display.
    pub fn label(self) -> &'static str {
        match self {
            Status::Pending => "Pending",
            Status::InProgress => "In Progress",
            Status::Completed => "Completed",
            Status::Cancelled => "Cancelled",
        }
    }
}

/// Predicate selecting which tasks are displayed.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", from = "String")]
pub enum FilterMode {
    #[default]
    All,
    Active,
    Completed,
    InProgress,
    Cancelled,
}

impl FilterMode {
    pub const ALL: [FilterMode; 5] = [
        FilterMode::All,
        FilterMode::Active,
        FilterMode::Completed,
        FilterMode::InProgress,
        FilterMode::Cancelled,
    ];

    /// Parse a mode name; anything unrecognised selects every task.
    pub fn from_str_lossy(s: &str) -> Self {
        match s.trim() {
            "active" => FilterMode::Active,
            "completed" => FilterMode::Completed,
            "in-progress" => FilterMode::InProgress,
            "cancelled" => FilterMode::Cancelled,
            _ => FilterMode::All,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FilterMode::All => "All",
            FilterMode::Active => "Active",
            FilterMode::Completed => "Completed",
            FilterMode::InProgress => "In Progress",
            FilterMode::Cancelled => "Cancelled",
        }
    }

    /// Next mode in display order, wrapping around.
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|m| *m == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl From<String> for FilterMode {
    fn from(s: String) -> Self {
        FilterMode::from_str_lossy(&s)
    }
}

/// Ordering applied to the filtered task list.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    #[default]
    DateAdded,
    DueDate,
    Status,
}

impl SortKey {
    pub const ALL: [SortKey; 3] = [SortKey::DateAdded, SortKey::DueDate, SortKey::Status];

    pub fn label(self) -> &'static str {
        match self {
            SortKey::DateAdded => "Date Added",
            SortKey::DueDate => "Due Date",
            SortKey::Status => "Status",
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|k| *k == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}
