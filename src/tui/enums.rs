//! Enumerations for TUI state management.

use crate::task::TaskId;

/// Which screen the terminal user interface is showing.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AppState {
    TaskList,
    TaskDetail,
    AddTask,
    Help,
    Confirm,
}

/// Destructive action waiting for a yes/no answer.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ConfirmAction {
    Delete { id: TaskId, title: String },
    ClearCompleted { count: usize },
}

impl ConfirmAction {
    pub fn title(&self) -> &'static str {
        match self {
            ConfirmAction::Delete { .. } => "Delete Task",
            ConfirmAction::ClearCompleted { .. } => "Clear Completed",
        }
    }

    pub fn question(&self) -> String {
        match self {
            ConfirmAction::Delete { title, .. } => format!("Delete '{}'?", title),
            ConfirmAction::ClearCompleted { count } => format!("Delete all {} completed task(s)?", count),
        }
    }
}
