//! Transient presentation state, kept apart from the task collection.
//!
//! Filter and sort selections survive restarts: the state is written
//! best-effort under its own key next to the task file.

use serde::{Deserialize, Serialize};

use crate::fields::{FilterMode, SortKey};
use crate::storage::KeyValueStore;
use crate::task::TaskId;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewState {
    pub filter: FilterMode,
    pub sort: SortKey,
    /// Task highlighted in the list or shown in the detail view.
    pub selected: Option<TaskId>,
    /// Whether the add form is open.
    #[serde(skip)]
    pub adding: bool,
}

impl ViewState {
    /// Read saved view state; anything missing or unreadable yields defaults.
    pub fn load(store: &dyn KeyValueStore, key: &str) -> Self {
        match store.get_item(key) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(error = %e, key, "ignoring unreadable view state");
                ViewState::default()
            }),
            Ok(None) => ViewState::default(),
            Err(e) => {
                tracing::warn!(error = %e, key, "failed to read view state");
                ViewState::default()
            }
        }
    }

    /// Persist the state. Failures are logged, never surfaced.
    pub fn save(&self, store: &mut dyn KeyValueStore, key: &str) {
        let result = serde_json::to_string(self)
            .map_err(|e| e.to_string())
            .and_then(|data| store.set_item(key, &data).map_err(|e| e.to_string()));
        if let Err(e) = result {
            tracing::warn!(error = %e, key, "failed to save view state");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStore;

    #[test]
    fn test_round_trip_skips_transient_flags() {
        let mut store = MemoryStore::default();
        let state = ViewState {
            filter: FilterMode::InProgress,
            sort: SortKey::DueDate,
            selected: Some(TaskId::from("abc")),
            adding: true,
        };
        state.save(&mut store, "@todos-view");
        let loaded = ViewState::load(&store, "@todos-view");
        assert_eq!(loaded.filter, FilterMode::InProgress);
        assert_eq!(loaded.sort, SortKey::DueDate);
        assert_eq!(loaded.selected, Some(TaskId::from("abc")));
        assert!(!loaded.adding);
    }

    #[test]
    fn test_unreadable_state_falls_back_to_defaults() {
        let store = MemoryStore::default();
        store
            .items
            .borrow_mut()
            .insert("@todos-view".into(), r#"{"filter":"someday","sort":"due-date"}"#.into());
        let loaded = ViewState::load(&store, "@todos-view");
        assert_eq!(loaded.filter, FilterMode::All);
        assert_eq!(loaded.sort, SortKey::DueDate);

        store.items.borrow_mut().insert("@todos-view".into(), "garbage".into());
        assert_eq!(ViewState::load(&store, "@todos-view"), ViewState::default());
        assert_eq!(ViewState::load(&store, "missing"), ViewState::default());
    }
}
