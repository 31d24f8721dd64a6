//! Error types for task validation and persistence.

use thiserror::Error;

/// A draft field violates its constraint. Nothing is changed when this is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("title required")]
    TitleRequired,
    #[error("title must be at most {max} characters (got {0})", max = crate::validate::MAX_TITLE_LEN)]
    TitleTooLong(usize),
    #[error("description must be at most {max} characters (got {0})", max = crate::validate::MAX_DESCRIPTION_LEN)]
    DescriptionTooLong(usize),
    #[error("invalid date format, use YYYY-MM-DD (e.g. 2024-12-31)")]
    InvalidDateFormat,
    #[error("invalid date: {0} is not a calendar date")]
    InvalidDate(String),
    #[error("date in the past: {0}")]
    DateInPast(String),
    #[error("location must be at most {max} characters (got {0})", max = crate::validate::MAX_LOCATION_LEN)]
    LocationTooLong(usize),
}

/// Reading or writing the task collection failed.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to read '{key}': {source}")]
    Read {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write '{key}': {source}")]
    Write {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("stored data under '{key}' is not valid: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("stored data under '{key}' has version {found}, newest supported is {supported}")]
    UnsupportedVersion {
        key: String,
        found: u32,
        supported: u32,
    },
    #[error("failed to back up '{key}': {source}")]
    Backup {
        key: String,
        #[source]
        source: std::io::Error,
    },
}

impl PersistenceError {
    /// Short notification for the user; the full error goes to the log.
    pub fn headline(&self) -> &'static str {
        match self {
            PersistenceError::Read { .. }
            | PersistenceError::Corrupt { .. }
            | PersistenceError::UnsupportedVersion { .. } => "Failed to load saved tasks",
            PersistenceError::Write { .. } => "Failed to save tasks",
            PersistenceError::Backup { .. } => "Failed to back up tasks",
        }
    }
}
