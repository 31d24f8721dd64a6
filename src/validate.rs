//! Validation of user-entered task drafts.
//!
//! Rules are checked in form order (title, description, due date,
//! location) and the first failure is returned.

use chrono::NaiveDate;

use crate::error::ValidationError;

pub const MAX_TITLE_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 500;
pub const MAX_LOCATION_LEN: usize = 200;

/// Candidate task data as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub text: String,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub location: Option<String>,
}

impl TaskDraft {
    pub fn new(text: impl Into<String>) -> Self {
        TaskDraft {
            text: text.into(),
            ..Default::default()
        }
    }
}

/// A draft that passed validation, trimmed, with blank optionals removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidDraft {
    pub text: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub location: Option<String>,
}

/// Check a draft against the field constraints, relative to `today`.
pub fn validate(draft: &TaskDraft, today: NaiveDate) -> Result<ValidDraft, ValidationError> {
    let text = draft.text.trim();
    if text.is_empty() {
        return Err(ValidationError::TitleRequired);
    }
    let len = text.chars().count();
    if len > MAX_TITLE_LEN {
        return Err(ValidationError::TitleTooLong(len));
    }

    let description = non_blank(draft.description.as_deref());
    if let Some(d) = description {
        let len = d.chars().count();
        if len > MAX_DESCRIPTION_LEN {
            return Err(ValidationError::DescriptionTooLong(len));
        }
    }

    let due_date = match non_blank(draft.due_date.as_deref()) {
        Some(raw) => Some(parse_due_date(raw, today)?),
        None => None,
    };

    let location = non_blank(draft.location.as_deref());
    if let Some(l) = location {
        let len = l.chars().count();
        if len > MAX_LOCATION_LEN {
            return Err(ValidationError::LocationTooLong(len));
        }
    }

    Ok(ValidDraft {
        text: text.to_string(),
        description: description.map(str::to_string),
        due_date,
        location: location.map(str::to_string),
    })
}

/// Parse a strict `YYYY-MM-DD` date that is not before `today`.
pub fn parse_due_date(raw: &str, today: NaiveDate) -> Result<NaiveDate, ValidationError> {
    if !is_iso_date_shape(raw) {
        return Err(ValidationError::InvalidDateFormat);
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(raw.to_string()))?;
    if date < today {
        return Err(ValidationError::DateInPast(raw.to_string()));
    }
    Ok(date)
}

fn is_iso_date_shape(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() == 10
        && b.iter().enumerate().all(|(i, c)| match i {
            4 | 7 => *c == b'-',
            _ => c.is_ascii_digit(),
        })
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    #[test]
    fn test_minimal_draft_normalises_optionals() {
        let draft = TaskDraft {
            text: "  Buy milk ".into(),
            description: Some("   ".into()),
            due_date: Some("".into()),
            location: None,
        };
        let valid = validate(&draft, today()).unwrap();
        assert_eq!(valid.text, "Buy milk");
        assert_eq!(valid.description, None);
        assert_eq!(valid.due_date, None);
        assert_eq!(valid.location, None);
    }

    #[test]
    fn test_title_rules() {
        let err = validate(&TaskDraft::new(""), today()).unwrap_err();
        assert_eq!(err, ValidationError::TitleRequired);
        assert_eq!(err.to_string(), "title required");

        let err = validate(&TaskDraft::new(" \t "), today()).unwrap_err();
        assert_eq!(err, ValidationError::TitleRequired);

        let err = validate(&TaskDraft::new("x".repeat(101)), today()).unwrap_err();
        assert_eq!(err, ValidationError::TitleTooLong(101));
        assert_eq!(
            err.to_string(),
            format!("title must be at most {MAX_TITLE_LEN} characters (got 101)")
        );

        assert!(validate(&TaskDraft::new("x".repeat(100)), today()).is_ok());
        // Counted in characters, not bytes.
        assert!(validate(&TaskDraft::new("é".repeat(100)), today()).is_ok());
    }

    #[test]
    fn test_length_limits_for_optionals() {
        let mut draft = TaskDraft::new("Plan trip");
        draft.description = Some("d".repeat(501));
        assert_eq!(
            validate(&draft, today()).unwrap_err(),
            ValidationError::DescriptionTooLong(501)
        );

        draft.description = Some("d".repeat(500));
        draft.location = Some("l".repeat(201));
        assert_eq!(
            validate(&draft, today()).unwrap_err(),
            ValidationError::LocationTooLong(201)
        );
        assert_eq!(
            ValidationError::DescriptionTooLong(501).to_string(),
            format!("description must be at most {MAX_DESCRIPTION_LEN} characters (got 501)")
        );
        assert_eq!(
            ValidationError::LocationTooLong(201).to_string(),
            format!("location must be at most {MAX_LOCATION_LEN} characters (got 201)")
        );
    }

    #[test]
    fn test_due_date_rules() {
        let mut draft = TaskDraft::new("Dentist");

        draft.due_date = Some("2099-13-40".into());
        let err = validate(&draft, today()).unwrap_err();
        assert_eq!(err, ValidationError::InvalidDate("2099-13-40".into()));

        draft.due_date = Some("2026-2-3".into());
        let err = validate(&draft, today()).unwrap_err();
        assert_eq!(err, ValidationError::InvalidDateFormat);
        assert!(err.to_string().starts_with("invalid date format"));

        draft.due_date = Some("2026-10-17".into());
        let err = validate(&draft, today()).unwrap_err();
        assert_eq!(err, ValidationError::DateInPast("2026-10-17".into()));
        assert!(err.to_string().starts_with("date in the past"));

        draft.due_date = Some("2026-10-18".into());
        let valid = validate(&draft, today()).unwrap();
        assert_eq!(valid.due_date, Some(today()));
    }

    #[test]
    fn test_first_violation_wins() {
        let draft = TaskDraft {
            text: String::new(),
            description: Some("d".repeat(600)),
            due_date: Some("tomorrow".into()),
            location: Some("l".repeat(300)),
        };
        assert_eq!(validate(&draft, today()).unwrap_err(), ValidationError::TitleRequired);

        let draft = TaskDraft {
            text: "ok".into(),
            description: None,
            due_date: Some("tomorrow".into()),
            location: Some("l".repeat(300)),
        };
        assert_eq!(validate(&draft, today()).unwrap_err(), ValidationError::InvalidDateFormat);
    }
}
