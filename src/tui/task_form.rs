//! Add-task form for the terminal user interface.
//!
//! Four text fields in entry order: title (required), description, due date
//! and location. Validation happens when the form is submitted.

use crate::tui::input::InputField;
use crate::validate::TaskDraft;

pub const TITLE_ORDER: usize = 0;
pub const DESCRIPTION_ORDER: usize = 1;
pub const DUE_ORDER: usize = 2;
pub const LOCATION_ORDER: usize = 3;
const FIELD_COUNT: usize = 4;

/// Labels in field order.
pub const FIELD_LABELS: [&str; FIELD_COUNT] = ["Task Title *", "Description", "Due Date (YYYY-MM-DD)", "Location"];

#[derive(Clone, Debug)]
pub struct TaskForm {
    pub title: InputField,
    pub description: InputField,
    pub due: InputField,
    pub location: InputField,
    pub current_field: usize,
}

impl Default for TaskForm {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskForm {
    pub fn new() -> Self {
        let mut form = TaskForm {
            title: InputField::new(),
            description: InputField::new(),
            due: InputField::new(),
            location: InputField::new(),
            current_field: TITLE_ORDER,
        };
        form.update_active_field();
        form
    }

    /// Fields in display order.
    pub fn fields(&self) -> [&InputField; FIELD_COUNT] {
        [&self.title, &self.description, &self.due, &self.location]
    }

    fn current_mut(&mut self) -> &mut InputField {
        match self.current_field {
            DESCRIPTION_ORDER => &mut self.description,
            DUE_ORDER => &mut self.due,
            LOCATION_ORDER => &mut self.location,
            _ => &mut self.title,
        }
    }

    pub fn next_field(&mut self) {
        self.current_field = (self.current_field + 1) % FIELD_COUNT;
        self.update_active_field();
    }

    pub fn prev_field(&mut self) {
        self.current_field = if self.current_field == 0 {
            FIELD_COUNT - 1
        } else {
            self.current_field - 1
        };
        self.update_active_field();
    }

    fn update_active_field(&mut self) {
        self.title.active = self.current_field == TITLE_ORDER;
        self.description.active = self.current_field == DESCRIPTION_ORDER;
        self.due.active = self.current_field == DUE_ORDER;
        self.location.active = self.current_field == LOCATION_ORDER;
    }

    pub fn handle_char(&mut self, c: char) {
        self.current_mut().handle_char(c);
    }

    pub fn handle_backspace(&mut self) {
        self.current_mut().handle_backspace();
    }

    pub fn handle_delete(&mut self) {
        self.current_mut().handle_delete();
    }

    pub fn handle_left_right(&mut self, right: bool) {
        let field = self.current_mut();
        if right {
            field.move_cursor_right();
        } else {
            field.move_cursor_left();
        }
    }

    /// Focus a field by order, e.g. the one that failed validation.
    pub fn focus(&mut self, order: usize) {
        self.current_field = order.min(FIELD_COUNT - 1);
        self.update_active_field();
    }

    /// The raw draft; blank optional fields are left for validation to drop.
    pub fn to_draft(&self) -> TaskDraft {
        let optional = |f: &InputField| (!f.value.trim().is_empty()).then(|| f.value.clone());
        TaskDraft {
            text: self.title.value.clone(),
            description: optional(&self.description),
            due_date: optional(&self.due),
            location: optional(&self.location),
        }
    }

    pub fn reset(&mut self) {
        self.title.clear();
        self.description.clear();
        self.due.clear();
        self.location.clear();
        self.focus(TITLE_ORDER);
    }
}
