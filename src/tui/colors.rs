//! Color constants for the terminal user interface.

use ratatui::style::Color;

use crate::fields::Status;

pub const GREEN: Color = Color::Rgb(76, 175, 80);
pub const ORANGE: Color = Color::Rgb(255, 152, 0);
pub const RED: Color = Color::Rgb(244, 67, 54);
pub const GREY: Color = Color::Rgb(158, 158, 158);
/// Header and status bar background.
pub const ACCENT: Color = Color::Rgb(33, 150, 243);
/// Confirmation dialog background.
pub const DARK_RED: Color = Color::Rgb(114, 0, 0);

/// Badge color for a status.
pub fn status_color(status: Status) -> Color {
    match status {
        Status::Completed => GREEN,
        Status::InProgress => ORANGE,
        Status::Cancelled => RED,
        Status::Pending => GREY,
    }
}
