//! Shared styling for the mqttdeck window.

use eframe::egui::{self, Color32, Frame, Stroke};

/// Dark theme palette used across all panels.
///
/// Colors are ordered from darkest to lightest background, with green/red
/// status colors for the connection indicator.
pub struct UiColors;

impl UiColors {
    /// Primary background color for main content areas
    pub const MAIN_BG: Color32 = Color32::from_rgb(30, 30, 30);

    /// Secondary background color for nested components
    pub const INNER_BG: Color32 = Color32::from_rgb(25, 25, 25);

    /// Deepest background color for emphasized content areas
    pub const EXTREME_BG: Color32 = Color32::from_rgb(20, 20, 20);

    /// Border color for component separation
    pub const BORDER: Color32 = Color32::from_rgb(60, 60, 60);

    /// Connected status indicator color
    pub const ACTIVE: Color32 = Color32::from_rgb(50, 200, 20);

    /// Disconnected status indicator color
    pub const INACTIVE: Color32 = Color32::from_rgb(200, 50, 20);
}

/// Standard bordered frame used by the log and editor panels.
pub fn create_frame(bg_color: Color32, border_color: Color32) -> Frame {
    Frame::new()
        .stroke(Stroke::new(1.0, border_color))
        .fill(bg_color)
        .inner_margin(4)
        .outer_margin(2)
}

/// Round status dot, green while connected.
pub fn status_dot(ui: &mut egui::Ui, connected: bool) {
    let color = if connected {
        UiColors::ACTIVE
    } else {
        UiColors::INACTIVE
    };
    ui.colored_label(color, "\u{2B24}");
}
