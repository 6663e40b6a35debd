//! UI components for Scriptray.

pub mod launcher;
pub mod menu;
pub mod output;
pub mod status;

// Theme-aware colors for the UI
pub mod colors {
    use eframe::egui::{Color32, Visuals};

    /// Accent blue (running indicator, primary button)
    pub const ACCENT: Color32 = Color32::from_rgb(59, 130, 246);

    /// Warning amber
    pub const WARNING: Color32 = Color32::from_rgb(245, 158, 11);

    /// Error red
    pub const ERROR: Color32 = Color32::from_rgb(239, 68, 68);

    /// Get notification background based on theme
    pub fn toast_bg(visuals: &Visuals) -> Color32 {
        if visuals.dark_mode {
            Color32::from_rgb(55, 55, 60)
        } else {
            Color32::from_rgb(240, 240, 245)
        }
    }

    /// Get muted text color based on theme
    pub fn muted(visuals: &Visuals) -> Color32 {
        if visuals.dark_mode {
            Color32::from_rgb(156, 163, 175)
        } else {
            Color32::from_rgb(100, 100, 110)
        }
    }

    /// Get border color based on theme
    pub fn border(visuals: &Visuals) -> Color32 {
        if visuals.dark_mode {
            Color32::from_rgb(70, 70, 75)
        } else {
            Color32::from_rgb(200, 200, 210)
        }
    }
}
