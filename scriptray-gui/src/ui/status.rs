//! Status bar at the bottom of the window.

use eframe::egui::{self, RichText};

use crate::app::ScriptrayApp;
use crate::ui::colors;

/// Render the status bar.
pub fn render(app: &ScriptrayApp, ui: &mut egui::Ui) {
    let muted = colors::muted(ui.visuals());

    ui.horizontal(|ui| {
        // Status message
        if let Some(status) = &app.status_message {
            let color = if status.is_warning {
                colors::WARNING
            } else {
                muted
            };
            ui.label(RichText::new(&status.text).size(11.0).color(color));
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let capture = if app.context.show_output {
                "output on"
            } else {
                "output off"
            };
            ui.label(RichText::new(capture).size(11.0).color(muted));
            ui.separator();
            ui.label(
                RichText::new(format!("{} scripts", app.scripts.len()))
                    .size(11.0)
                    .color(muted),
            );
        });
    });
}
