//! Run-last button.
//!
//! Primary click runs the last script again, middle click opens the script
//! folder.

use eframe::egui::{self, RichText};

use crate::app::ScriptrayApp;
use crate::ui::colors;

/// Render the launcher area.
pub fn render(app: &mut ScriptrayApp, ui: &mut egui::Ui) {
    let label = match &app.context.last_script {
        Some(script) => format!("Run {}", script.display_name()),
        None => "Run last script".to_string(),
    };

    ui.vertical_centered(|ui| {
        ui.add_space(12.0);

        let button = egui::Button::new(RichText::new(label).size(16.0).strong())
            .min_size(egui::vec2(ui.available_width() * 0.8, 48.0));
        let response = ui
            .add(button)
            .on_hover_text("Middle click to open the script folder");

        if response.clicked() {
            app.run_last();
        } else if response.middle_clicked() {
            app.open_script_folder();
        }

        ui.add_space(6.0);

        let muted = colors::muted(ui.visuals());
        let folder = match &app.context.script_folder {
            Some(folder) => folder.display().to_string(),
            None => "No script folder selected".to_string(),
        };
        ui.label(RichText::new(folder).size(11.0).color(muted));
    });
}
