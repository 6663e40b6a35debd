//! Top menu bar.

use eframe::egui::{self, RichText};

use crate::app::ScriptrayApp;
use crate::ui::colors;

/// Render the top menu bar.
pub fn render(app: &mut ScriptrayApp, ui: &mut egui::Ui, ctx: &egui::Context) {
    egui::menu::bar(ui, |ui| {
        // Scripts menu
        ui.menu_button("Scripts", |ui| {
            let mut clicked = None;
            if app.scripts.is_empty() {
                ui.add_enabled(false, egui::Label::new("No scripts found"));
            }
            for script in &app.scripts {
                if ui.button(script.display_name()).clicked() {
                    clicked = Some(script.clone());
                }
            }
            if let Some(script) = clicked {
                app.run_script(script);
                ui.close_menu();
            }

            ui.separator();

            if ui.button("Reload").clicked() {
                app.reload_scripts();
                ui.close_menu();
            }
        });

        // Settings menu
        ui.menu_button("Settings", |ui| {
            let mut show_output = app.context.show_output;
            if ui.checkbox(&mut show_output, "Show Output").changed() {
                app.set_show_output(show_output);
            }

            ui.separator();

            if ui.button("Select Script Folder...").clicked() {
                app.select_script_folder();
                ui.close_menu();
            }

            if ui.button("Open Script Folder").clicked() {
                app.open_script_folder();
                ui.close_menu();
            }

            if ui.button("Open Settings Folder").clicked() {
                app.open_program_folder();
                ui.close_menu();
            }
        });

        if ui.button("Exit").clicked() {
            app.exit(ctx);
        }

        // Right-aligned running indicator
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if let Some(script) = &app.running {
                ui.label(
                    RichText::new(format!("Running {}", script.display_name()))
                        .color(colors::ACCENT)
                        .size(12.0),
                );
                ui.spinner();
            }
        });
    });
}
