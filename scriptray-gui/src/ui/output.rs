//! Script output and dialogs.
//!
//! Big output opens a scrollable read-only window, small output a
//! notification in the bottom-right corner that fades after a few seconds.

use eframe::egui::{self, RichText, Rounding, Vec2};

use crate::app::ScriptrayApp;
use crate::ui::colors;

/// Render every overlay that is currently active.
pub fn render(app: &mut ScriptrayApp, ctx: &egui::Context) {
    render_output_window(app, ctx);
    render_toast(app, ctx);
    render_alert(app, ctx);
}

fn render_output_window(app: &mut ScriptrayApp, ctx: &egui::Context) {
    let Some(window) = app.output_window.as_mut() else {
        return;
    };

    let mut open = window.open;
    egui::Window::new(format!("Output - {}", window.title))
        .id(egui::Id::new("output_window"))
        .open(&mut open)
        .collapsible(false)
        .resizable(true)
        .default_size(Vec2::new(560.0, 360.0))
        .show(ctx, |ui| {
            let muted = colors::muted(ui.visuals());
            ui.label(RichText::new(summary(&window.text)).size(11.0).color(muted));
            ui.separator();

            egui::ScrollArea::both()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    ui.add(
                        egui::TextEdit::multiline(&mut window.text.as_str())
                            .font(egui::TextStyle::Monospace)
                            .desired_width(f32::INFINITY),
                    );
                });
        });

    if !open {
        app.output_window = None;
    }
}

fn render_toast(app: &mut ScriptrayApp, ctx: &egui::Context) {
    let Some(toast) = &app.toast else {
        return;
    };

    let mut dismissed = false;
    egui::Area::new(egui::Id::new("output_toast"))
        .anchor(egui::Align2::RIGHT_BOTTOM, Vec2::new(-12.0, -36.0))
        .show(ctx, |ui| {
            egui::Frame::none()
                .fill(colors::toast_bg(ui.visuals()))
                .stroke(egui::Stroke::new(1.0, colors::border(ui.visuals())))
                .rounding(Rounding::same(8.0))
                .inner_margin(egui::Margin::symmetric(12.0, 8.0))
                .show(ui, |ui| {
                    ui.set_max_width(320.0);
                    ui.horizontal(|ui| {
                        ui.label(RichText::new(&toast.title).strong());
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.small_button("x").clicked() {
                                dismissed = true;
                            }
                        });
                    });
                    ui.label(RichText::new(&toast.text).monospace());
                });
        });

    if dismissed {
        app.toast = None;
    }
}

fn render_alert(app: &mut ScriptrayApp, ctx: &egui::Context) {
    let Some(alert) = &app.alert else {
        return;
    };

    let mut dismissed = false;
    let title = if alert.is_error { "Error" } else { "Scriptray" };
    egui::Window::new(title)
        .id(egui::Id::new("alert_dialog"))
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, Vec2::ZERO)
        .show(ctx, |ui| {
            let text = RichText::new(&alert.text);
            if alert.is_error {
                ui.label(text.color(colors::ERROR));
            } else {
                ui.label(text);
            }
            ui.add_space(8.0);
            ui.vertical_centered(|ui| {
                if ui.button("OK").clicked() {
                    dismissed = true;
                }
            });
        });

    if dismissed {
        app.alert = None;
    }
}

/// One-line description of captured output, e.g. `"3 lines, 42 characters"`.
fn summary(text: &str) -> String {
    let lines = text.lines().count();
    let chars = text.chars().count();
    let plural = |n: usize| if n == 1 { "" } else { "s" };
    format!(
        "{} line{}, {} character{}",
        lines,
        plural(lines),
        chars,
        plural(chars)
    )
}
