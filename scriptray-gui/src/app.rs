//! Main application state and update loop.

use std::path::{Path, PathBuf};
use std::time::Duration;

use eframe::egui;
use tokio::runtime::Runtime;
use tracing::{debug, error, info, warn};

use scriptray_core::{
    ContextSnapshot, EventReceiver, OutputKind, RunQueue, ScriptRef, WorkerCommand, WorkerEvent,
};

use crate::icons::Icons;
use crate::ui;

/// Shown when "run last" has nothing to run.
const NOTHING_TO_RUN: &str = "The script doesn't exist anymore or\n\
                              no script was run before.\n\n\
                              Use the Scripts menu to run one,\n\
                              or Settings to pick a script folder.";

/// How long a small-output notification stays up.
const TOAST_SECONDS: i64 = 6;

/// How long a status message stays in the status bar.
const STATUS_SECONDS: i64 = 5;

// =============================================================================
// Presentation Types
// =============================================================================

/// Scrollable read-only window for big output.
#[derive(Debug, Clone)]
pub struct OutputWindow {
    pub title: String,
    pub text: String,
    pub open: bool,
}

/// Transient notification for small output.
#[derive(Debug, Clone)]
pub struct Toast {
    pub title: String,
    pub text: String,
    pub shown_at: chrono::DateTime<chrono::Utc>,
}

/// Modal message the user has to dismiss.
#[derive(Debug, Clone)]
pub struct Alert {
    pub text: String,
    pub is_error: bool,
}

impl Alert {
    /// A script couldn't be launched or read.
    pub fn run_failed(script: &ScriptRef, program_dir: &Path) -> Self {
        Self {
            text: format!(
                "Error while trying to execute:\n{}\n\nLogs: {}",
                script,
                program_dir.display()
            ),
            is_error: true,
        }
    }

    /// "Run last" found no script to run.
    pub fn nothing_to_run() -> Self {
        Self {
            text: NOTHING_TO_RUN.to_string(),
            is_error: true,
        }
    }
}

/// Status bar message.
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub is_warning: bool,
    pub time: chrono::DateTime<chrono::Utc>,
}

// =============================================================================
// Application State
// =============================================================================

/// Main application state.
pub struct ScriptrayApp {
    /// Tokio runtime hosting the run queue and dialogs.
    pub runtime: Runtime,

    /// Handle to the run queue worker.
    queue: RunQueue,

    /// Events coming back from the worker.
    event_rx: EventReceiver,

    /// Idle and running icons.
    icons: Icons,

    // -------------------------------------------------------------------------
    // Mirrored Worker State
    // -------------------------------------------------------------------------
    /// Latest context published by the worker.
    pub context: ContextSnapshot,

    /// Scripts in the current script folder.
    pub scripts: Vec<ScriptRef>,

    /// Script currently running, if any.
    pub running: Option<ScriptRef>,

    // -------------------------------------------------------------------------
    // UI State
    // -------------------------------------------------------------------------
    /// Big output window.
    pub output_window: Option<OutputWindow>,

    /// Small output notification.
    pub toast: Option<Toast>,

    /// Error or info dialog.
    pub alert: Option<Alert>,

    /// Status message.
    pub status_message: Option<StatusMessage>,

    /// Pending folder selection result receiver.
    folder_result_rx: Option<tokio::sync::oneshot::Receiver<Option<PathBuf>>>,
}

impl ScriptrayApp {
    /// Create a new application instance.
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        runtime: Runtime,
        queue: RunQueue,
        event_rx: EventReceiver,
        icons: Icons,
        context: ContextSnapshot,
        startup_warning: Option<String>,
    ) -> Self {
        info!("Initializing ScriptrayApp");

        let mut style = (*cc.egui_ctx.style()).clone();
        style.spacing.item_spacing = egui::vec2(8.0, 6.0);
        cc.egui_ctx.set_style(style);

        let mut app = Self {
            runtime,
            queue,
            event_rx,
            icons,
            context,
            scripts: Vec::new(),
            running: None,
            output_window: None,
            toast: None,
            alert: None,
            status_message: None,
            folder_result_rx: None,
        };

        if let Some(warning) = startup_warning {
            app.set_warning(&warning);
        }
        app
    }

    // =========================================================================
    // Commands
    // =========================================================================

    fn submit(&mut self, command: WorkerCommand) {
        if let Err(e) = self.queue.submit(command) {
            error!(error = %e, "Failed to submit command");
            self.set_warning(&e.to_string());
        }
    }

    /// Queue a script run.
    pub fn run_script(&mut self, script: ScriptRef) {
        debug!(script = %script, "Queueing script");
        self.submit(WorkerCommand::Run(script));
    }

    /// Queue a run of the last attempted script.
    pub fn run_last(&mut self) {
        self.submit(WorkerCommand::RunLast);
    }

    /// Rescan the script folder.
    pub fn reload_scripts(&mut self) {
        self.submit(WorkerCommand::ReloadScripts);
    }

    /// Toggle output capture.
    pub fn set_show_output(&mut self, show: bool) {
        // Reflect immediately; the worker publishes the persisted value.
        self.context.show_output = show;
        self.submit(WorkerCommand::SetShowOutput(show));
    }

    /// Stop the worker and close the window.
    pub fn exit(&mut self, ctx: &egui::Context) {
        info!("Exiting");
        if let Err(e) = self.queue.shutdown() {
            debug!(error = %e, "Run queue already stopped");
        }
        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
    }

    /// Open the script folder in the file manager.
    pub fn open_script_folder(&mut self) {
        self.open_folder(self.context.script_folder.clone(), "Script folder");
    }

    /// Open the program folder (settings and logs) in the file manager.
    pub fn open_program_folder(&mut self) {
        self.open_folder(Some(self.context.program_dir.clone()), "Settings folder");
    }

    fn open_folder(&mut self, folder: Option<PathBuf>, what: &str) {
        let Some(folder) = folder.filter(|f| f.is_dir()) else {
            self.set_warning(&format!("{} does not exist", what));
            return;
        };

        info!(folder = %folder.display(), "Opening folder");
        if let Err(e) = open::that(&folder) {
            warn!(error = %e, folder = %folder.display(), "Failed to open folder");
            self.set_warning(&format!("Could not open {}: {}", folder.display(), e));
        }
    }

    /// Open a folder selection dialog asynchronously.
    pub fn select_script_folder(&mut self) {
        // Don't open another dialog if one is pending
        if self.folder_result_rx.is_some() {
            return;
        }

        let (tx, rx) = tokio::sync::oneshot::channel();
        self.folder_result_rx = Some(rx);

        let start_dir = self.context.script_folder.clone();
        self.runtime.spawn(async move {
            let mut dialog = rfd::AsyncFileDialog::new().set_title("Select Script Folder");
            if let Some(dir) = start_dir {
                dialog = dialog.set_directory(dir);
            }
            let folder = dialog.pick_folder().await.map(|f| f.path().to_path_buf());
            let _ = tx.send(folder);
        });
    }

    /// Check for folder selection completion.
    fn check_folder_selection(&mut self) {
        if let Some(mut rx) = self.folder_result_rx.take() {
            match rx.try_recv() {
                Ok(Some(folder)) => {
                    info!("Selected script folder: {}", folder.display());
                    self.submit(WorkerCommand::SetScriptFolder(folder));
                }
                Ok(None) => {
                    // User cancelled the dialog
                    debug!("Folder selection cancelled");
                }
                Err(tokio::sync::oneshot::error::TryRecvError::Empty) => {
                    // Still waiting
                    self.folder_result_rx = Some(rx);
                }
                Err(tokio::sync::oneshot::error::TryRecvError::Closed) => {
                    warn!("Folder selection channel closed unexpectedly");
                }
            }
        }
    }

    // =========================================================================
    // Worker Events
    // =========================================================================

    /// Process events from the run queue.
    pub fn process_events(&mut self, ctx: &egui::Context) {
        while let Ok(event) = self.event_rx.try_recv() {
            match event {
                WorkerEvent::Context(snapshot) => {
                    debug!(?snapshot, "Context updated");
                    self.context = snapshot;
                }

                WorkerEvent::Scripts(scripts) => {
                    debug!(count = scripts.len(), "Scripts updated");
                    self.scripts = scripts;
                }

                WorkerEvent::RunStarted { script } => {
                    self.set_status(&format!("Running {}...", script.display_name()));
                    self.running = Some(script);
                    ctx.send_viewport_cmd(egui::ViewportCommand::Icon(Some(
                        self.icons.running.clone(),
                    )));
                }

                WorkerEvent::RunFinished {
                    script,
                    result,
                    view,
                } => {
                    self.running = None;
                    ctx.send_viewport_cmd(egui::ViewportCommand::Icon(Some(
                        self.icons.idle.clone(),
                    )));

                    if !result.success {
                        self.alert = Some(Alert::run_failed(&script, &self.context.program_dir));
                        continue;
                    }

                    self.set_status(&format!("Finished {}", script.display_name()));
                    match view {
                        Some(OutputKind::Big) => {
                            self.output_window = Some(OutputWindow {
                                title: script.display_name(),
                                text: result.text,
                                open: true,
                            });
                        }
                        Some(OutputKind::Small) => {
                            self.toast = Some(Toast {
                                title: script.display_name(),
                                text: result.text.trim_end().to_string(),
                                shown_at: chrono::Utc::now(),
                            });
                        }
                        None => {}
                    }
                }

                WorkerEvent::NothingToRun => {
                    self.alert = Some(Alert::nothing_to_run());
                }

                WorkerEvent::Warning(msg) => self.set_warning(&msg),
            }
            ctx.request_repaint();
        }
    }

    // =========================================================================
    // Status
    // =========================================================================

    /// Set a status message.
    pub fn set_status(&mut self, msg: &str) {
        self.status_message = Some(StatusMessage {
            text: msg.to_string(),
            is_warning: false,
            time: chrono::Utc::now(),
        });
    }

    /// Set a warning in the status bar.
    pub fn set_warning(&mut self, msg: &str) {
        self.status_message = Some(StatusMessage {
            text: msg.to_string(),
            is_warning: true,
            time: chrono::Utc::now(),
        });
    }

    /// Clear old status messages and notifications.
    fn clear_expired(&mut self) {
        let now = chrono::Utc::now();
        if let Some(status) = &self.status_message {
            if now - status.time > chrono::Duration::seconds(STATUS_SECONDS) {
                self.status_message = None;
            }
        }
        if let Some(toast) = &self.toast {
            if now - toast.shown_at > chrono::Duration::seconds(TOAST_SECONDS) {
                self.toast = None;
            }
        }
    }
}

impl eframe::App for ScriptrayApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for async completions
        self.check_folder_selection();

        // Process any pending events from the worker
        self.process_events(ctx);
        self.clear_expired();

        // Top panel with menu
        egui::TopBottomPanel::top("menu_panel").show(ctx, |ui| {
            ui::menu::render(self, ui, ctx);
        });

        // Status bar at bottom
        egui::TopBottomPanel::bottom("status_panel")
            .max_height(24.0)
            .show(ctx, |ui| {
                ui::status::render(self, ui);
            });

        // Run-last button fills the rest
        egui::CentralPanel::default().show(ctx, |ui| {
            ui::launcher::render(self, ui);
        });

        // Output and dialogs on top
        ui::output::render(self, ctx);

        // The worker can't wake us, so poll while idle
        if self.running.is_some() || self.folder_result_rx.is_some() || self.toast.is_some() {
            ctx.request_repaint_after(Duration::from_millis(100));
        } else {
            ctx.request_repaint_after(Duration::from_millis(250));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_to_run_is_an_error_alert() {
        let alert = Alert::nothing_to_run();
        assert!(alert.is_error);
        assert!(alert.text.starts_with("The script doesn't exist anymore"));
    }

    #[test]
    fn run_failed_names_script_and_log_folder() {
        let alert = Alert::run_failed(
            &ScriptRef::new("/home/me/scripts/gone.sh"),
            Path::new("/home/me/.config/Scriptray"),
        );
        assert!(alert.is_error);
        assert_eq!(
            alert.text,
            "Error while trying to execute:\n/home/me/scripts/gone.sh\n\nLogs: /home/me/.config/Scriptray"
        );
    }
}
