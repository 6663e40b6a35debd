//! Scriptray GUI Application
//!
//! A small launcher window: pick a script folder, run its scripts with one
//! click, and see what they printed.

mod app;
mod icons;
mod logging;
mod ui;

use std::sync::Arc;

use anyhow::Context as _;
use eframe::egui;
use scriptray_core::{
    event_channel, spawn_worker, AppContext, FileLogSink, LogSink, ProgramDirs, ScriptExecutor,
};

fn main() -> anyhow::Result<()> {
    let dirs = ProgramDirs::resolve().context("Failed to locate the program folder")?;
    if let Err(e) = dirs.ensure() {
        eprintln!("{}", e);
    }

    let _logging = logging::init(&dirs.app_log());
    tracing::info!("Starting Scriptray v{}", scriptray_core::VERSION);

    // Icons are bundled; failing to decode them is a build problem.
    let icons = icons::Icons::load().context("Failed to load bundled icons")?;

    // A broken settings file must not keep the launcher from starting.
    let (context, startup_warning) = match AppContext::load(dirs.clone()) {
        Ok(context) => (context, None),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load settings, using defaults");
            (AppContext::with_defaults(dirs.clone()), Some(e.to_string()))
        }
    };
    let snapshot = context.snapshot();

    let sink: Arc<dyn LogSink> = Arc::new(
        FileLogSink::open(dirs.output_log()).context("Failed to open the output log")?,
    );
    let executor = ScriptExecutor::new(sink);

    // Create tokio runtime for async operations
    let runtime = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
    let (events_tx, events_rx) = event_channel();
    let (queue, _worker) = {
        let _enter = runtime.enter();
        spawn_worker(context, executor, events_tx)
    };

    // Window configuration
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([360.0, 180.0])
            .with_min_inner_size([280.0, 150.0])
            .with_title("Scriptray")
            .with_icon(icons.idle.clone()),
        renderer: eframe::Renderer::Glow,
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Scriptray",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::ScriptrayApp::new(
                cc,
                runtime,
                queue,
                events_rx,
                icons,
                snapshot,
                startup_warning,
            )))
        }),
    )
    .map_err(|e| anyhow::anyhow!("Window error: {}", e))?;

    tracing::info!("Scriptray stopped");
    Ok(())
}
