//! Run queue.
//!
//! One background task owns the [`AppContext`] and the [`ScriptExecutor`]
//! and works through commands strictly in submission order. Scripts never
//! overlap, and settings are only ever mutated from this task, so nothing
//! here needs a lock.

use std::path::PathBuf;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::context::{AppContext, ContextSnapshot};
use crate::error::{Error, Result};
use crate::executor::{ExecutionResult, RunOptions, ScriptExecutor};
use crate::output::{classify_result, OutputKind};
use crate::scripts::{discover_scripts, ScriptRef};

// =============================================================================
// Commands & Events
// =============================================================================

/// Work submitted to the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerCommand {
    /// Run a specific script.
    Run(ScriptRef),
    /// Run the last attempted script, if it still exists.
    RunLast,
    /// Toggle output capture.
    SetShowOutput(bool),
    /// Choose a new script folder and rescan it.
    SetScriptFolder(PathBuf),
    /// Rescan the script folder.
    ReloadScripts,
    /// Stop after everything queued before this.
    Shutdown,
}

/// Notifications sent back to the UI.
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    /// Context changed (or initial state).
    Context(ContextSnapshot),

    /// Current scripts in the script folder.
    Scripts(Vec<ScriptRef>),

    /// A script is about to launch.
    RunStarted { script: ScriptRef },

    /// A script run completed or failed to launch.
    RunFinished {
        script: ScriptRef,
        result: ExecutionResult,
        /// How to present the output; `None` means show nothing.
        view: Option<OutputKind>,
    },

    /// `RunLast` was requested but there is nothing to run.
    NothingToRun,

    /// Non-fatal problem worth telling the user about.
    Warning(String),
}

/// Sender for worker events.
pub type EventSender = mpsc::UnboundedSender<WorkerEvent>;

/// Receiver for worker events.
pub type EventReceiver = mpsc::UnboundedReceiver<WorkerEvent>;

/// Create an event channel for worker events.
pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

// =============================================================================
// Queue Handle
// =============================================================================

/// Cheap, cloneable handle for submitting work. Never blocks.
#[derive(Debug, Clone)]
pub struct RunQueue {
    tx: mpsc::UnboundedSender<WorkerCommand>,
}

impl RunQueue {
    pub fn submit(&self, command: WorkerCommand) -> Result<()> {
        self.tx.send(command).map_err(|_| Error::QueueClosed)
    }

    pub fn run(&self, script: ScriptRef) -> Result<()> {
        self.submit(WorkerCommand::Run(script))
    }

    pub fn run_last(&self) -> Result<()> {
        self.submit(WorkerCommand::RunLast)
    }

    pub fn set_show_output(&self, show: bool) -> Result<()> {
        self.submit(WorkerCommand::SetShowOutput(show))
    }

    pub fn set_script_folder(&self, folder: PathBuf) -> Result<()> {
        self.submit(WorkerCommand::SetScriptFolder(folder))
    }

    pub fn reload_scripts(&self) -> Result<()> {
        self.submit(WorkerCommand::ReloadScripts)
    }

    pub fn shutdown(&self) -> Result<()> {
        self.submit(WorkerCommand::Shutdown)
    }
}

/// Start the worker on the current tokio runtime.
///
/// The worker first publishes the context and the script list, then serves
/// commands until [`WorkerCommand::Shutdown`] or until every [`RunQueue`]
/// is dropped. The join handle yields the context back.
pub fn spawn_worker(
    ctx: AppContext,
    executor: ScriptExecutor,
    events: EventSender,
) -> (RunQueue, JoinHandle<AppContext>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let worker = Worker {
        ctx,
        executor,
        events,
    };
    let handle = tokio::spawn(worker.serve(rx));
    (RunQueue { tx }, handle)
}

// =============================================================================
// Worker
// =============================================================================

struct Worker {
    ctx: AppContext,
    executor: ScriptExecutor,
    events: EventSender,
}

impl Worker {
    async fn serve(mut self, mut rx: mpsc::UnboundedReceiver<WorkerCommand>) -> AppContext {
        info!("Run queue started");
        self.publish_context();
        self.reload_scripts().await;

        while let Some(command) = rx.recv().await {
            debug!(?command, "Worker command");
            match command {
                WorkerCommand::Run(script) => self.run_script(script).await,
                WorkerCommand::RunLast => match self.ctx.last_script().filter(ScriptRef::exists) {
                    Some(script) => self.run_script(script).await,
                    None => self.emit(WorkerEvent::NothingToRun),
                },
                WorkerCommand::SetShowOutput(show) => {
                    let updated = self
                        .update_context(move |ctx| ctx.set_show_output(show))
                        .await;
                    if let Err(e) = updated {
                        self.warn(e);
                    }
                    self.publish_context();
                }
                WorkerCommand::SetScriptFolder(folder) => {
                    let target = folder.clone();
                    let updated = self
                        .update_context(move |ctx| ctx.set_script_folder(&target))
                        .await;
                    match updated {
                        Ok(()) => info!(folder = %folder.display(), "Script folder changed"),
                        Err(e @ Error::ScriptFolder { .. }) => {
                            self.warn(e);
                            continue;
                        }
                        Err(e) => self.warn(e),
                    }
                    self.publish_context();
                    self.reload_scripts().await;
                }
                WorkerCommand::ReloadScripts => self.reload_scripts().await,
                WorkerCommand::Shutdown => break,
            }
        }

        info!("Run queue stopped");
        self.ctx
    }

    async fn run_script(&mut self, script: ScriptRef) {
        let capture = self.ctx.show_output();
        self.emit(WorkerEvent::RunStarted {
            script: script.clone(),
        });

        let result = self
            .executor
            .run(script.path(), &RunOptions::capture(capture))
            .await;
        let view = classify_result(&result, capture, self.ctx.thresholds());
        self.emit(WorkerEvent::RunFinished {
            script: script.clone(),
            result,
            view,
        });

        let before = self.ctx.last_script();
        let attempted = script.clone();
        let recorded = self
            .update_context(move |ctx| ctx.record_attempt(&attempted))
            .await;
        if let Err(e) = recorded {
            self.warn(e);
        }
        if self.ctx.last_script() != before {
            self.publish_context();
        }
    }

    async fn reload_scripts(&self) {
        let Some(folder) = self.ctx.script_folder() else {
            self.emit(WorkerEvent::Scripts(Vec::new()));
            return;
        };

        let listed = tokio::task::spawn_blocking(move || discover_scripts(&folder)).await;
        match listed {
            Ok(Ok(scripts)) => self.emit(WorkerEvent::Scripts(scripts)),
            Ok(Err(e)) => {
                self.emit(WorkerEvent::Scripts(Vec::new()));
                self.warn(e);
            }
            Err(e) => {
                warn!(error = %e, "Script discovery task failed");
                self.emit(WorkerEvent::Scripts(Vec::new()));
            }
        }
    }

    /// Apply a context mutation on the blocking pool.
    ///
    /// Mutators write the settings file, so they stay off the runtime
    /// threads. The context is moved out for the duration; nothing else
    /// reads it meanwhile because the worker awaits the result.
    async fn update_context<T, F>(&mut self, mutate: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut AppContext) -> Result<T> + Send + 'static,
    {
        let placeholder = AppContext::with_defaults(self.ctx.dirs().clone());
        let mut ctx = std::mem::replace(&mut self.ctx, placeholder);

        let joined = tokio::task::spawn_blocking(move || {
            let result = mutate(&mut ctx);
            (ctx, result)
        })
        .await;

        match joined {
            Ok((ctx, result)) => {
                self.ctx = ctx;
                result
            }
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => {
                warn!(error = %e, "Settings task cancelled");
                Err(Error::QueueClosed)
            }
        }
    }

    fn publish_context(&self) {
        self.emit(WorkerEvent::Context(self.ctx.snapshot()));
    }

    fn warn(&self, error: Error) {
        warn!(error = %error, "Worker warning");
        self.emit(WorkerEvent::Warning(error.to_string()));
    }

    fn emit(&self, event: WorkerEvent) {
        if self.events.send(event).is_err() {
            debug!("Event receiver dropped");
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
