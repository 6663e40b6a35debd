//! Application context.
//!
//! Single owner of everything the launcher remembers between runs: the
//! settings store and the program folder layout. Only the run queue worker
//! holds a mutable [`AppContext`]; the UI sees [`ContextSnapshot`]s.

use std::io;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::{ProgramDirs, SettingKey, SettingsStore};
use crate::error::{Error, Result};
use crate::output::OutputThresholds;
use crate::scripts::{absolute_path, ScriptRef};

/// Read-only copy of the context for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextSnapshot {
    /// Program folder (settings and logs live here).
    pub program_dir: PathBuf,
    pub script_folder: Option<PathBuf>,
    pub last_script: Option<ScriptRef>,
    pub show_output: bool,
    pub thresholds: OutputThresholds,
}

/// Settings plus program folder, with typed accessors.
#[derive(Debug)]
pub struct AppContext {
    dirs: ProgramDirs,
    settings: SettingsStore,
}

impl AppContext {
    pub fn new(dirs: ProgramDirs, settings: SettingsStore) -> Self {
        Self { dirs, settings }
    }

    /// Create the program folder and load (or create) the settings file.
    pub fn load(dirs: ProgramDirs) -> Result<Self> {
        dirs.ensure()?;
        let settings = SettingsStore::load(dirs.config_file())?;
        info!(program_dir = %dirs.root().display(), "Loaded application context");
        Ok(Self::new(dirs, settings))
    }

    /// Context with default settings that will be written on the next change.
    pub fn with_defaults(dirs: ProgramDirs) -> Self {
        let settings = SettingsStore::with_defaults(dirs.config_file());
        Self::new(dirs, settings)
    }

    pub fn dirs(&self) -> &ProgramDirs {
        &self.dirs
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Configured script folder, `None` when unset.
    pub fn script_folder(&self) -> Option<PathBuf> {
        non_empty_path(self.settings.get(SettingKey::ScriptFolder))
    }

    /// Most recently attempted script, `None` when no script ran yet.
    pub fn last_script(&self) -> Option<ScriptRef> {
        non_empty_path(self.settings.get(SettingKey::LastScript)).map(ScriptRef::new)
    }

    pub fn show_output(&self) -> bool {
        self.settings.get_bool(SettingKey::ShowOutput)
    }

    /// Big-output thresholds. Negative values fall back to the defaults.
    pub fn thresholds(&self) -> OutputThresholds {
        let defaults = OutputThresholds::default();
        OutputThresholds {
            chars: self.threshold(SettingKey::LettersUntilBigOutput, defaults.chars),
            lines: self.threshold(SettingKey::LinesUntilBigOutput, defaults.lines),
        }
    }

    pub fn snapshot(&self) -> ContextSnapshot {
        ContextSnapshot {
            program_dir: self.dirs.root().to_path_buf(),
            script_folder: self.script_folder(),
            last_script: self.last_script(),
            show_output: self.show_output(),
            thresholds: self.thresholds(),
        }
    }

    fn threshold(&self, key: SettingKey, default: usize) -> usize {
        let raw = self.settings.get_int(key);
        usize::try_from(raw).unwrap_or_else(|_| {
            warn!(key = key.as_str(), value = raw, default, "Negative threshold, using default");
            default
        })
    }

    // =========================================================================
    // Mutators
    // =========================================================================
    //
    // Each mutator updates memory first, then persists. A write failure is
    // returned but the in-memory value stays.

    pub fn set_show_output(&mut self, show: bool) -> Result<()> {
        self.settings.set(SettingKey::ShowOutput, show.to_string())
    }

    /// Point at a new script folder. It must be an existing directory.
    pub fn set_script_folder(&mut self, folder: &Path) -> Result<()> {
        if !folder.is_dir() {
            return Err(Error::ScriptFolder {
                path: folder.to_path_buf(),
                source: io::Error::new(io::ErrorKind::NotFound, "not an existing directory"),
            });
        }
        let folder = absolute_path(folder);
        self.settings
            .set(SettingKey::ScriptFolder, folder.to_string_lossy().into_owned())
    }

    /// Remember `script` as the last attempted one.
    ///
    /// Only writes when the path differs from the current value; returns
    /// whether it changed.
    pub fn record_attempt(&mut self, script: &ScriptRef) -> Result<bool> {
        if self.last_script().as_ref() == Some(script) {
            return Ok(false);
        }
        let path = absolute_path(script.path());
        self.settings
            .set(SettingKey::LastScript, path.to_string_lossy().into_owned())?;
        Ok(true)
    }
}

fn non_empty_path(raw: &str) -> Option<PathBuf> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
}
