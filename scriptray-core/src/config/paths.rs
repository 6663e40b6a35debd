//! Per-user program folder layout.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Folder name under the platform config directory.
pub const APP_DIR_NAME: &str = "Scriptray";

/// Environment variable overriding the program folder.
pub const HOME_ENV: &str = "SCRIPTRAY_HOME";

/// Settings file name.
pub const CONFIG_FILE_NAME: &str = "config.ini";

/// Script output log file name.
pub const OUTPUT_LOG_FILE_NAME: &str = "system_output.log";

/// Application diagnostic log file name.
pub const APP_LOG_FILE_NAME: &str = "scriptray.log";

/// Locations of everything Scriptray persists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramDirs {
    root: PathBuf,
}

impl ProgramDirs {
    /// Resolve the program folder for the current user.
    ///
    /// `SCRIPTRAY_HOME` wins when set; otherwise the platform config directory
    /// is used (`%APPDATA%` on Windows, `~/.config` on Linux).
    pub fn resolve() -> Result<Self> {
        if let Some(home) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::at(home));
        }

        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
            .ok_or(Error::NoConfigDir)?;

        Ok(Self::at(base.join(APP_DIR_NAME)))
    }

    /// Use an explicit program folder.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the program folder if it doesn't exist yet.
    pub fn ensure(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root).map_err(|source| Error::ConfigWrite {
            path: self.root.clone(),
            source,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join(CONFIG_FILE_NAME)
    }

    pub fn output_log(&self) -> PathBuf {
        self.root.join(OUTPUT_LOG_FILE_NAME)
    }

    pub fn app_log(&self) -> PathBuf {
        self.root.join(APP_LOG_FILE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_layout() {
        let dirs = ProgramDirs::at("/data/Scriptray");
        assert_eq!(dirs.root(), Path::new("/data/Scriptray"));
        assert_eq!(dirs.config_file(), PathBuf::from("/data/Scriptray/config.ini"));
        assert_eq!(
            dirs.output_log(),
            PathBuf::from("/data/Scriptray/system_output.log")
        );
        assert_eq!(dirs.app_log(), PathBuf::from("/data/Scriptray/scriptray.log"));
    }

    #[test]
    fn test_ensure_creates_nested_folder() {
        let temp = TempDir::new().unwrap();
        let dirs = ProgramDirs::at(temp.path().join("a").join("b"));
        dirs.ensure().unwrap();
        assert!(dirs.root().is_dir());
        // Idempotent
        dirs.ensure().unwrap();
    }
}
