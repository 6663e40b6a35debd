//! Script references and folder discovery.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Error, Result};

/// File name suffixes recognised as runnable scripts.
pub const SCRIPT_EXTENSIONS: &[&str] = &[".cmd", ".bat", ".sh"];

/// A runnable script, identified by its path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScriptRef {
    path: PathBuf,
}

impl ScriptRef {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name shown in menus and notifications.
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

impl fmt::Display for ScriptRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// Whether a file name ends with one of [`SCRIPT_EXTENSIONS`].
pub fn is_script_name(name: &str) -> bool {
    SCRIPT_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}

/// Resolve a relative path against the current directory.
pub(crate) fn absolute_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// List the scripts directly inside `folder`.
///
/// Not recursive. Entries come back in the order the filesystem yields them.
pub fn discover_scripts(folder: &Path) -> Result<Vec<ScriptRef>> {
    let folder_err = |source| Error::ScriptFolder {
        path: folder.to_path_buf(),
        source,
    };

    let mut scripts = Vec::new();
    for entry in std::fs::read_dir(folder).map_err(folder_err)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Failed to read directory entry: {}", e);
                continue;
            }
        };

        let name = entry.file_name();
        if !is_script_name(&name.to_string_lossy()) {
            continue;
        }

        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        scripts.push(ScriptRef::new(path));
    }

    debug!(folder = %folder.display(), count = scripts.len(), "Discovered scripts");
    Ok(scripts)
}
