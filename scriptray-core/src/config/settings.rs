//! Application settings for Scriptray.
//!
//! Settings are a flat string map persisted to `config.ini` in the
//! properties format. Every known key has a built-in default, so readers
//! always get a usable value even from a hand-edited or truncated file.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::properties;
use crate::error::{Error, Result};

/// Header comment written at the top of the settings file.
const FILE_COMMENT: &str = "Scriptray settings";

// =============================================================================
// Setting Keys
// =============================================================================

/// Known settings keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    /// Folder scanned for scripts.
    ScriptFolder,
    /// Absolute path of the most recently attempted script.
    LastScript,
    /// Whether script output is captured and shown.
    ShowOutput,
    /// Character count at which output counts as big.
    LettersUntilBigOutput,
    /// Line count above which output counts as big.
    LinesUntilBigOutput,
}

impl SettingKey {
    /// All known keys, in file order.
    pub fn all() -> &'static [SettingKey] {
        &[
            Self::ScriptFolder,
            Self::LastScript,
            Self::ShowOutput,
            Self::LettersUntilBigOutput,
            Self::LinesUntilBigOutput,
        ]
    }

    /// Key as written to the settings file.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ScriptFolder => "script_folder",
            Self::LastScript => "last_script",
            Self::ShowOutput => "show_output",
            Self::LettersUntilBigOutput => "letters_until_big_output",
            Self::LinesUntilBigOutput => "lines_until_big_output",
        }
    }

    /// Built-in default value.
    pub fn default_value(&self) -> &'static str {
        match self {
            Self::ScriptFolder => "",
            Self::LastScript => "",
            Self::ShowOutput => "false",
            Self::LettersUntilBigOutput => "120",
            Self::LinesUntilBigOutput => "4",
        }
    }
}

impl std::fmt::Display for SettingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Settings Store
// =============================================================================

/// Flat key/value settings backed by a file.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl SettingsStore {
    /// In-memory store holding only the defaults. Nothing is written.
    pub fn with_defaults(path: impl Into<PathBuf>) -> Self {
        let mut store = Self {
            path: path.into(),
            entries: BTreeMap::new(),
        };
        store.fill_defaults();
        store
    }

    /// Load settings from `path`.
    ///
    /// A missing file is created with the defaults. A file that exists but
    /// can't be read is an [`Error::ConfigRead`]; its contents never are.
    /// Keys absent from the file are filled in with their defaults.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if !path.exists() {
            info!(path = %path.display(), "No settings file yet, writing defaults");
            let store = Self::with_defaults(path);
            if let Err(e) = store.save() {
                warn!(error = %e, "Failed to persist default settings");
            }
            return Ok(store);
        }

        let bytes = fs::read(&path).map_err(|source| Error::ConfigRead {
            path: path.clone(),
            source,
        })?;

        let mut store = Self {
            entries: properties::parse(&decode(&bytes, &path)),
            path,
        };
        store.fill_defaults();
        debug!(path = %store.path.display(), entries = store.entries.len(), "Loaded settings");

        Ok(store)
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All entries, including keys Scriptray doesn't know about.
    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }

    /// Stored value, or the default when the key is absent.
    pub fn get(&self, key: SettingKey) -> &str {
        self.entries
            .get(key.as_str())
            .map(String::as_str)
            .unwrap_or_else(|| key.default_value())
    }

    /// Stored value parsed as an integer.
    ///
    /// Unparseable values fall back to the default with a warning.
    pub fn get_int(&self, key: SettingKey) -> i64 {
        let raw = self.get(key);
        match raw.trim().parse::<i64>() {
            Ok(value) => value,
            Err(e) => {
                let fallback = key.default_value().parse().unwrap_or(0);
                warn!(
                    key = key.as_str(),
                    value = raw,
                    error = %e,
                    fallback,
                    "Can't parse setting as a number, using default"
                );
                fallback
            }
        }
    }

    /// Stored value parsed as a boolean (`true` ignoring case, else `false`).
    pub fn get_bool(&self, key: SettingKey) -> bool {
        self.get(key).trim().eq_ignore_ascii_case("true")
    }

    /// Update a value in memory and persist the whole store.
    ///
    /// On a write failure the in-memory value is kept and the error returned.
    pub fn set(&mut self, key: SettingKey, value: impl Into<String>) -> Result<()> {
        self.entries.insert(key.as_str().to_string(), value.into());
        self.save()
    }

    /// Write every entry to the backing file, replacing its contents.
    pub fn save(&self) -> Result<()> {
        let write_err = |source| Error::ConfigWrite {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        fs::write(&self.path, properties::serialize(&self.entries, FILE_COMMENT))
            .map_err(write_err)?;

        debug!(path = %self.path.display(), "Saved settings");
        Ok(())
    }

    fn fill_defaults(&mut self) {
        for key in SettingKey::all() {
            self.entries
                .entry(key.as_str().to_string())
                .or_insert_with(|| key.default_value().to_string());
        }
    }
}

/// Decode file contents as UTF-8, falling back to Latin-1.
///
/// Latin-1 maps every byte to a char, so a hand-edited file with stray
/// high bytes still loads with all of its keys.
fn decode(bytes: &[u8], path: &Path) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                "Settings file is not UTF-8, reading it as Latin-1"
            );
            bytes.iter().map(|&b| char::from(b)).collect()
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_path(temp: &TempDir) -> PathBuf {
        temp.path().join("config.ini")
    }

    // -------------------------------------------------------------------------
    // Key Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_key_names() {
        let names: Vec<&str> = SettingKey::all().iter().map(|k| k.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "script_folder",
                "last_script",
                "show_output",
                "letters_until_big_output",
                "lines_until_big_output"
            ]
        );
    }

    #[test]
    fn test_key_defaults() {
        assert_eq!(SettingKey::ScriptFolder.default_value(), "");
        assert_eq!(SettingKey::LastScript.default_value(), "");
        assert_eq!(SettingKey::ShowOutput.default_value(), "false");
        assert_eq!(SettingKey::LettersUntilBigOutput.default_value(), "120");
        assert_eq!(SettingKey::LinesUntilBigOutput.default_value(), "4");
    }

    // -------------------------------------------------------------------------
    // Load Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_load_missing_file_writes_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.ini");

        let store = SettingsStore::load(&path).unwrap();

        assert!(path.exists());
        assert_eq!(store.get(SettingKey::ScriptFolder), "");
        assert!(!store.get_bool(SettingKey::ShowOutput));
        assert_eq!(store.get_int(SettingKey::LettersUntilBigOutput), 120);
        assert_eq!(store.get_int(SettingKey::LinesUntilBigOutput), 4);

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("letters_until_big_output=120"));
        assert!(written.contains("show_output=false"));
    }

    #[test]
    fn test_load_partial_file_fills_defaults() {
        let temp = TempDir::new().unwrap();
        let path = config_path(&temp);
        fs::write(&path, "show_output=true\n").unwrap();

        let store = SettingsStore::load(&path).unwrap();

        assert!(store.get_bool(SettingKey::ShowOutput));
        assert_eq!(store.get_int(SettingKey::LinesUntilBigOutput), 4);
        for key in SettingKey::all() {
            assert!(store.entries().contains_key(key.as_str()));
        }
    }

    #[test]
    fn test_load_keeps_unknown_keys() {
        let temp = TempDir::new().unwrap();
        let path = config_path(&temp);
        fs::write(&path, "future_option=on\nlast_script=/x/run.sh\n").unwrap();

        let store = SettingsStore::load(&path).unwrap();
        assert_eq!(store.entries()["future_option"], "on");
        assert_eq!(store.get(SettingKey::LastScript), "/x/run.sh");
    }

    #[test]
    fn test_load_garbage_never_fails() {
        let temp = TempDir::new().unwrap();
        let path = config_path(&temp);
        fs::write(&path, "=====\n:::\n\\\nletters_until_big_output=lots\n\\u12").unwrap();

        let store = SettingsStore::load(&path).unwrap();
        assert_eq!(store.get_int(SettingKey::LettersUntilBigOutput), 120);
        assert_eq!(store.get(SettingKey::ScriptFolder), "");
    }

    #[test]
    fn test_load_latin1_file_keeps_every_key() {
        let temp = TempDir::new().unwrap();
        let path = config_path(&temp);
        fs::write(
            &path,
            b"script_folder=/home/me/scripts\nshow_output=true\nlast_script=/home/me/scripts/J\xfcrgen.sh\nfuture_option=on\n",
        )
        .unwrap();

        let store = SettingsStore::load(&path).unwrap();
        assert_eq!(store.get(SettingKey::ScriptFolder), "/home/me/scripts");
        assert!(store.get_bool(SettingKey::ShowOutput));
        assert_eq!(store.get(SettingKey::LastScript), "/home/me/scripts/J\u{fc}rgen.sh");
        assert_eq!(store.entries()["future_option"], "on");
    }

    #[test]
    fn test_latin1_file_survives_next_save() {
        let temp = TempDir::new().unwrap();
        let path = config_path(&temp);
        fs::write(&path, b"script_folder=/srv/sk\xe9\nshow_output=true\n").unwrap();

        let mut store = SettingsStore::load(&path).unwrap();
        store.set(SettingKey::ShowOutput, "false").unwrap();

        let reloaded = SettingsStore::load(&path).unwrap();
        assert_eq!(reloaded.get(SettingKey::ScriptFolder), "/srv/sk\u{e9}");
        assert!(!reloaded.get_bool(SettingKey::ShowOutput));
    }

    #[test]
    fn test_load_directory_is_read_error() {
        let temp = TempDir::new().unwrap();
        let err = SettingsStore::load(temp.path()).unwrap_err();
        assert!(matches!(err, Error::ConfigRead { .. }));
    }

    // -------------------------------------------------------------------------
    // Accessor Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_get_int_trims_whitespace() {
        let temp = TempDir::new().unwrap();
        let path = config_path(&temp);
        fs::write(&path, "lines_until_big_output=  7  \n").unwrap();

        let store = SettingsStore::load(&path).unwrap();
        assert_eq!(store.get_int(SettingKey::LinesUntilBigOutput), 7);
    }

    #[test]
    fn test_get_int_falls_back_on_parse_failure() {
        let mut store = SettingsStore::with_defaults("unused.ini");
        store
            .entries
            .insert("lines_until_big_output".to_string(), "four".to_string());
        assert_eq!(store.get_int(SettingKey::LinesUntilBigOutput), 4);
    }

    #[test]
    fn test_get_bool_is_case_insensitive() {
        let mut store = SettingsStore::with_defaults("unused.ini");
        for (raw, expected) in [("TRUE", true), ("True", true), ("yes", false), ("", false)] {
            store
                .entries
                .insert("show_output".to_string(), raw.to_string());
            assert_eq!(store.get_bool(SettingKey::ShowOutput), expected, "{raw}");
        }
    }

    #[test]
    fn test_get_returns_default_when_absent() {
        let mut store = SettingsStore::with_defaults("unused.ini");
        store.entries.clear();
        assert_eq!(store.get(SettingKey::LettersUntilBigOutput), "120");
    }

    // -------------------------------------------------------------------------
    // Save Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_set_persists_immediately() {
        let temp = TempDir::new().unwrap();
        let path = config_path(&temp);
        let mut store = SettingsStore::load(&path).unwrap();

        store.set(SettingKey::ScriptFolder, "/home/me/scripts").unwrap();

        let reloaded = SettingsStore::load(&path).unwrap();
        assert_eq!(reloaded.get(SettingKey::ScriptFolder), "/home/me/scripts");
    }

    #[test]
    fn test_set_keeps_memory_value_when_write_fails() {
        let temp = TempDir::new().unwrap();
        // Parent is a file, so the write can't succeed.
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, "x").unwrap();
        let mut store = SettingsStore::with_defaults(blocker.join("config.ini"));

        let err = store.set(SettingKey::ShowOutput, "true").unwrap_err();

        assert!(matches!(err, Error::ConfigWrite { .. }));
        assert!(store.get_bool(SettingKey::ShowOutput));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = config_path(&temp);
        fs::write(
            &path,
            "#old header\nscript_folder=C\\:\\\\Users\\\\me\\\\scripts\nlast_script=/a b/c=d.sh\n\
             show_output=true\nletters_until_big_output=300\nlines_until_big_output=10\nextra=1\n",
        )
        .unwrap();

        let first = SettingsStore::load(&path).unwrap();
        first.save().unwrap();
        let second = SettingsStore::load(&path).unwrap();

        assert_eq!(first.entries(), second.entries());
        assert_eq!(second.get(SettingKey::ScriptFolder), "C:\\Users\\me\\scripts");
        assert_eq!(second.get(SettingKey::LastScript), "/a b/c=d.sh");
    }
}
