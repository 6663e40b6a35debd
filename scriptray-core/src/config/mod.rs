//! Configuration module for Scriptray.
//!
//! Manages the flat settings file and the per-user program folder.

mod paths;
pub mod properties;
mod settings;

pub use paths::{
    ProgramDirs, APP_DIR_NAME, APP_LOG_FILE_NAME, CONFIG_FILE_NAME, HOME_ENV,
    OUTPUT_LOG_FILE_NAME,
};
pub use settings::{SettingKey, SettingsStore};
