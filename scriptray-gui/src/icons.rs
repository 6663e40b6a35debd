//! Bundled window icons.

use std::sync::Arc;

use eframe::egui::IconData;
use scriptray_core::Error;
use tracing::error;

const SCRIPT_ICON: (&str, &[u8]) = ("script.png", include_bytes!("../assets/script.png"));
const FLASH_ICON: (&str, &[u8]) = ("flash.png", include_bytes!("../assets/flash.png"));

/// Icon pair: idle and "a script is running".
#[derive(Clone)]
pub struct Icons {
    pub idle: Arc<IconData>,
    pub running: Arc<IconData>,
}

impl Icons {
    /// Decode both bundled icons. Fails if either is unusable.
    pub fn load() -> Result<Self, Error> {
        Ok(Self {
            idle: Arc::new(decode(SCRIPT_ICON.0, SCRIPT_ICON.1)?),
            running: Arc::new(decode(FLASH_ICON.0, FLASH_ICON.1)?),
        })
    }
}

fn decode(name: &str, bytes: &[u8]) -> Result<IconData, Error> {
    let image = image::load_from_memory(bytes).map_err(|e| {
        error!(icon = name, error = %e, "Failed to decode icon");
        Error::ResourceMissing(name.to_string())
    })?;
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(IconData {
        rgba: rgba.into_raw(),
        width,
        height,
    })
}
