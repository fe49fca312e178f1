//! Settings and well-known paths

mod settings;

use std::path::PathBuf;

pub use settings::Settings;

/// Config directory. Uses ~/.config/linemark/ on all platforms for consistency
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".config").join("linemark"))
        .unwrap_or_else(|| PathBuf::from(".linemark"))
}

/// The Rhai init script, loaded at startup if present
pub fn config_file() -> PathBuf {
    config_dir().join("init.rhai")
}

/// Default location of the bookmark file
pub fn default_bookmark_file() -> PathBuf {
    config_dir().join("bookmarks")
}

/// Log file used while the terminal UI owns the screen
pub fn log_file() -> PathBuf {
    config_dir().join("linemark.log")
}
