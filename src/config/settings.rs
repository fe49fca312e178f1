use std::collections::HashMap;
use std::path::PathBuf;

use crate::bookmark::{DEFAULT_PREVIEW_WIDTH, StoreConfig};

/// Settings that can be customized via the Rhai init script
#[derive(Debug, Clone)]
pub struct Settings {
    // Bookmarks
    pub bookmark_file: PathBuf,
    pub preview_width: usize,

    // Display
    pub show_line_numbers: bool,
    pub relative_line_numbers: bool,

    // Custom keybinds: key -> action name
    pub keybinds: HashMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bookmark_file: super::default_bookmark_file(),
            preview_width: DEFAULT_PREVIEW_WIDTH,

            show_line_numbers: true,
            relative_line_numbers: false,

            keybinds: HashMap::new(),
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store configuration derived from these settings
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::new(&self.bookmark_file).with_preview_width(self.preview_width)
    }
}
