//! marks::config - bookmark file, display settings, and keybinds
//!
//! Usage in Rhai:
//! ```rhai
//! marks::config::set_bookmark_file("~/notes/bookmarks");
//! marks::config::set_preview_width(40);
//! marks::config::bind("M", "bookmark_menu");
//! ```

use rhai::plugin::*;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use crate::config::Settings;

const MIN_PREVIEW_WIDTH: i64 = 8;
const MAX_PREVIEW_WIDTH: i64 = 200;

/// Create the config module with access to settings
pub fn create_module(settings: Arc<RwLock<Settings>>) -> rhai::Module {
    let mut module = rhai::Module::new();

    // set_bookmark_file(path: &str)
    {
        let s = Arc::clone(&settings);
        module.set_native_fn("set_bookmark_file", move |path: &str| -> Result<(), Box<EvalAltResult>> {
            if let Ok(mut settings) = s.write() {
                settings.bookmark_file = expand_home(path);
            }
            Ok(())
        });
    }

    // get_bookmark_file() -> String
    {
        let s = Arc::clone(&settings);
        module.set_native_fn(
            "get_bookmark_file",
            move || -> Result<String, Box<EvalAltResult>> {
                Ok(s
                    .read()
                    .map(|s| s.bookmark_file.display().to_string())
                    .unwrap_or_default())
            },
        );
    }

    // set_preview_width(width: i64)
    {
        let s = Arc::clone(&settings);
        module.set_native_fn("set_preview_width", move |width: i64| -> Result<(), Box<EvalAltResult>> {
            if let Ok(mut settings) = s.write() {
                settings.preview_width =
                    width.clamp(MIN_PREVIEW_WIDTH, MAX_PREVIEW_WIDTH) as usize;
            }
            Ok(())
        });
    }

    // get_preview_width() -> i64
    {
        let s = Arc::clone(&settings);
        module.set_native_fn(
            "get_preview_width",
            move || -> Result<i64, Box<EvalAltResult>> {
                Ok(s.read().map(|s| s.preview_width as i64).unwrap_or(0))
            },
        );
    }

    // set_show_line_numbers(enabled: bool)
    {
        let s = Arc::clone(&settings);
        module.set_native_fn("set_show_line_numbers", move |enabled: bool| -> Result<(), Box<EvalAltResult>> {
            if let Ok(mut settings) = s.write() {
                settings.show_line_numbers = enabled;
            }
            Ok(())
        });
    }

    // set_relative_line_numbers(enabled: bool)
    {
        let s = Arc::clone(&settings);
        module.set_native_fn("set_relative_line_numbers", move |enabled: bool| -> Result<(), Box<EvalAltResult>> {
            if let Ok(mut settings) = s.write() {
                settings.relative_line_numbers = enabled;
            }
            Ok(())
        });
    }

    // bind(key: &str, action: &str)
    {
        let s = Arc::clone(&settings);
        module.set_native_fn("bind", move |key: &str, action: &str| -> Result<(), Box<EvalAltResult>> {
            if let Ok(mut settings) = s.write() {
                settings
                    .keybinds
                    .insert(key.to_string(), action.to_string());
            }
            Ok(())
        });
    }

    module
}

/// `~/x` -> `$HOME/x`
fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_home_leaves_absolute_paths() {
        assert_eq!(expand_home("/etc/marks"), PathBuf::from("/etc/marks"));
    }

    #[test]
    fn expand_home_replaces_tilde() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/marks"), home.join("marks"));
        }
    }
}
