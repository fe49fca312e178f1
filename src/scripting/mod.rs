//! Scripting module - Rhai runtime for configuration and plugins
//!
//! All functions are exposed under the `marks` namespace:
//! - `marks::config::*` - bookmark file, preview width, display, keybinds
//! - `marks::lines::*` - sort lines with built-in or script comparators

mod api;
mod engine;

pub use engine::ScriptEngine;
