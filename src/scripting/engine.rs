//! The Rhai scripting engine for linemark
//!
//! Provides the `marks` namespace:
//! - `marks::config::*` - settings and keybinds
//! - `marks::lines::*` - line sorting, comparison and preview helpers

use std::path::Path;
use std::sync::{Arc, RwLock};

use rhai::{Engine, Scope};

use super::api;
use crate::config::{self, Settings};
use crate::error::{Error, Result};

/// The scripting engine that runs init scripts and plugin code
pub struct ScriptEngine {
    engine: Engine,
    settings: Arc<RwLock<Settings>>,
}

impl ScriptEngine {
    /// Create a new script engine with default settings
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    /// Create a script engine that starts from `settings`
    pub fn with_settings(settings: Settings) -> Self {
        let settings = Arc::new(RwLock::new(settings));
        let engine = Self::create_engine(Arc::clone(&settings));

        Self { engine, settings }
    }

    /// Create the Rhai engine with the `marks` namespace
    fn create_engine(settings: Arc<RwLock<Settings>>) -> Engine {
        let mut engine = Engine::new();

        // Safety limits
        engine.set_max_expr_depths(64, 64);
        engine.set_max_operations(1_000_000);

        let mut marks_module = rhai::Module::new();
        marks_module.set_sub_module("config", api::config::create_module(settings));
        marks_module.set_sub_module("lines", api::lines::create_module());

        // Accessible as marks::*
        engine.register_static_module("marks", marks_module.into());

        engine.on_print(|msg| tracing::info!(target: "rhai", "{}", msg));
        engine.on_debug(|msg, _source, pos| tracing::debug!(target: "rhai", "{} ({})", msg, pos));

        engine
    }

    /// Load and execute a script file
    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path)?;
        tracing::info!("Running script {}", path.display());
        self.eval(&content)
    }

    /// Evaluate a Rhai script string for its side effects
    pub fn eval(&mut self, script: &str) -> Result<()> {
        let ast = self
            .engine
            .compile(script)
            .map_err(|e| Error::Script(format!("parse error: {}", e)))?;

        let mut scope = Scope::new();
        self.engine
            .run_ast_with_scope(&mut scope, &ast)
            .map_err(|e| Error::Script(e.to_string()))
    }

    /// Evaluate a Rhai expression and return its value
    pub fn eval_value<T: Clone + 'static>(&self, script: &str) -> Result<T> {
        self.engine
            .eval::<T>(script)
            .map_err(|e| Error::Script(e.to_string()))
    }

    /// Get the current settings (cloned)
    pub fn settings(&self) -> Settings {
        self.settings.read().map(|s| s.clone()).unwrap_or_default()
    }

    /// Load the default init script if it exists
    pub fn load_default(&mut self) -> Result<()> {
        let init = config::config_file();
        if init.exists() {
            return self.load_file(&init);
        }
        Ok(()) // No init script is fine
    }
}

impl Default for ScriptEngine {
    fn default() -> Self {
        Self::new()
    }
}
