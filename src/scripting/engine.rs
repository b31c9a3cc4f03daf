//! The Rhai scripting engine
//!
//! Provides the `editor` namespace:
//! - `editor::commands::*` - register and run commands
//! - `editor::events::*` - subscribe to and emit events
//! - `editor::keymap::*` - chord bindings
//! - `editor::config::*` - runtime settings

use std::path::Path;
use std::rc::Rc;
use std::sync::{Arc, RwLock};

use rhai::{Engine, Scope};

use super::api;
use super::context::ScriptContext;
use crate::commands::CommandRegistry;
use crate::config::Settings;
use crate::error::RuntimeError;
use crate::events::EventBus;
use crate::keymap::Keymap;

/// The tables a script engine operates on.
#[derive(Clone)]
pub struct ScriptTables {
    pub commands: Rc<CommandRegistry>,
    pub events: Rc<EventBus>,
    pub keymap: Rc<Keymap>,
    pub settings: Arc<RwLock<Settings>>,
}

pub struct ScriptEngine {
    engine: Rc<Engine>,
    context: Rc<ScriptContext>,
    settings: Arc<RwLock<Settings>>,
}

impl ScriptEngine {
    pub fn new(tables: ScriptTables) -> Self {
        let context = Rc::new(ScriptContext::default());
        let engine = Rc::new(Self::create_engine(&context, &tables));
        context.attach(&engine);

        Self {
            engine,
            context,
            settings: tables.settings,
        }
    }

    /// Create the Rhai engine with the `editor` namespace
    fn create_engine(context: &Rc<ScriptContext>, tables: &ScriptTables) -> Engine {
        let mut engine = Engine::new();

        // Safety limits
        engine.set_max_expr_depths(64, 64);
        engine.set_max_operations(100_000);

        let mut editor_module = rhai::Module::new();
        editor_module.set_sub_module(
            "commands",
            api::commands::create_module(Rc::clone(context), Rc::clone(&tables.commands)),
        );
        editor_module.set_sub_module(
            "events",
            api::events::create_module(Rc::clone(context), Rc::clone(&tables.events)),
        );
        editor_module.set_sub_module("keymap", api::keymap::create_module(Rc::clone(&tables.keymap)));
        editor_module.set_sub_module(
            "config",
            api::config::create_module(Arc::clone(&tables.settings)),
        );

        // Register `editor` as a static module (accessible as editor::*)
        engine.register_static_module("editor", editor_module.into());

        engine.register_fn("print", |msg: &str| {
            tracing::info!(target: "keyway::script", "{}", msg);
        });

        engine
    }

    /// Load and execute a script file
    pub fn load_file(&self, path: &Path) -> Result<(), RuntimeError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RuntimeError::Script(format!("failed to read {}: {}", path.display(), e))
        })?;

        self.eval(&content)
    }

    /// Load `path` if it exists. A missing script is not an error.
    pub fn load_if_present(&self, path: &Path) -> Result<(), RuntimeError> {
        if path.exists() {
            return self.load_file(path);
        }
        tracing::debug!(path = %path.display(), "no init script");
        Ok(())
    }

    /// Evaluate a Rhai script string
    ///
    /// Functions the script registers stay bound to this script's AST after
    /// evaluation finishes.
    pub fn eval(&self, script: &str) -> Result<(), RuntimeError> {
        let ast = self
            .engine
            .compile(script)
            .map_err(|e| RuntimeError::Script(format!("parse error: {}", e)))?;
        let ast = Rc::new(ast);
        self.context.set_ast(Rc::clone(&ast));

        let mut scope = Scope::new();
        self.engine
            .run_ast_with_scope(&mut scope, &ast)
            .map_err(|e| RuntimeError::Script(e.to_string()))?;

        Ok(())
    }

    /// Get the current settings (cloned)
    pub fn settings(&self) -> Settings {
        self.settings.read().map(|s| s.clone()).unwrap_or_default()
    }
}
