//! Scripting module - Rhai runtime for init scripts and plugins
//!
//! Everything a script can reach is exposed under the `editor` namespace:
//! - `editor::commands::*` - register and run commands
//! - `editor::events::*` - subscribe to and emit events
//! - `editor::keymap::*` - chord bindings
//! - `editor::config::*` - runtime settings

mod api;
mod context;
mod engine;

pub use engine::{ScriptEngine, ScriptTables};
