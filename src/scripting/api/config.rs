//! editor::config - runtime settings
//!
//! Usage in Rhai:
//! ```rhai
//! editor::config::set_keymap_file("keymaps/vim.json");
//! editor::config::set_save_keymap_on_exit(true);
//! ```

use rhai::plugin::*;
use std::sync::{Arc, RwLock};

use crate::config::Settings;

/// Create the config module with access to settings
pub fn create_module(settings: Arc<RwLock<Settings>>) -> rhai::Module {
    let mut module = rhai::Module::new();

    // set_keymap_file(path: &str)
    {
        let s = Arc::clone(&settings);
        module.set_native_fn(
            "set_keymap_file",
            move |path: &str| -> Result<(), Box<EvalAltResult>> {
                if let Ok(mut settings) = s.write() {
                    settings.set_keymap_file(path);
                }
                Ok(())
            },
        );
    }

    // get_keymap_file() -> String
    {
        let s = Arc::clone(&settings);
        module.set_native_fn(
            "get_keymap_file",
            move || -> Result<String, Box<EvalAltResult>> {
                Ok(s.read()
                    .map(|s| s.keymap_file.display().to_string())
                    .unwrap_or_default())
            },
        );
    }

    // set_save_keymap_on_exit(enabled: bool)
    {
        let s = Arc::clone(&settings);
        module.set_native_fn(
            "set_save_keymap_on_exit",
            move |enabled: bool| -> Result<(), Box<EvalAltResult>> {
                if let Ok(mut settings) = s.write() {
                    settings.save_keymap_on_exit = enabled;
                }
                Ok(())
            },
        );
    }

    // get_save_keymap_on_exit() -> bool
    {
        let s = Arc::clone(&settings);
        module.set_native_fn(
            "get_save_keymap_on_exit",
            move || -> Result<bool, Box<EvalAltResult>> {
                Ok(s.read().map(|s| s.save_keymap_on_exit).unwrap_or(false))
            },
        );
    }

    module
}
