use std::path::PathBuf;

use super::paths;

/// Runtime settings that can be customized from the init script.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Keymap document loaded at startup.
    pub keymap_file: PathBuf,
    /// Script evaluated before the keymap is loaded.
    pub init_script: PathBuf,
    pub save_keymap_on_exit: bool,
}

impl Default for Settings {
    fn default() -> Self {
        let dir = paths::config_dir().unwrap_or_default();
        Self {
            keymap_file: dir.join(paths::DEFAULT_KEYMAP),
            init_script: dir.join(paths::INIT_SCRIPT),
            save_keymap_on_exit: false,
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the keymap at `path`, resolved against the config directory
    /// when relative.
    pub fn set_keymap_file(&mut self, path: &str) {
        let base = paths::config_dir().unwrap_or_default();
        self.keymap_file = crate::fs::resolve(&base, path);
    }
}
