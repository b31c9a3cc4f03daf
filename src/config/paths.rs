use std::io;
use std::path::PathBuf;

pub const APP_DIR: &str = "keyway";
pub const DEFAULT_KEYMAP: &str = "keymaps/default.json";
pub const INIT_SCRIPT: &str = "init.rhai";

/// Per-user configuration directory, e.g. `~/.config/keyway`.
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(APP_DIR))
}

/// Log directory under the config directory, created if missing.
pub fn ensure_logs_dir() -> io::Result<PathBuf> {
    let dir = config_dir()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no config directory"))?
        .join("logs");
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
