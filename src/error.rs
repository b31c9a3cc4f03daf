//! Error taxonomy for the runtime.
//!
//! Only [`RuntimeError::Validation`] and [`RuntimeError::InvalidChord`] are
//! ever returned to a caller. The other variants are built at the point of
//! failure, logged, and dropped.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Bad arguments to a registration call.
    #[error("validation error: {0}")]
    Validation(String),

    /// A local handler or the native fallback failed.
    #[error("command '{name}' failed: {source}")]
    CommandExecution {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    /// Reading, parsing or writing a keymap document failed.
    #[error("keymap persistence failed for {}: {source}", .path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("invalid chord '{0}'")]
    InvalidChord(String),

    /// Compiling or evaluating a script failed.
    #[error("script error: {0}")]
    Script(String),
}

impl RuntimeError {
    pub fn command(name: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::CommandExecution {
            name: name.into(),
            source: source.into(),
        }
    }

    pub fn persistence(path: impl Into<PathBuf>, source: impl Into<anyhow::Error>) -> Self {
        Self::Persistence {
            path: path.into(),
            source: source.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_error_names_the_command() {
        let err = RuntimeError::command("file.save", anyhow::anyhow!("disk full"));
        assert_eq!(err.to_string(), "command 'file.save' failed: disk full");
    }

    #[test]
    fn persistence_error_names_the_path() {
        let err = RuntimeError::persistence("keymaps/default.json", anyhow::anyhow!("not found"));
        assert_eq!(
            err.to_string(),
            "keymap persistence failed for keymaps/default.json: not found"
        );
    }
}
