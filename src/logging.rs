//! Tracing setup.
//!
//! Command, listener and keymap failures are never returned to callers, so
//! the log is the only place they show up. Useful targets:
//! - `keyway::commands` - failed handlers and native calls
//! - `keyway::events` - failing listeners
//! - `keyway::keymap` - bind/unbind, load/save failures, unbound chords
//! - `keyway::script` - `print` from scripts
//!
//! Console output goes to stderr and honours `RUST_LOG` (default `warn`),
//! e.g. `RUST_LOG=keyway::keymap=debug`. The file layer always records
//! debug level to `<config dir>/keyway/logs/keyway.log`, rotated daily.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use crate::config::paths;

/// Install the global subscriber. Call once, before the runtime starts.
pub fn init() {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    // stderr keeps the log out of the host's stdout
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(console_filter);

    tracing_subscriber::registry()
        .with(file_layer())
        .with(console_layer)
        .init();
}

fn file_layer() -> Option<impl Layer<Registry>> {
    let logs_dir = match paths::ensure_logs_dir() {
        Ok(dir) => dir,
        Err(err) => {
            // No subscriber yet, so this cannot go through tracing
            eprintln!("keyway: file logging disabled: {err}");
            return None;
        }
    };

    let appender = tracing_appender::rolling::daily(logs_dir, "keyway.log");
    Some(
        fmt::layer()
            .with_writer(appender)
            .with_ansi(false)
            .with_target(true)
            .with_line_number(true)
            .with_filter(EnvFilter::new("debug")),
    )
}
