//! Scripting-side runtime for an editor whose buffers, rendering and input
//! capture live in a native core.
//!
//! A [`Runtime`] owns three tables: named commands ([`commands`]), event
//! listeners ([`events`]) and chord bindings ([`keymap`]). Chords pressed in
//! the input subsystem resolve to command names, command names resolve to a
//! local handler or fall through to the native core, and handlers report
//! what they did on the event bus.

pub mod commands;
pub mod config;
pub mod error;
pub mod events;
pub mod fs;
pub mod input;
pub mod keymap;
pub mod logging;
pub mod runtime;
pub mod scripting;

#[cfg(test)]
mod testing;

pub use error::RuntimeError;
pub use runtime::Runtime;
