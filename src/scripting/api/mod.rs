//! API modules for the `editor` namespace
//!
//! Each submodule provides functions under `editor::<module>::*`

pub mod commands;
pub mod config;
pub mod events;
pub mod keymap;
