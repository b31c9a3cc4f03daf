//! Runtime settings and well-known paths.

pub mod paths;
mod settings;

pub use settings::Settings;
