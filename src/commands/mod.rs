//! Named commands, resolved locally or delegated to the native core.

mod native;
mod registry;

pub use native::{NativeBridge, NullBridge};
pub use registry::{CommandHandler, CommandRegistry, CommandResult, Completion};
