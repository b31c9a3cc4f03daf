/// Boundary call into the native core for commands with no local handler.
///
/// Arguments and response both travel as JSON text. An empty response means
/// "no result".
pub trait NativeBridge {
    fn native_exec(&self, name: &str, args_json: &str) -> anyhow::Result<String>;
}

/// Bridge used when no native core is attached. Every call succeeds with an
/// empty response.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullBridge;

impl NativeBridge for NullBridge {
    fn native_exec(&self, name: &str, args_json: &str) -> anyhow::Result<String> {
        tracing::debug!(command = name, args = args_json, "no native core attached");
        Ok(String::new())
    }
}
