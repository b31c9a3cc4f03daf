//! One runtime instance: the three tables, the script engine and the
//! startup/shutdown sequence that ties them to the native collaborators.

use std::future::Future;
use std::path::Path;
use std::rc::{Rc, Weak};
use std::sync::{Arc, RwLock};

use serde_json::Value;

use crate::commands::{CommandHandler, CommandRegistry, NativeBridge};
use crate::config::Settings;
use crate::events::EventBus;
use crate::fs::FileAccess;
use crate::input::InputSubsystem;
use crate::keymap::Keymap;
use crate::scripting::{ScriptEngine, ScriptTables};

/// Reloads the configured keymap document.
pub const KEYMAP_RELOAD: &str = "keymap.reload";
/// Writes the current bindings to the configured keymap document.
pub const KEYMAP_SAVE: &str = "keymap.save";

pub struct Runtime {
    commands: Rc<CommandRegistry>,
    events: Rc<EventBus>,
    keymap: Rc<Keymap>,
    scripts: ScriptEngine,
    settings: Arc<RwLock<Settings>>,
}

impl Runtime {
    pub fn new(
        bridge: Rc<dyn NativeBridge>,
        input: Rc<dyn InputSubsystem>,
        files: Rc<dyn FileAccess>,
    ) -> Self {
        Self::with_settings(bridge, input, files, Settings::default())
    }

    pub fn with_settings(
        bridge: Rc<dyn NativeBridge>,
        input: Rc<dyn InputSubsystem>,
        files: Rc<dyn FileAccess>,
        settings: Settings,
    ) -> Self {
        let settings = Arc::new(RwLock::new(settings));
        let commands = Rc::new(CommandRegistry::new(bridge));
        let events = Rc::new(EventBus::new());
        let keymap = Keymap::new(Rc::clone(&commands), input, files);
        let scripts = ScriptEngine::new(ScriptTables {
            commands: Rc::clone(&commands),
            events: Rc::clone(&events),
            keymap: Rc::clone(&keymap),
            settings: Arc::clone(&settings),
        });

        let runtime = Self {
            commands,
            events,
            keymap,
            scripts,
            settings,
        };
        runtime.register_builtins();
        runtime
    }

    pub fn commands(&self) -> &Rc<CommandRegistry> {
        &self.commands
    }

    pub fn events(&self) -> &Rc<EventBus> {
        &self.events
    }

    pub fn keymap(&self) -> &Rc<Keymap> {
        &self.keymap
    }

    pub fn scripts(&self) -> &ScriptEngine {
        &self.scripts
    }

    /// Current settings (cloned)
    pub fn settings(&self) -> Settings {
        self.settings.read().map(|s| s.clone()).unwrap_or_default()
    }

    /// Evaluate the init script, hook the keymap up to the input subsystem
    /// and load the configured keymap document.
    ///
    /// `init_script` overrides the configured script, which must then exist.
    /// Nothing here fails: script and keymap problems are logged and startup
    /// carries on with whatever state was reached.
    pub async fn start(&self, init_script: Option<&Path>) {
        let evaluated = match init_script {
            Some(path) => self.scripts.load_file(path),
            None => self.scripts.load_if_present(&self.settings().init_script),
        };
        if let Err(err) = evaluated {
            tracing::error!(error = %err, "init script failed");
        }

        self.keymap.attach();

        // Read after the script ran: it may have moved the keymap file.
        let keymap_file = self.settings().keymap_file;
        self.keymap.load(&keymap_file).await;
        tracing::info!(
            commands = self.commands.len(),
            bindings = self.keymap.len(),
            "runtime started"
        );
    }

    pub async fn shutdown(&self) {
        let settings = self.settings();
        if settings.save_keymap_on_exit {
            self.keymap.save(&settings.keymap_file).await;
        }
        tracing::info!("runtime stopped");
    }

    /// Drive `fut` to completion while also making progress on command
    /// handlers that were started without being awaited.
    pub async fn run_until<F: Future>(&self, fut: F) -> F::Output {
        self.commands.tasks().run_until(fut).await
    }

    fn register_builtins(&self) {
        let builtins = [
            (KEYMAP_RELOAD, self.keymap_command(false)),
            (KEYMAP_SAVE, self.keymap_command(true)),
        ];
        for (name, handler) in builtins {
            if let Err(err) = self.commands.register(name, handler) {
                tracing::error!(command = name, error = %err, "builtin rejected");
            }
        }
    }

    // Weak: the registry is owned by the keymap, a strong handle would cycle.
    fn keymap_command(&self, save: bool) -> CommandHandler {
        let keymap: Weak<Keymap> = Rc::downgrade(&self.keymap);
        let settings = Arc::clone(&self.settings);
        CommandHandler::new_async(move |_| {
            let keymap = keymap.upgrade();
            let path = settings
                .read()
                .map(|s| s.keymap_file.clone())
                .unwrap_or_default();
            async move {
                let Some(keymap) = keymap else {
                    anyhow::bail!("keymap has been dropped");
                };
                let ok = if save {
                    keymap.save(&path).await
                } else {
                    keymap.load(&path).await
                };
                Ok(Value::Bool(ok))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use serde_json::json;

    use super::*;
    use crate::testing::{MemoryFiles, RecordingBridge, RecordingInput};

    struct Fixture {
        bridge: Rc<RecordingBridge>,
        input: Rc<RecordingInput>,
        files: Rc<MemoryFiles>,
        runtime: Runtime,
    }

    fn fixture(settings: Settings) -> Fixture {
        let bridge = Rc::new(RecordingBridge::responding(""));
        let input = Rc::new(RecordingInput::new());
        let files = Rc::new(MemoryFiles::new());
        let runtime =
            Runtime::with_settings(bridge.clone(), input.clone(), files.clone(), settings);
        Fixture {
            bridge,
            input,
            files,
            runtime,
        }
    }

    fn settings_in(dir: &Path) -> Settings {
        Settings {
            keymap_file: dir.join("keymaps").join("default.json"),
            init_script: dir.join("init.rhai"),
            save_keymap_on_exit: false,
        }
    }

    #[tokio::test]
    async fn start_loads_keymap_chosen_by_init_script() {
        let dir = tempfile::tempdir().unwrap();
        let custom = dir.path().join("custom.json");
        let script = dir.path().join("init.rhai");
        std::fs::write(
            &script,
            format!(
                r#"
                editor::config::set_keymap_file("{}");
                editor::commands::register("buffer.save", |args| editor::commands::exec("native.write"));
                "#,
                custom.display().to_string().replace('\\', "\\\\")
            ),
        )
        .unwrap();

        let f = fixture(settings_in(dir.path()));
        f.files.insert(&custom, r#"{ "Ctrl+S": "buffer.save" }"#);
        f.runtime.start(None).await;

        assert_eq!(f.runtime.keymap().get("Ctrl+S").as_deref(), Some("buffer.save"));
        assert!(f.input.press("Ctrl+S"));
        assert_eq!(f.bridge.names(), vec!["native.write"]);
    }

    #[tokio::test]
    async fn missing_init_script_still_loads_keymap() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(dir.path());
        let f = fixture(settings.clone());
        f.files.insert(&settings.keymap_file, r#"{ "F5": "build.run" }"#);

        f.runtime.start(Some(&dir.path().join("absent.rhai"))).await;
        assert_eq!(f.runtime.keymap().len(), 1);

        f.input.key_down("F5");
        assert_eq!(f.bridge.names(), vec!["build.run"]);
    }

    #[tokio::test]
    async fn broken_init_script_does_not_stop_startup() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(dir.path());
        std::fs::write(&settings.init_script, "let = ;").unwrap();
        let f = fixture(settings.clone());
        f.files.insert(&settings.keymap_file, r#"{ "Ctrl+Q": "editor.quit" }"#);

        f.runtime.start(None).await;
        assert!(f.runtime.keymap().trigger("Ctrl+Q"));
        assert_eq!(f.bridge.names(), vec!["editor.quit"]);
    }

    #[tokio::test]
    async fn shutdown_saves_only_when_enabled() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = settings_in(dir.path());
        let f = fixture(settings.clone());
        f.runtime.keymap().bind("Ctrl+S", "file.save");
        f.runtime.shutdown().await;
        assert_eq!(f.files.get(&settings.keymap_file), None);

        settings.save_keymap_on_exit = true;
        let f = fixture(settings.clone());
        f.runtime.keymap().bind("Ctrl+S", "file.save");
        f.runtime.shutdown().await;
        let saved: Value =
            serde_json::from_str(&f.files.get(&settings.keymap_file).unwrap()).unwrap();
        assert_eq!(saved, json!({ "Ctrl+S": "file.save" }));
    }

    #[tokio::test]
    async fn keymap_builtins_run_locally() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(dir.path());
        let f = fixture(settings.clone());
        f.runtime.keymap().bind("Ctrl+O", "file.open");

        let saved = f.runtime.commands().run(KEYMAP_SAVE, json!({})).await;
        assert_eq!(saved, json!(true));

        f.runtime.keymap().unbind("Ctrl+O");
        let reloaded = f.runtime.commands().run(KEYMAP_RELOAD, json!({})).await;
        assert_eq!(reloaded, json!(true));
        assert_eq!(f.runtime.keymap().get("Ctrl+O").as_deref(), Some("file.open"));
        assert!(f.bridge.calls().is_empty());
    }

    #[tokio::test]
    async fn triggered_builtin_completes_on_task_set() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(dir.path());
        let f = fixture(settings.clone());
        f.runtime.keymap().bind("Ctrl+Alt+S", KEYMAP_SAVE);

        assert!(f.runtime.keymap().trigger("Ctrl+Alt+S"));
        assert_eq!(f.files.get(&settings.keymap_file), None);

        let path: PathBuf = settings.keymap_file.clone();
        let files = Rc::clone(&f.files);
        f.runtime
            .run_until(async move {
                while files.get(&path).is_none() {
                    tokio::task::yield_now().await;
                }
            })
            .await;
        assert!(f.files.get(&settings.keymap_file).unwrap().contains("Ctrl+Alt+S"));
    }
}
