//! Chord to command-name bindings, persisted as a flat JSON object.
//!
//! Chords are keyed by their canonical form (`ctrl+s` and `Ctrl+S` are one
//! entry); text that does not parse as a chord is kept as written.
//!
//! ```json
//! {
//!   "Ctrl+S": "file.save",
//!   "Ctrl+Shift+P": "palette.open"
//! }
//! ```

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::path::Path;
use std::rc::{Rc, Weak};

use serde_json::{Map, Value};

use crate::commands::CommandRegistry;
use crate::error::RuntimeError;
use crate::fs::FileAccess;
use crate::input::{Chord, InputSubsystem};

pub type Bindings = BTreeMap<String, String>;

pub struct Keymap {
    me: Weak<Keymap>,
    bindings: RefCell<Bindings>,
    attached: Cell<bool>,
    commands: Rc<CommandRegistry>,
    input: Rc<dyn InputSubsystem>,
    files: Rc<dyn FileAccess>,
}

impl Keymap {
    pub fn new(
        commands: Rc<CommandRegistry>,
        input: Rc<dyn InputSubsystem>,
        files: Rc<dyn FileAccess>,
    ) -> Rc<Self> {
        Rc::new_cyclic(|me| Self {
            me: me.clone(),
            bindings: RefCell::new(Bindings::new()),
            attached: Cell::new(false),
            commands,
            input,
            files,
        })
    }

    /// Replace the table with the document at `path` and re-apply it.
    ///
    /// On any failure the current table is kept and `false` is returned.
    pub async fn load(&self, path: &Path) -> bool {
        let loaded = match self.read(path).await {
            Ok(bindings) => bindings,
            Err(source) => {
                let err = RuntimeError::persistence(path, source);
                tracing::error!(error = %err, "failed to load keymap");
                return false;
            }
        };

        // The table may have changed while we were reading.
        let stale: Vec<String> = self
            .bindings
            .borrow()
            .keys()
            .filter(|chord| !loaded.contains_key(*chord))
            .cloned()
            .collect();
        for chord in &stale {
            self.input.unbind_chord(chord);
        }

        let count = loaded.len();
        *self.bindings.borrow_mut() = loaded;
        tracing::info!(path = %path.display(), count, "keymap loaded");
        self.apply_all();
        true
    }

    /// Write the current table to `path`. Returns `false` on failure.
    pub async fn save(&self, path: &Path) -> bool {
        let text = serde_json::to_string_pretty(&*self.bindings.borrow());
        let result = match text {
            Ok(text) => self.files.save_text(path, &text).await,
            Err(err) => Err(err.into()),
        };
        match result {
            Ok(()) => {
                tracing::info!(path = %path.display(), "keymap saved");
                true
            }
            Err(source) => {
                let err = RuntimeError::persistence(path, source);
                tracing::error!(error = %err, "failed to save keymap");
                false
            }
        }
    }

    pub fn bind(&self, chord: &str, command: &str) {
        let chord = Chord::normalize(chord);
        self.bindings
            .borrow_mut()
            .insert(chord.clone(), command.to_string());
        self.register_chord(&chord);
        tracing::debug!(chord = %chord, command, "chord bound");
    }

    pub fn unbind(&self, chord: &str) {
        let chord = Chord::normalize(chord);
        if self.bindings.borrow_mut().remove(&chord).is_some() {
            self.input.unbind_chord(&chord);
            tracing::debug!(chord = %chord, "chord unbound");
        }
    }

    /// Register every chord in the table with the input subsystem.
    pub fn apply_all(&self) {
        let chords: Vec<String> = self.bindings.borrow().keys().cloned().collect();
        for chord in &chords {
            self.register_chord(chord);
        }
        tracing::debug!(count = chords.len(), "keymap applied");
    }

    /// Dispatch the command bound to `chord`. Returns whether one was bound.
    ///
    /// Uses the non-suspending [`CommandRegistry::exec`], so async handlers
    /// are started but not waited for.
    pub fn trigger(&self, chord: &str) -> bool {
        let command = self.get(chord);
        let Some(command) = command else {
            tracing::warn!(chord, "no command bound");
            return false;
        };
        tracing::debug!(chord, command = %command, "triggering");
        self.commands.exec(&command, Value::Object(Map::new()));
        true
    }

    /// Forward key-down events from the input subsystem to [`trigger`](Self::trigger).
    /// Only the first call registers a handler.
    pub fn attach(&self) {
        if self.attached.replace(true) {
            return;
        }
        let me = self.me.clone();
        self.input.register_on_key_down(Box::new(move |event| {
            if let Some(keymap) = me.upgrade() {
                keymap.trigger(&event.chord);
            }
        }));
    }

    pub fn get(&self, chord: &str) -> Option<String> {
        self.bindings.borrow().get(&Chord::normalize(chord)).cloned()
    }

    pub fn bindings(&self) -> Bindings {
        self.bindings.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.bindings.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.borrow().is_empty()
    }

    async fn read(&self, path: &Path) -> anyhow::Result<Bindings> {
        let text = self.files.load_text(path).await?;
        let document: Bindings = serde_json::from_str(&text)?;
        Ok(document
            .into_iter()
            .map(|(chord, command)| (Chord::normalize(&chord), command))
            .collect())
    }

    // The callback resolves the chord at press time so rebinding never
    // leaves a stale command behind.
    fn register_chord(&self, chord: &str) {
        let me = self.me.clone();
        let key = chord.to_string();
        self.input.bind_chord(
            chord,
            Box::new(move || {
                if let Some(keymap) = me.upgrade() {
                    keymap.trigger(&key);
                }
            }),
        );
    }
}
