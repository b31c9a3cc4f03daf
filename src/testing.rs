//! In-memory stand-ins for the native core collaborators.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use futures::future::{FutureExt, LocalBoxFuture};

use crate::commands::NativeBridge;
use crate::fs::FileAccess;
use crate::input::{ChordCallback, InputSubsystem, KeyDown, KeyDownHandler};

pub struct RecordingBridge {
    calls: RefCell<Vec<(String, String)>>,
    response: Result<String, String>,
}

impl RecordingBridge {
    pub fn responding(response: &str) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            response: Ok(response.to_string()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            response: Err(message.to_string()),
        }
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.borrow().clone()
    }

    pub fn names(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|(n, _)| n.clone()).collect()
    }
}

impl NativeBridge for RecordingBridge {
    fn native_exec(&self, name: &str, args_json: &str) -> anyhow::Result<String> {
        self.calls
            .borrow_mut()
            .push((name.to_string(), args_json.to_string()));
        match &self.response {
            Ok(response) => Ok(response.clone()),
            Err(message) => Err(anyhow::anyhow!("{message}")),
        }
    }
}

/// Input subsystem that keeps chords verbatim and lets tests press them.
#[derive(Default)]
pub struct RecordingInput {
    chords: RefCell<HashMap<String, Rc<dyn Fn()>>>,
    key_down: RefCell<Vec<Rc<dyn Fn(&KeyDown)>>>,
}

impl RecordingInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire the callback bound to `chord`, returning whether one existed.
    pub fn press(&self, chord: &str) -> bool {
        let callback = self.chords.borrow().get(chord).cloned();
        match callback {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }

    pub fn key_down(&self, chord: &str) {
        let handlers = self.key_down.borrow().clone();
        let event = KeyDown {
            chord: chord.to_string(),
        };
        for handler in handlers {
            handler(&event);
        }
    }

    pub fn bound(&self) -> Vec<String> {
        let mut chords: Vec<String> = self.chords.borrow().keys().cloned().collect();
        chords.sort();
        chords
    }
}

impl InputSubsystem for RecordingInput {
    fn bind_chord(&self, chord: &str, on_trigger: ChordCallback) {
        self.chords
            .borrow_mut()
            .insert(chord.to_string(), Rc::from(on_trigger));
    }

    fn unbind_chord(&self, chord: &str) {
        self.chords.borrow_mut().remove(chord);
    }

    fn register_on_key_down(&self, handler: KeyDownHandler) {
        self.key_down.borrow_mut().push(Rc::from(handler));
    }
}

#[derive(Default)]
pub struct MemoryFiles {
    files: RefCell<HashMap<PathBuf, String>>,
}

impl MemoryFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: impl Into<PathBuf>, text: &str) {
        self.files.borrow_mut().insert(path.into(), text.to_string());
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files.borrow().get(path.as_ref()).cloned()
    }
}

impl FileAccess for MemoryFiles {
    fn load_text<'a>(&'a self, path: &'a Path) -> LocalBoxFuture<'a, anyhow::Result<String>> {
        async move {
            tokio::task::yield_now().await;
            self.get(path)
                .ok_or_else(|| anyhow::anyhow!("no such file: {}", path.display()))
        }
        .boxed_local()
    }

    fn save_text<'a>(
        &'a self,
        path: &'a Path,
        text: &'a str,
    ) -> LocalBoxFuture<'a, anyhow::Result<()>> {
        async move {
            tokio::task::yield_now().await;
            self.insert(path, text);
            Ok(())
        }
        .boxed_local()
    }
}
