//! Publish/subscribe event bus keyed by event name.
//!
//! Listeners run in registration order. A failing listener is logged and
//! never stops the ones after it.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use serde_json::Value;

/// Emitted by the native core after a file was read into a buffer.
pub const FILE_LOADED: &str = "fileLoaded";
/// Emitted after a buffer was written to disk.
pub const FILE_SAVED: &str = "fileSaved";
/// Emitted by commands that want their execution observed.
pub const COMMAND_EXECUTED: &str = "commandExecuted";
/// Emitted when buffer contents change.
pub const BUFFER_CHANGED: &str = "bufferChanged";

/// A subscribed callback. Identity (`Rc::ptr_eq`) is what `off` matches on.
pub type Listener = Rc<dyn Fn(&Value) -> anyhow::Result<()>>;

/// Wrap a closure as a [`Listener`].
pub fn listener(f: impl Fn(&Value) -> anyhow::Result<()> + 'static) -> Listener {
    Rc::new(f)
}

#[derive(Clone)]
struct ListenerEntry {
    id: u64,
    callback: Listener,
    once: bool,
}

#[derive(Default)]
pub struct EventBus {
    listeners: RefCell<HashMap<String, Vec<ListenerEntry>>>,
    next_id: Cell<u64>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `callback` to `event`.
    pub fn on(&self, event: &str, callback: Listener) {
        self.insert(event, callback, false);
    }

    /// Subscribe `callback` for a single delivery of `event`.
    pub fn once(&self, event: &str, callback: Listener) {
        self.insert(event, callback, true);
    }

    /// Remove every registration of `callback` for `event`, one-shot ones included.
    pub fn off(&self, event: &str, callback: &Listener) {
        let mut listeners = self.listeners.borrow_mut();
        if let Some(entries) = listeners.get_mut(event) {
            entries.retain(|entry| !Rc::ptr_eq(&entry.callback, callback));
            if entries.is_empty() {
                listeners.remove(event);
            }
        }
    }

    /// Deliver `data` to every listener currently subscribed to `event`.
    pub fn emit(&self, event: &str, data: &Value) {
        // Snapshot so listeners may subscribe or unsubscribe while we iterate.
        let snapshot = match self.listeners.borrow().get(event) {
            Some(entries) => entries.clone(),
            None => return,
        };

        for entry in snapshot {
            // Skip anything removed since the snapshot, including by other listeners.
            if !self.take_if_present(event, &entry) {
                continue;
            }
            if let Err(err) = (entry.callback)(data) {
                tracing::error!(event, error = %err, "event listener failed");
            }
        }
    }

    /// Clear listeners for one event, or for every event when `event` is `None`.
    pub fn remove_all(&self, event: Option<&str>) {
        let mut listeners = self.listeners.borrow_mut();
        match event {
            Some(name) => {
                listeners.remove(name);
            }
            None => listeners.clear(),
        }
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.borrow().get(event).map_or(0, Vec::len)
    }

    /// Names that currently have at least one listener, sorted.
    pub fn event_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.listeners.borrow().keys().cloned().collect();
        names.sort();
        names
    }

    fn insert(&self, event: &str, callback: Listener, once: bool) {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.listeners
            .borrow_mut()
            .entry(event.to_string())
            .or_default()
            .push(ListenerEntry { id, callback, once });
    }

    /// Returns whether `entry` is still registered. One-shot entries are
    /// removed here, before their callback runs.
    fn take_if_present(&self, event: &str, entry: &ListenerEntry) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let Some(entries) = listeners.get_mut(event) else {
            return false;
        };
        let Some(pos) = entries.iter().position(|e| e.id == entry.id) else {
            return false;
        };
        if entry.once {
            entries.remove(pos);
            if entries.is_empty() {
                listeners.remove(event);
            }
        }
        true
    }
}
