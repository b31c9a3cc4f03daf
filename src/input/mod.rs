//! Boundary with the input-capture subsystem.
//!
//! The keymap never reads keys itself. It hands chords and callbacks to an
//! [`InputSubsystem`] and is called back when one of them is pressed.

pub mod chord;
mod terminal;

use serde::Deserialize;

pub use chord::Chord;
pub use terminal::TerminalInput;

/// A key-down notification. Producers may send more fields; only the
/// chord is read.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KeyDown {
    pub chord: String,
}

pub type ChordCallback = Box<dyn Fn()>;
pub type KeyDownHandler = Box<dyn Fn(&KeyDown)>;

pub trait InputSubsystem {
    /// Invoke `on_trigger` whenever `chord` is pressed. Binding a chord
    /// again replaces the earlier callback.
    fn bind_chord(&self, chord: &str, on_trigger: ChordCallback);

    /// Stop delivering `chord`. Subsystems that cannot unbind may ignore this.
    fn unbind_chord(&self, chord: &str) {
        let _ = chord;
    }

    fn register_on_key_down(&self, handler: KeyDownHandler);
}
