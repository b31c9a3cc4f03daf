use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crossterm::event::{Event, KeyEvent, KeyEventKind};

use super::{Chord, ChordCallback, InputSubsystem, KeyDown, KeyDownHandler};

/// Input subsystem fed by crossterm terminal events.
///
/// A pressed chord goes to its bound callback if there is one. Otherwise it
/// is offered to every key-down handler.
#[derive(Default)]
pub struct TerminalInput {
    chords: RefCell<HashMap<String, Rc<dyn Fn()>>>,
    key_down: RefCell<Vec<Rc<dyn Fn(&KeyDown)>>>,
}

impl TerminalInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route a terminal event. Returns whether anything received it.
    pub fn handle_event(&self, event: &Event) -> bool {
        match event {
            Event::Key(key) => self.handle_key(key),
            // Resize, mouse and focus events belong to the native core
            _ => false,
        }
    }

    fn handle_key(&self, key: &KeyEvent) -> bool {
        if key.kind != KeyEventKind::Press {
            return false;
        }
        self.deliver(&Chord::from_key_event(key).to_string())
    }

    /// Deliver `chord` as if it had been pressed.
    pub fn deliver(&self, chord: &str) -> bool {
        let chord = Chord::normalize(chord);

        // Clone callbacks out: they may bind or unbind chords while running.
        let bound = self.chords.borrow().get(&chord).cloned();
        if let Some(callback) = bound {
            callback();
            return true;
        }

        let handlers = self.key_down.borrow().clone();
        if handlers.is_empty() {
            return false;
        }
        let event = KeyDown { chord };
        for handler in handlers {
            handler(&event);
        }
        true
    }

    pub fn is_bound(&self, chord: &str) -> bool {
        self.chords.borrow().contains_key(&Chord::normalize(chord))
    }
}

impl InputSubsystem for TerminalInput {
    fn bind_chord(&self, chord: &str, on_trigger: ChordCallback) {
        self.chords
            .borrow_mut()
            .insert(Chord::normalize(chord), Rc::from(on_trigger));
    }

    fn unbind_chord(&self, chord: &str) {
        self.chords.borrow_mut().remove(&Chord::normalize(chord));
    }

    fn register_on_key_down(&self, handler: KeyDownHandler) {
        self.key_down.borrow_mut().push(Rc::from(handler));
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use crossterm::event::{KeyCode, KeyModifiers};

    use super::*;

    fn counter() -> (Rc<Cell<u32>>, ChordCallback) {
        let hits = Rc::new(Cell::new(0));
        let sink = Rc::clone(&hits);
        (hits, Box::new(move || sink.set(sink.get() + 1)))
    }

    #[test]
    fn bound_chord_fires_from_key_event() {
        let input = TerminalInput::new();
        let (hits, callback) = counter();
        input.bind_chord("ctrl+s", callback);

        let event = Event::Key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL));
        assert!(input.handle_event(&event));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn key_release_is_ignored() {
        let input = TerminalInput::new();
        let (hits, callback) = counter();
        input.bind_chord("Ctrl+S", callback);

        let event = Event::Key(KeyEvent::new_with_kind(
            KeyCode::Char('s'),
            KeyModifiers::CONTROL,
            KeyEventKind::Release,
        ));
        assert!(!input.handle_event(&event));
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn unbound_chord_goes_to_key_down_handlers() {
        let input = TerminalInput::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        input.register_on_key_down(Box::new(move |ev| sink.borrow_mut().push(ev.chord.clone())));

        assert!(input.deliver("alt+x"));
        assert_eq!(*seen.borrow(), vec!["Alt+X".to_string()]);
    }

    #[test]
    fn unbind_chord_stops_delivery() {
        let input = TerminalInput::new();
        let (hits, callback) = counter();
        input.bind_chord("F5", callback);
        input.unbind_chord("f5");

        assert!(!input.is_bound("F5"));
        assert!(!input.deliver("F5"));
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn callback_may_rebind_while_running() {
        let input = Rc::new(TerminalInput::new());
        let weak = Rc::downgrade(&input);
        input.bind_chord(
            "Ctrl+K",
            Box::new(move || {
                if let Some(input) = weak.upgrade() {
                    input.unbind_chord("Ctrl+K");
                    input.bind_chord("Ctrl+J", Box::new(|| {}));
                }
            }),
        );

        assert!(input.deliver("Ctrl+K"));
        assert!(input.is_bound("Ctrl+J"));
        assert!(!input.is_bound("Ctrl+K"));
    }
}
