//! editor::keymap - chord bindings
//!
//! Usage in Rhai:
//! ```rhai
//! editor::keymap::bind("Ctrl+S", "file.save");
//! editor::keymap::unbind("Ctrl+W");
//! ```

use std::rc::Rc;

use rhai::{Dynamic, EvalAltResult, Map, Module};

use crate::keymap::Keymap;

pub fn create_module(keymap: Rc<Keymap>) -> Module {
    let mut module = Module::new();

    // bind(chord: &str, command: &str)
    {
        let keymap = Rc::clone(&keymap);
        module.set_native_fn(
            "bind",
            move |chord: &str, command: &str| -> Result<(), Box<EvalAltResult>> {
                keymap.bind(chord, command);
                Ok(())
            },
        );
    }

    // unbind(chord: &str)
    {
        let keymap = Rc::clone(&keymap);
        module.set_native_fn("unbind", move |chord: &str| -> Result<(), Box<EvalAltResult>> {
            keymap.unbind(chord);
            Ok(())
        });
    }

    // trigger(chord: &str) -> bool
    {
        let keymap = Rc::clone(&keymap);
        module.set_native_fn(
            "trigger",
            move |chord: &str| -> Result<bool, Box<EvalAltResult>> { Ok(keymap.trigger(chord)) },
        );
    }

    // get(chord: &str) -> String or ()
    {
        let keymap = Rc::clone(&keymap);
        module.set_native_fn("get", move |chord: &str| -> Result<Dynamic, Box<EvalAltResult>> {
            Ok(keymap.get(chord).map(Dynamic::from).unwrap_or(Dynamic::UNIT))
        });
    }

    // bindings() -> Map
    {
        let keymap = Rc::clone(&keymap);
        module.set_native_fn("bindings", move || -> Result<Map, Box<EvalAltResult>> {
            Ok(keymap
                .bindings()
                .into_iter()
                .map(|(chord, command)| (chord.into(), Dynamic::from(command)))
                .collect())
        });
    }

    // apply_all()
    module.set_native_fn("apply_all", move || -> Result<(), Box<EvalAltResult>> {
        keymap.apply_all();
        Ok(())
    });

    module
}
