//! editor::events - subscribe to and emit editor events
//!
//! Usage in Rhai:
//! ```rhai
//! editor::events::on("fileSaved", |info| print("saved " + info.path));
//! editor::events::emit("bufferChanged", #{ path: "notes.txt" });
//! ```

use std::rc::Rc;

use rhai::{Dynamic, EvalAltResult, FnPtr, Module};
use serde_json::Value;

use crate::events::EventBus;
use crate::scripting::context::{ScriptContext, from_dynamic, script_error};

pub fn create_module(context: Rc<ScriptContext>, events: Rc<EventBus>) -> Module {
    let mut module = Module::new();

    // on(event: &str, listener: Fn) -> bool
    {
        let context = Rc::clone(&context);
        let events = Rc::clone(&events);
        module.set_native_fn(
            "on",
            move |event: &str, listener: Dynamic| -> Result<bool, Box<EvalAltResult>> {
                Ok(subscribe(&context, event, listener, |l| events.on(event, l)))
            },
        );
    }

    // once(event: &str, listener: Fn) -> bool
    {
        let context = Rc::clone(&context);
        let events = Rc::clone(&events);
        module.set_native_fn(
            "once",
            move |event: &str, listener: Dynamic| -> Result<bool, Box<EvalAltResult>> {
                Ok(subscribe(&context, event, listener, |l| events.once(event, l)))
            },
        );
    }

    // off(event: &str, listener: Fn) -> bool
    // Removes every listener registered with a function of the same name.
    {
        let context = Rc::clone(&context);
        let events = Rc::clone(&events);
        module.set_native_fn(
            "off",
            move |event: &str, listener: Dynamic| -> Result<bool, Box<EvalAltResult>> {
                let Some(fn_ptr) = listener.try_cast::<FnPtr>() else {
                    return Ok(false);
                };
                let name = fn_ptr.fn_name();
                let listeners = context.listeners_named(name);
                let found = !listeners.is_empty();
                for l in &listeners {
                    events.off(event, l);
                }
                drop(listeners);
                context.prune(name);
                Ok(found)
            },
        );
    }

    // emit(event: &str, data)
    {
        let events = Rc::clone(&events);
        module.set_native_fn(
            "emit",
            move |event: &str, data: Dynamic| -> Result<(), Box<EvalAltResult>> {
                let data = from_dynamic(&data).map_err(script_error)?;
                events.emit(event, &data);
                Ok(())
            },
        );
    }

    // emit(event: &str)
    {
        let events = Rc::clone(&events);
        module.set_native_fn("emit", move |event: &str| -> Result<(), Box<EvalAltResult>> {
            events.emit(event, &Value::Null);
            Ok(())
        });
    }

    // remove_all(event: &str)
    {
        let events = Rc::clone(&events);
        module.set_native_fn(
            "remove_all",
            move |event: &str| -> Result<(), Box<EvalAltResult>> {
                events.remove_all(Some(event));
                Ok(())
            },
        );
    }

    // remove_all()
    {
        let events = Rc::clone(&events);
        module.set_native_fn("remove_all", move || -> Result<(), Box<EvalAltResult>> {
            events.remove_all(None);
            Ok(())
        });
    }

    // count(event: &str) -> i64
    module.set_native_fn("count", move |event: &str| -> Result<i64, Box<EvalAltResult>> {
        Ok(events.listener_count(event) as i64)
    });

    module
}

fn subscribe(
    context: &ScriptContext,
    event: &str,
    listener: Dynamic,
    add: impl FnOnce(crate::events::Listener),
) -> bool {
    match context.function(listener) {
        Ok(function) => {
            add(context.listener(function));
            true
        }
        Err(err) => {
            tracing::warn!(event, error = %err, "script listener rejected");
            false
        }
    }
}
