//! editor::commands - register and run named commands
//!
//! Usage in Rhai:
//! ```rhai
//! editor::commands::register("buffer.greet", |args| "hello " + args.name);
//! editor::commands::exec("file.save", #{ path: "notes.txt" });
//! ```

use std::rc::Rc;

use rhai::{Array, Dynamic, EvalAltResult, Module};
use serde_json::{Map, Value};

use crate::commands::{CommandHandler, CommandRegistry};
use crate::scripting::context::{ScriptContext, from_dynamic, script_error, to_dynamic};

pub fn create_module(context: Rc<ScriptContext>, commands: Rc<CommandRegistry>) -> Module {
    let mut module = Module::new();

    // register(name: &str, handler: Fn) -> bool
    {
        let context = Rc::clone(&context);
        let commands = Rc::clone(&commands);
        module.set_native_fn(
            "register",
            move |name: &str, handler: Dynamic| -> Result<bool, Box<EvalAltResult>> {
                let registered = context.function(handler).and_then(|function| {
                    commands.register(name, CommandHandler::new(move |args| function.call(&args)))
                });
                match registered {
                    Ok(()) => Ok(true),
                    Err(err) => {
                        tracing::warn!(command = name, error = %err, "script command rejected");
                        Ok(false)
                    }
                }
            },
        );
    }

    // exec(name: &str, args) -> Dynamic
    {
        let commands = Rc::clone(&commands);
        module.set_native_fn(
            "exec",
            move |name: &str, args: Dynamic| -> Result<Dynamic, Box<EvalAltResult>> {
                let args = from_dynamic(&args).map_err(script_error)?;
                to_dynamic(&commands.exec(name, args)).map_err(script_error)
            },
        );
    }

    // exec(name: &str) -> Dynamic
    {
        let commands = Rc::clone(&commands);
        module.set_native_fn(
            "exec",
            move |name: &str| -> Result<Dynamic, Box<EvalAltResult>> {
                let out = commands.exec(name, Value::Object(Map::new()));
                to_dynamic(&out).map_err(script_error)
            },
        );
    }

    // has(name: &str) -> bool
    {
        let commands = Rc::clone(&commands);
        module.set_native_fn(
            "has",
            move |name: &str| -> Result<bool, Box<EvalAltResult>> { Ok(commands.contains(name)) },
        );
    }

    // list() -> Array
    module.set_native_fn("list", move || -> Result<Array, Box<EvalAltResult>> {
        Ok(commands.names().into_iter().map(Dynamic::from).collect())
    });

    module
}
