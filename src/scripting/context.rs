use std::cell::{OnceCell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use anyhow::anyhow;
use rhai::{AST, Dynamic, Engine, EvalAltResult, FnPtr};
use serde_json::Value;

use crate::error::RuntimeError;
use crate::events::Listener;

/// State shared between the engine and the native functions it exposes.
#[derive(Default)]
pub(crate) struct ScriptContext {
    engine: OnceCell<Weak<Engine>>,
    ast: RefCell<Option<Rc<AST>>>,
    // Every listener handed to the bus, by function name, so `off` can find
    // what `on`/`once` registered. Only the name is matched: curried values
    // and the defining script are not compared.
    listeners: RefCell<HashMap<String, Vec<Listener>>>,
}

impl ScriptContext {
    pub fn attach(&self, engine: &Rc<Engine>) {
        let _ = self.engine.set(Rc::downgrade(engine));
    }

    pub fn set_ast(&self, ast: Rc<AST>) {
        *self.ast.borrow_mut() = Some(ast);
    }

    /// Resolve a script value into a callable bound to the script that is
    /// being evaluated.
    pub fn function(&self, value: Dynamic) -> Result<ScriptFn, RuntimeError> {
        let type_name = value.type_name();
        let fn_ptr = value.try_cast::<FnPtr>().ok_or_else(|| {
            RuntimeError::Validation(format!("expected a function, got {type_name}"))
        })?;
        let engine = self
            .engine
            .get()
            .cloned()
            .ok_or_else(|| RuntimeError::Script("engine not attached".to_string()))?;
        let ast = self
            .ast
            .borrow()
            .clone()
            .ok_or_else(|| RuntimeError::Script("no script has been evaluated".to_string()))?;
        Ok(ScriptFn {
            fn_ptr,
            ast,
            engine,
        })
    }

    /// A new listener calling `function`. Each call yields a distinct
    /// listener, even for the same function.
    pub fn listener(&self, function: ScriptFn) -> Listener {
        let name = function.name().to_string();
        // Drop fired one-shot listeners before adding another.
        self.prune(&name);
        let listener: Listener = Rc::new(move |data: &Value| function.call(data).map(|_| ()));
        self.listeners
            .borrow_mut()
            .entry(name)
            .or_default()
            .push(Rc::clone(&listener));
        listener
    }

    /// Every listener created for the function called `name`.
    pub fn listeners_named(&self, name: &str) -> Vec<Listener> {
        self.listeners.borrow().get(name).cloned().unwrap_or_default()
    }

    /// Forget listeners the bus no longer holds.
    pub fn prune(&self, name: &str) {
        let mut listeners = self.listeners.borrow_mut();
        if let Some(entries) = listeners.get_mut(name) {
            entries.retain(|l| Rc::strong_count(l) > 1);
            if entries.is_empty() {
                listeners.remove(name);
            }
        }
    }
}

/// A script function plus the AST that defines it.
pub(crate) struct ScriptFn {
    fn_ptr: FnPtr,
    ast: Rc<AST>,
    engine: Weak<Engine>,
}

impl ScriptFn {
    pub fn name(&self) -> &str {
        self.fn_ptr.fn_name()
    }

    pub fn call(&self, args: &Value) -> anyhow::Result<Value> {
        let engine = self
            .engine
            .upgrade()
            .ok_or_else(|| anyhow!("script engine has been dropped"))?;
        let arg = to_dynamic(args)?;
        let out: Dynamic = self
            .fn_ptr
            .call(&engine, &self.ast, (arg,))
            .map_err(|e| anyhow!("{}: {e}", self.name()))?;
        from_dynamic(&out)
    }
}

pub(crate) fn to_dynamic(value: &Value) -> anyhow::Result<Dynamic> {
    rhai::serde::to_dynamic(value).map_err(|e| anyhow!("{e}"))
}

pub(crate) fn from_dynamic(value: &Dynamic) -> anyhow::Result<Value> {
    rhai::serde::from_dynamic(value).map_err(|e| anyhow!("{e}"))
}

/// Surface a Rust-side failure to the script as a runtime error.
pub(crate) fn script_error(err: impl std::fmt::Display) -> Box<EvalAltResult> {
    err.to_string().into()
}
