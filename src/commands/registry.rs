use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::rc::Rc;

use futures::future::{FutureExt, LocalBoxFuture};
use serde_json::{Map, Value};
use tokio::task::LocalSet;

use super::NativeBridge;
use crate::error::RuntimeError;

pub type CommandResult = anyhow::Result<Value>;

/// What a handler hands back when invoked.
pub enum Completion {
    Ready(CommandResult),
    Pending(LocalBoxFuture<'static, CommandResult>),
}

/// A locally defined command. Cheap to clone.
#[derive(Clone)]
pub struct CommandHandler(Rc<dyn Fn(Value) -> Completion>);

impl CommandHandler {
    /// A handler that completes before returning.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Value) -> CommandResult + 'static,
    {
        Self(Rc::new(move |args| Completion::Ready(f(args))))
    }

    /// A handler whose result arrives later.
    pub fn new_async<F, Fut>(f: F) -> Self
    where
        F: Fn(Value) -> Fut + 'static,
        Fut: Future<Output = CommandResult> + 'static,
    {
        Self(Rc::new(move |args| Completion::Pending(f(args).boxed_local())))
    }

    pub fn invoke(&self, args: Value) -> Completion {
        (self.0)(args)
    }
}

/// Command handler table plus the native fallback.
///
/// Lookup is two-tier: a name in the table always runs locally, anything
/// else is sent through the [`NativeBridge`]. Failures on either side are
/// logged and turn into `Value::Null`.
pub struct CommandRegistry {
    handlers: RefCell<HashMap<String, CommandHandler>>,
    bridge: Rc<dyn NativeBridge>,
    tasks: LocalSet,
}

impl CommandRegistry {
    pub fn new(bridge: Rc<dyn NativeBridge>) -> Self {
        Self {
            handlers: RefCell::new(HashMap::new()),
            bridge,
            tasks: LocalSet::new(),
        }
    }

    /// Register `handler` under `name`, replacing any previous handler.
    pub fn register(&self, name: &str, handler: CommandHandler) -> Result<(), RuntimeError> {
        if name.trim().is_empty() {
            return Err(RuntimeError::Validation(
                "command name must be a non-empty string".to_string(),
            ));
        }
        let replaced = self
            .handlers
            .borrow_mut()
            .insert(name.to_string(), handler)
            .is_some();
        tracing::debug!(command = name, replaced, "command registered");
        Ok(())
    }

    pub fn unregister(&self, name: &str) -> bool {
        self.handlers.borrow_mut().remove(name).is_some()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.borrow().contains_key(name)
    }

    /// Locally registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.borrow().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.handlers.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.borrow().is_empty()
    }

    /// Task set that detached handlers started by [`exec`](Self::exec) run on.
    /// It only makes progress while driven, e.g. through `run_until`.
    pub fn tasks(&self) -> &LocalSet {
        &self.tasks
    }

    /// Run `name`, awaiting the handler if it completes later.
    pub async fn run(&self, name: &str, args: Value) -> Value {
        let Some(handler) = self.local(name) else {
            return self.native(name, &args);
        };
        let outcome = match handler.invoke(args) {
            Completion::Ready(result) => result,
            Completion::Pending(fut) => fut.await,
        };
        settle(name, outcome)
    }

    /// Run `name` without suspending.
    ///
    /// A handler that completes later is spawned onto [`tasks`](Self::tasks)
    /// and this returns `Value::Null` straight away; its outcome is only
    /// visible in the log.
    pub fn exec(&self, name: &str, args: Value) -> Value {
        let Some(handler) = self.local(name) else {
            return self.native(name, &args);
        };
        match handler.invoke(args) {
            Completion::Ready(result) => settle(name, result),
            Completion::Pending(fut) => {
                self.detach(name, fut);
                Value::Null
            }
        }
    }

    // Cloned out so the table is not borrowed while the handler runs.
    fn local(&self, name: &str) -> Option<CommandHandler> {
        self.handlers.borrow().get(name).cloned()
    }

    fn detach(&self, name: &str, fut: LocalBoxFuture<'static, CommandResult>) {
        let name = name.to_string();
        self.tasks.spawn_local(async move {
            settle(&name, fut.await);
        });
    }

    fn native(&self, name: &str, args: &Value) -> Value {
        let result = serde_json::to_string(args)
            .map_err(anyhow::Error::from)
            .and_then(|json| self.bridge.native_exec(name, &json))
            .and_then(|response| parse_response(&response));
        settle(name, result)
    }
}

fn parse_response(response: &str) -> CommandResult {
    if response.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    Ok(serde_json::from_str(response)?)
}

fn settle(name: &str, result: CommandResult) -> Value {
    match result {
        Ok(value) => value,
        Err(source) => {
            let err = RuntimeError::command(name, source);
            tracing::error!(command = name, error = %err, "command failed");
            Value::Null
        }
    }
}
