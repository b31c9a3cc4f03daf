use std::cell::Cell;
use std::env;
use std::path::PathBuf;
use std::rc::Rc;

use crossterm::event::{Event, EventStream, KeyCode, KeyModifiers};
use crossterm::terminal;
use futures::StreamExt;
use serde_json::Value;

use keyway::commands::{CommandHandler, NullBridge};
use keyway::events::COMMAND_EXECUTED;
use keyway::fs::FsFiles;
use keyway::input::TerminalInput;
use keyway::{Runtime, logging};

const QUIT: &str = "editor.quit";
const QUIT_CHORD: &str = "Ctrl+Q";

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    logging::init();

    // Optional init script overriding the one in the config directory
    let init_script = env::args().nth(1).map(PathBuf::from);

    let input = Rc::new(TerminalInput::new());
    let runtime = Runtime::new(Rc::new(NullBridge), input.clone(), Rc::new(FsFiles));

    let running = Rc::new(Cell::new(true));
    {
        let running = Rc::clone(&running);
        let events = Rc::clone(runtime.events());
        runtime.commands().register(
            QUIT,
            CommandHandler::new(move |_| {
                running.set(false);
                events.emit(COMMAND_EXECUTED, &serde_json::json!({ "name": QUIT }));
                Ok(Value::Null)
            }),
        )?;
    }

    runtime
        .run_until(async {
            runtime.start(init_script.as_deref()).await;
            if runtime.keymap().get(QUIT_CHORD).is_none() {
                runtime.keymap().bind(QUIT_CHORD, QUIT);
            }

            terminal::enable_raw_mode()?;
            let result = event_loop(&input, &running).await;
            terminal::disable_raw_mode()?;

            runtime.shutdown().await;
            result
        })
        .await
}

async fn event_loop(input: &TerminalInput, running: &Cell<bool>) -> anyhow::Result<()> {
    // Event stream for async key reading
    let mut event_stream = EventStream::new();

    while running.get() {
        let Some(event) = event_stream.next().await else {
            break;
        };
        let event = event?;
        if is_interrupt(&event) {
            break;
        }
        input.handle_event(&event);
    }
    Ok(())
}

// Raw mode swallows SIGINT, keep Ctrl+C as a way out.
fn is_interrupt(event: &Event) -> bool {
    matches!(
        event,
        Event::Key(key) if key.code == KeyCode::Char('c') && key.modifiers == KeyModifiers::CONTROL
    )
}
