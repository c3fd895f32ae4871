//! Interactive dashboard.
//!
//! Terminal events are read on a dedicated thread and forwarded over a
//! channel, so the async loop only ever waits on two sources: key/resize
//! events and the engine's own events.

mod input;
mod ui;

use std::io::{self, Stdout};
use std::thread;
use std::time::Duration;

use crossterm::{
    cursor,
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use portscope_core::SystemEngine;
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{debug, warn};

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// How long the input thread blocks before checking whether to exit.
const INPUT_POLL_INTERVAL: Duration = Duration::from_millis(200);

enum Step {
    Input(Event),
    Engine(portscope_core::EngineEvent),
}

/// Run the dashboard until the user quits.
pub async fn run(mut engine: SystemEngine) -> anyhow::Result<()> {
    install_panic_hook();
    let mut terminal = setup_terminal()?;

    let result = event_loop(&mut terminal, &mut engine).await;

    restore_terminal(&mut terminal)?;
    result
}

async fn event_loop(terminal: &mut Tui, engine: &mut SystemEngine) -> anyhow::Result<()> {
    let mut input = spawn_input_reader();

    loop {
        terminal.draw(|frame| ui::draw(frame, engine.session()))?;

        let step = tokio::select! {
            Some(event) = input.recv() => Step::Input(event),
            event = engine.next_event() => Step::Engine(event),
        };

        match step {
            Step::Input(event) => {
                if let Some(action) = input::map_event(&event, engine.session().mode()) {
                    if !engine.dispatch(action) {
                        debug!("Quit requested");
                        return Ok(());
                    }
                }
            }
            Step::Engine(event) => engine.handle(event),
        }
    }
}

/// Read terminal events on a blocking thread.
///
/// The thread exits once the receiver is dropped or the terminal errors.
fn spawn_input_reader() -> UnboundedReceiver<Event> {
    let (tx, rx) = mpsc::unbounded_channel();

    thread::spawn(move || loop {
        match event::poll(INPUT_POLL_INTERVAL) {
            Ok(true) => match event::read() {
                Ok(event) => {
                    if tx.send(event).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Failed to read terminal event");
                    break;
                }
            },
            Ok(false) => {
                if tx.is_closed() {
                    break;
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to poll terminal events");
                break;
            }
        }
    });

    rx
}

fn setup_terminal() -> io::Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, cursor::Hide)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Tui) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, cursor::Show)?;
    terminal.show_cursor()
}

/// Leave the alternate screen before the default hook prints a panic.
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, cursor::Show);
        default_hook(info);
    }));
}
