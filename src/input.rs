//! Exit keys
//!
//! crossterm input is blocking, so keys are read on a dedicated thread and
//! forwarded to the dashboard over a channel.

use std::fmt;
use std::io;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Why the dashboard stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// Escape, `q` or Ctrl-C typed into the terminal
    Key,
    /// Interrupt signal delivered to the process
    Interrupt,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::Key => f.write_str("exit key"),
            ExitReason::Interrupt => f.write_str("interrupt"),
        }
    }
}

/// Escape, `q` and Ctrl-C end the session
pub fn is_exit_key(key: &KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

/// Read terminal keys until an exit key is pressed or the receiver goes away
pub fn spawn_key_listener(exit: UnboundedSender<ExitReason>) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("key-listener".to_string())
        .spawn(move || {
            while !exit.is_closed() {
                match event::poll(POLL_INTERVAL) {
                    Ok(true) => match event::read() {
                        Ok(Event::Key(key)) if is_exit_key(&key) => {
                            debug!(code = ?key.code, "Exit key pressed");
                            let _ = exit.send(ExitReason::Key);
                            return;
                        }
                        Ok(_) => {}
                        Err(e) => {
                            warn!(error = %e, "Failed to read terminal event");
                            return;
                        }
                    },
                    Ok(false) => {}
                    Err(e) => {
                        warn!(error = %e, "Failed to poll terminal events");
                        return;
                    }
                }
            }
        })
}
