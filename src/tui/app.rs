//! Application state and input handling.

use crate::orchestrator::{Command, SessionView};
use crossterm::event::KeyCode;
use tokio::sync::mpsc;
use tracing::debug;

/// Rounds requested when the user triggers training from the keyboard.
const TRAINING_ROUNDS: u32 = 100;

/// Main application state: the latest view from the orchestrator plus the
/// keyboard cursor.
pub struct App {
    view: Option<SessionView>,
    cursor: usize,
    commands: mpsc::UnboundedSender<Command>,
}

impl App {
    /// Creates the application with the cursor on the center cell.
    pub fn new(commands: mpsc::UnboundedSender<Command>) -> Self {
        Self {
            view: None,
            cursor: 4,
            commands,
        }
    }

    /// The latest orchestrator view, once one has arrived.
    pub fn view(&self) -> Option<&SessionView> {
        self.view.as_ref()
    }

    /// The cell the keyboard cursor sits on.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Replaces the displayed view with a fresh snapshot.
    pub fn apply_view(&mut self, view: SessionView) {
        self.view = Some(view);
    }

    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            debug!(?command, "orchestrator hung up");
        }
    }

    /// Handles one key press. Returns true when the user wants to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('n') => self.send(Command::NewGame),
            KeyCode::Char('c') => self.send(Command::ClearError),
            KeyCode::Char('s') => self.send(Command::RefreshStatus),
            KeyCode::Char('t') => self.send(Command::Train {
                rounds: TRAINING_ROUNDS,
            }),
            KeyCode::Char('k') => self.send(Command::ResetKnowledge),
            KeyCode::Char(digit) if digit.is_ascii_digit() => {
                if let Some(value) = digit.to_digit(10) {
                    if (1..=9).contains(&value) {
                        self.send(Command::Place(value as usize - 1));
                    }
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.send(Command::Place(self.cursor)),
            KeyCode::Left => {
                if self.cursor % 3 > 0 {
                    self.cursor -= 1;
                }
            }
            KeyCode::Right => {
                if self.cursor % 3 < 2 {
                    self.cursor += 1;
                }
            }
            KeyCode::Up => {
                if self.cursor >= 3 {
                    self.cursor -= 3;
                }
            }
            KeyCode::Down => {
                if self.cursor < 6 {
                    self.cursor += 3;
                }
            }
            _ => {}
        }
        false
    }
}
