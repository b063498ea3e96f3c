use crate::client::AskReply;
use crate::error::AskError;
use strum::{AsRefStr, Display};

/// Internal application events for coordinating between components
#[derive(Debug)]
pub enum AppEvent {
    /// Input or timing event from the terminal
    Tui(TuiEvent),

    /// An ask request finished, successfully or not
    AskSettled {
        id: RequestId,
        outcome: Result<AskReply, AskError>,
    },
}

/// TUI-specific events (keyboard, paste, etc.)
#[derive(Debug, Clone)]
pub enum TuiEvent {
    /// Key press event
    Key(crossterm::event::KeyEvent),

    /// Paste event
    Paste(String),

    /// Terminal resize
    Resize(u16, u16),

    /// Animation tick
    Tick,
}

/// Identifies one submitted query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestId(pub u64);

/// Role in conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn icon(&self) -> &'static str {
        match self {
            Role::User => "👤",
            Role::Assistant => "🤖",
        }
    }
}
