//! Conversation UI components for chat interface

pub mod composer;
pub mod history;
pub mod manager;
pub mod pending;
pub mod shortcuts;

pub use composer::{ComposerAction, ConversationComposer};
pub use history::ConversationHistory;
pub use manager::{ConversationAction, ConversationManager, OutboundAsk};
pub use pending::PendingIndicator;
