use crate::client::{AskBackend, AskReply};
use crate::error::{AskError, AskErrorKind};
use crate::events::RequestId;
use crate::ui::conversation::shortcuts::hint_line;
use crate::ui::conversation::{
    ComposerAction, ConversationComposer, ConversationHistory, PendingIndicator,
};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

/// Assistant text when the reply carries no answer
pub const NO_RESPONSE: &str = "No response.";

/// Assistant text for every failed request
pub const BACKEND_UNREACHABLE: &str = "⚠️ Could not reach backend.";

const PLACEHOLDER: &str = "Type your message… (Enter to send)";
const SCROLL_STEP: usize = 5;

/// A query the owner must send to the backend, then report back via
/// [`ConversationManager::settle`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundAsk {
    pub id: RequestId,
    pub query: String,
}

/// Actions that can be requested by the conversation manager
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationAction {
    None,
    Dispatch(OutboundAsk),
}

/// Details of the most recent failed request; never shown in the transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AskFailure {
    pub kind: AskErrorKind,
    pub status: Option<u16>,
    pub detail: String,
}

impl From<&AskError> for AskFailure {
    fn from(err: &AskError) -> Self {
        Self {
            kind: err.kind(),
            status: err.status(),
            detail: err.to_string(),
        }
    }
}

/// Owns the transcript, the composition buffer, and the pending request
pub struct ConversationManager {
    history: ConversationHistory,
    composer: ConversationComposer,
    indicator: PendingIndicator,
    pending: Option<RequestId>,
    next_request: u64,
    last_failure: Option<AskFailure>,
    chat_target: String,
}

impl ConversationManager {
    pub fn new(chat_target: impl Into<String>, show_timestamps: bool) -> Self {
        let chat_target = chat_target.into();
        Self {
            history: ConversationHistory::new(chat_target.clone(), show_timestamps),
            composer: ConversationComposer::new(PLACEHOLDER),
            indicator: PendingIndicator::new(),
            pending: None,
            next_request: 0,
            last_failure: None,
            chat_target,
        }
    }

    /// Start a send from the composition buffer.
    ///
    /// Returns the query to dispatch, or `None` when the trimmed buffer is
    /// empty or a request is already outstanding. In both refusals the
    /// buffer is left untouched.
    pub fn submit(&mut self) -> Option<OutboundAsk> {
        if let Some(id) = self.pending {
            tracing::debug!(pending = id.0, "submit refused while a request is outstanding");
            return None;
        }

        let query = self.composer.content().trim().to_string();
        if query.is_empty() {
            return None;
        }

        self.history.add_user_message(query.clone());
        self.composer.clear();

        let id = RequestId(self.next_request);
        self.next_request += 1;
        self.pending = Some(id);
        self.indicator.start();
        self.composer.set_disabled(true);

        tracing::debug!(id = id.0, len = query.len(), "query submitted");
        Some(OutboundAsk { id, query })
    }

    /// Record the outcome of request `id`.
    ///
    /// Outcomes for anything but the pending request are dropped. Returns
    /// whether the outcome was applied.
    pub fn settle(&mut self, id: RequestId, outcome: Result<AskReply, AskError>) -> bool {
        if self.pending != Some(id) {
            tracing::warn!(id = id.0, pending = ?self.pending.map(|p| p.0), "discarding stale reply");
            return false;
        }

        let text = match outcome {
            Ok(reply) => {
                self.last_failure = None;
                reply.answer().unwrap_or_else(|| NO_RESPONSE.to_string())
            }
            Err(err) => {
                tracing::warn!(id = id.0, kind = %err.kind(), error = %err, "ask failed");
                self.last_failure = Some(AskFailure::from(&err));
                BACKEND_UNREACHABLE.to_string()
            }
        };
        self.history.add_assistant_message(text);

        self.pending = None;
        self.indicator.stop();
        self.composer.set_disabled(false);
        tracing::debug!(id = id.0, "request settled");
        true
    }

    /// Submit and wait for the backend in one step
    pub async fn submit_with(&mut self, backend: &dyn AskBackend) -> bool {
        let Some(ask) = self.submit() else {
            return false;
        };
        let outcome = backend.ask(&ask.query).await;
        self.settle(ask.id, outcome)
    }

    /// Handle key input
    pub fn handle_key(&mut self, key: KeyEvent) -> ConversationAction {
        if key.kind != KeyEventKind::Press {
            return ConversationAction::None;
        }

        match key.code {
            KeyCode::PageUp => {
                self.history.scroll_up(SCROLL_STEP);
                ConversationAction::None
            }
            KeyCode::PageDown => {
                self.history.scroll_down(SCROLL_STEP);
                ConversationAction::None
            }
            _ => match self.composer.handle_key(key) {
                ComposerAction::Submit => match self.submit() {
                    Some(ask) => ConversationAction::Dispatch(ask),
                    None => ConversationAction::None,
                },
                ComposerAction::Edited | ComposerAction::None => ConversationAction::None,
            },
        }
    }

    /// Insert pasted text into the buffer
    pub fn handle_paste(&mut self, text: &str) {
        self.composer.insert_str(text);
    }

    /// Advance animations
    pub fn tick(&mut self) {
        self.indicator.tick();
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn composer(&self) -> &ConversationComposer {
        &self.composer
    }

    pub fn composer_mut(&mut self) -> &mut ConversationComposer {
        &mut self.composer
    }

    pub fn last_failure(&self) -> Option<&AskFailure> {
        self.last_failure.as_ref()
    }

    fn header_line(&self) -> (Line<'static>, Line<'static>) {
        let left = Line::from(vec![
            Span::styled(
                " SochGPT",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::styled("  Private LLM", Style::default().fg(Color::DarkGray)),
        ]);
        let right = Line::from(Span::styled(
            format!("v{} • {} ", env!("CARGO_PKG_VERSION"), self.chat_target),
            Style::default().fg(Color::DarkGray),
        ));
        (left, right)
    }
}

impl Widget for &ConversationManager {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),                              // Header
                Constraint::Min(3),                                 // History
                Constraint::Length(1),                              // Pending indicator
                Constraint::Length(self.composer.desired_height()), // Composer
                Constraint::Length(1),                              // Shortcut hints
            ])
            .split(area);

        let (left, right) = self.header_line();
        Paragraph::new(left).render(chunks[0], buf);
        Paragraph::new(right)
            .alignment(Alignment::Right)
            .render(chunks[0], buf);

        self.history.render(chunks[1], buf);
        self.indicator.render(chunks[2], buf);
        self.composer.render(chunks[3], buf);
        Paragraph::new(hint_line()).render(chunks[4], buf);
    }
}
