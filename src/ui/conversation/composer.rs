use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

/// Most buffer lines the composer grows to before clipping
pub const MAX_VISIBLE_LINES: u16 = 5;

/// What a key press asks the owner of the composer to do
#[derive(Debug, PartialEq, Eq)]
pub enum ComposerAction {
    /// Enter without a newline modifier
    Submit,
    /// The buffer or cursor changed
    Edited,
    None,
}

/// State for the text area within the composer.
///
/// `cursor_position` is a byte offset that always sits on a char boundary.
#[derive(Debug, Clone, Default)]
pub struct TextAreaState {
    pub content: String,
    pub cursor_position: usize,
}

/// Conversation composer for user input
#[derive(Debug, Clone)]
pub struct ConversationComposer {
    state: TextAreaState,
    placeholder: String,
    disabled: bool,
}

impl ConversationComposer {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            state: TextAreaState::default(),
            placeholder: placeholder.into(),
            disabled: false,
        }
    }

    /// Handle key input
    pub fn handle_key(&mut self, key: KeyEvent) -> ComposerAction {
        if key.kind != KeyEventKind::Press {
            return ComposerAction::None;
        }

        match key.code {
            KeyCode::Enter => {
                if Self::is_newline_modifier(key.modifiers) {
                    self.insert_char('\n');
                    ComposerAction::Edited
                } else {
                    ComposerAction::Submit
                }
            }
            KeyCode::Char(c) => {
                if key.modifiers.contains(KeyModifiers::CONTROL) {
                    return ComposerAction::None;
                }
                self.insert_char(c);
                ComposerAction::Edited
            }
            KeyCode::Backspace => self.edited(Self::backspace),
            KeyCode::Delete => self.edited(Self::delete),
            KeyCode::Left => self.edited(Self::move_left),
            KeyCode::Right => self.edited(Self::move_right),
            KeyCode::Home => {
                self.state.cursor_position = 0;
                ComposerAction::Edited
            }
            KeyCode::End => {
                self.state.cursor_position = self.state.content.len();
                ComposerAction::Edited
            }
            _ => ComposerAction::None,
        }
    }

    /// Shift+Enter inserts a newline; Alt+Enter does too since many
    /// terminals never report Shift with Enter.
    fn is_newline_modifier(modifiers: KeyModifiers) -> bool {
        modifiers.intersects(KeyModifiers::SHIFT | KeyModifiers::ALT)
    }

    fn edited(&mut self, op: fn(&mut Self) -> bool) -> ComposerAction {
        if op(self) {
            ComposerAction::Edited
        } else {
            ComposerAction::None
        }
    }

    /// Insert a character at the cursor position
    fn insert_char(&mut self, c: char) {
        self.state.content.insert(self.state.cursor_position, c);
        self.state.cursor_position += c.len_utf8();
    }

    /// Insert pasted text at the cursor position
    pub fn insert_str(&mut self, text: &str) {
        let text = text.replace("\r\n", "\n").replace('\r', "\n");
        self.state.content.insert_str(self.state.cursor_position, &text);
        self.state.cursor_position += text.len();
    }

    fn prev_boundary(&self) -> Option<usize> {
        self.state.content[..self.state.cursor_position]
            .char_indices()
            .next_back()
            .map(|(idx, _)| idx)
    }

    fn next_boundary(&self) -> Option<usize> {
        self.state.content[self.state.cursor_position..]
            .chars()
            .next()
            .map(|c| self.state.cursor_position + c.len_utf8())
    }

    /// Delete character before cursor
    fn backspace(&mut self) -> bool {
        match self.prev_boundary() {
            Some(idx) => {
                self.state.content.remove(idx);
                self.state.cursor_position = idx;
                true
            }
            None => false,
        }
    }

    /// Delete character at cursor
    fn delete(&mut self) -> bool {
        if self.state.cursor_position < self.state.content.len() {
            self.state.content.remove(self.state.cursor_position);
            true
        } else {
            false
        }
    }

    fn move_left(&mut self) -> bool {
        match self.prev_boundary() {
            Some(idx) => {
                self.state.cursor_position = idx;
                true
            }
            None => false,
        }
    }

    fn move_right(&mut self) -> bool {
        match self.next_boundary() {
            Some(idx) => {
                self.state.cursor_position = idx;
                true
            }
            None => false,
        }
    }

    /// Dim the composer while a request is outstanding
    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    /// Get current content
    pub fn content(&self) -> &str {
        &self.state.content
    }

    /// Replace the content, cursor at the end
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.state.content = content.into();
        self.state.cursor_position = self.state.content.len();
    }

    /// Clear content
    pub fn clear(&mut self) {
        self.state.content.clear();
        self.state.cursor_position = 0;
    }

    /// Rows needed to render the composer, borders included
    pub fn desired_height(&self) -> u16 {
        let lines = self.state.content.split('\n').count() as u16;
        lines.clamp(1, MAX_VISIBLE_LINES) + 2
    }
}

impl Widget for &ConversationComposer {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.disabled {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::Cyan)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .title("Message")
            .border_style(border_style);

        let inner_area = block.inner(area);
        block.render(area, buf);

        if self.state.content.is_empty() {
            let mut spans = Vec::new();
            if !self.disabled {
                spans.push(Span::styled("▌", Style::default().fg(Color::Cyan)));
            }
            spans.push(Span::styled(
                self.placeholder.as_str(),
                Style::default().fg(Color::DarkGray),
            ));
            buf.set_line(inner_area.x, inner_area.y, &Line::from(spans), inner_area.width);
            return;
        }

        // Render content with cursor indicator
        let mut content = self.state.content.clone();
        if !self.disabled {
            content.insert(self.state.cursor_position.min(content.len()), '▌');
        }

        let lines: Vec<&str> = content.split('\n').collect();
        let height = inner_area.height as usize;
        let cursor_line = content[..self.state.cursor_position.min(content.len())]
            .matches('\n')
            .count();
        // Keep the cursor line visible when the buffer outgrows the box
        let first = (cursor_line + 1).saturating_sub(height);

        for (i, line_text) in lines.iter().skip(first).take(height).enumerate() {
            let line = Line::from(vec![Span::raw(*line_text)]);
            buf.set_line(inner_area.x, inner_area.y + i as u16, &line, inner_area.width);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(composer: &mut ConversationComposer, text: &str) {
        for c in text.chars() {
            composer.handle_key(press(KeyCode::Char(c)));
        }
    }

    #[test]
    fn enter_without_modifier_submits_and_keeps_buffer() {
        let mut composer = ConversationComposer::new("");
        type_text(&mut composer, "hello");
        assert_eq!(composer.handle_key(press(KeyCode::Enter)), ComposerAction::Submit);
        assert_eq!(composer.content(), "hello");
    }

    #[test]
    fn shift_enter_inserts_newline() {
        let mut composer = ConversationComposer::new("");
        type_text(&mut composer, "line one");
        let action = composer.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::SHIFT));
        assert_eq!(action, ComposerAction::Edited);
        type_text(&mut composer, "two");
        assert_eq!(composer.content(), "line one\ntwo");
    }

    #[test]
    fn alt_enter_also_inserts_newline() {
        let mut composer = ConversationComposer::new("");
        let action = composer.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::ALT));
        assert_eq!(action, ComposerAction::Edited);
        assert_eq!(composer.content(), "\n");
    }

    #[test]
    fn release_events_are_ignored() {
        let mut composer = ConversationComposer::new("");
        let mut key = press(KeyCode::Char('x'));
        key.kind = KeyEventKind::Release;
        assert_eq!(composer.handle_key(key), ComposerAction::None);
        assert_eq!(composer.content(), "");
    }

    #[test]
    fn editing_respects_multibyte_characters() {
        let mut composer = ConversationComposer::new("");
        type_text(&mut composer, "héllo ✓");
        composer.handle_key(press(KeyCode::Backspace));
        assert_eq!(composer.content(), "héllo ");

        composer.handle_key(press(KeyCode::Home));
        composer.handle_key(press(KeyCode::Right));
        composer.handle_key(press(KeyCode::Right));
        composer.handle_key(press(KeyCode::Backspace));
        assert_eq!(composer.content(), "hllo ");

        composer.handle_key(press(KeyCode::Delete));
        assert_eq!(composer.content(), "hlo ");
        assert_eq!(composer.state.cursor_position, 1);
    }

    #[test]
    fn cursor_moves_stop_at_ends() {
        let mut composer = ConversationComposer::new("");
        assert_eq!(composer.handle_key(press(KeyCode::Left)), ComposerAction::None);
        assert_eq!(composer.handle_key(press(KeyCode::Backspace)), ComposerAction::None);
        type_text(&mut composer, "ab");
        assert_eq!(composer.handle_key(press(KeyCode::Right)), ComposerAction::None);
        assert_eq!(composer.handle_key(press(KeyCode::Delete)), ComposerAction::None);
    }

    #[test]
    fn paste_inserts_at_cursor_with_normalized_newlines() {
        let mut composer = ConversationComposer::new("");
        type_text(&mut composer, "ad");
        composer.handle_key(press(KeyCode::Left));
        composer.insert_str("b\r\nc");
        assert_eq!(composer.content(), "ab\ncd");
        assert_eq!(composer.state.cursor_position, 4);
    }

    #[test]
    fn control_chords_do_not_type() {
        let mut composer = ConversationComposer::new("");
        let action = composer.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(action, ComposerAction::None);
        assert_eq!(composer.content(), "");
    }

    #[test]
    fn height_grows_with_lines_up_to_limit() {
        let mut composer = ConversationComposer::new("");
        assert_eq!(composer.desired_height(), 3);
        composer.set_content("a\nb");
        assert_eq!(composer.desired_height(), 4);
        composer.set_content("1\n2\n3\n4\n5\n6\n7");
        assert_eq!(composer.desired_height(), MAX_VISIBLE_LINES + 2);
    }

    #[test]
    fn renders_placeholder_when_empty() {
        let composer = ConversationComposer::new("Type here");
        let area = Rect::new(0, 0, 20, 3);
        let mut buf = Buffer::empty(area);
        (&composer).render(area, &mut buf);

        let row: String = (0..area.width).map(|x| buf.get(x, 1).symbol()).collect();
        assert!(row.contains("Type here"), "row was {row:?}");
    }
}
