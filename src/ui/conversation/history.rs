//! Conversation history display component

use crate::events::Role;
use chrono::{DateTime, Local};
use std::cell::Cell;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// A single message in the conversation history. Immutable once created.
#[derive(Debug, Clone)]
pub struct ConversationMessage {
    role: Role,
    text: String,
    timestamp: DateTime<Local>,
}

impl ConversationMessage {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            timestamp: Local::now(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Append-only transcript plus the view state needed to draw it
#[derive(Debug, Clone)]
pub struct ConversationHistory {
    messages: Vec<ConversationMessage>,
    /// Lines scrolled up from the bottom; 0 follows the newest message
    scroll_offset: usize,
    /// Highest offset the last render could show
    max_offset: Cell<usize>,
    show_timestamps: bool,
    connected_to: String,
}

impl ConversationHistory {
    pub fn new(connected_to: impl Into<String>, show_timestamps: bool) -> Self {
        Self {
            messages: Vec::new(),
            scroll_offset: 0,
            max_offset: Cell::new(0),
            show_timestamps,
            connected_to: connected_to.into(),
        }
    }

    /// Add a new message to the history
    pub fn add_message(&mut self, message: ConversationMessage) {
        self.messages.push(message);
        self.scroll_to_bottom();
    }

    /// Add a user message
    pub fn add_user_message(&mut self, text: impl Into<String>) {
        self.add_message(ConversationMessage::new(Role::User, text));
    }

    /// Add an assistant message
    pub fn add_assistant_message(&mut self, text: impl Into<String>) {
        self.add_message(ConversationMessage::new(Role::Assistant, text));
    }

    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ConversationMessage> {
        self.messages.last()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Scroll towards older messages, stopping at the top of the last render
    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll_offset = self
            .scroll_offset
            .saturating_add(lines)
            .min(self.max_offset.get());
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_offset = 0;
    }

    /// Render a single message into lines
    fn render_message(&self, message: &ConversationMessage, width: u16) -> Vec<Line<'_>> {
        let mut lines = Vec::new();

        let mut header = vec![
            Span::raw(format!("{} ", message.role().icon())),
            Span::styled(
                match message.role() {
                    Role::User => "You",
                    Role::Assistant => "SochGPT",
                },
                self.get_content_style(message.role()).add_modifier(Modifier::BOLD),
            ),
        ];
        if self.show_timestamps {
            header.push(Span::styled(
                format!(" {}", message.timestamp.format("%H:%M:%S")),
                Style::default().fg(Color::DarkGray),
            ));
        }
        lines.push(Line::from(header));

        for content_line in wrap_text(message.text(), width.saturating_sub(2) as usize) {
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(content_line, self.get_content_style(message.role())),
            ]));
        }

        lines
    }

    /// Get content style based on role
    fn get_content_style(&self, role: Role) -> Style {
        match role {
            Role::User => Style::default().fg(Color::Cyan),
            Role::Assistant => Style::default().fg(Color::White),
        }
    }
}

impl Widget for &ConversationHistory {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title("💬 Conversation");

        let inner_area = block.inner(area);
        block.render(area, buf);

        if self.is_empty() {
            let welcome_lines = vec![
                Line::from(""),
                Line::from(Span::styled(
                    "Ask about your projects, policies, or docs.",
                    Style::default().fg(Color::Gray),
                )),
                Line::from(Span::styled(
                    format!("Connected to {}", self.connected_to),
                    Style::default().fg(Color::DarkGray),
                )),
            ];

            Paragraph::new(welcome_lines)
                .alignment(Alignment::Center)
                .render(inner_area, buf);
            return;
        }

        let mut all_lines: Vec<Line> = Vec::new();
        for message in self.messages() {
            all_lines.extend(self.render_message(message, inner_area.width));
            all_lines.push(Line::from(""));
        }
        // no spacer after the last message
        all_lines.pop();

        let height = inner_area.height as usize;
        let total = all_lines.len();
        let max_offset = total.saturating_sub(height);
        self.max_offset.set(max_offset);
        let offset = self.scroll_offset.min(max_offset);
        let start = max_offset - offset;

        for (i, line) in all_lines.iter().skip(start).take(height).enumerate() {
            buf.set_line(inner_area.x, inner_area.y + i as u16, line, inner_area.width);
        }

        if offset > 0 {
            let marker = Line::from(Span::styled(
                format!(" ↓ {} more ", offset),
                Style::default().fg(Color::Yellow),
            ));
            let bottom = area.y + area.height.saturating_sub(1);
            let x = area.x + area.width.saturating_sub(marker.width() as u16 + 2);
            buf.set_line(x, bottom, &marker, marker.width() as u16);
        }
    }
}

/// Wrap text to fit within the given width, keeping explicit line breaks.
///
/// Leading indentation is kept on every line of its paragraph and runs of
/// spaces survive inside a line. Words wider than the line are hard-broken.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return text.split('\n').map(str::to_string).collect();
    }

    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let body = paragraph.trim();
        let indent = &paragraph[..paragraph.len() - paragraph.trim_start().len()];
        // Indentation as wide as the pane would leave no room for text
        let indent = if indent.chars().count() < width { indent } else { "" };
        let avail = width - indent.chars().count();

        let mut current_line = indent.to_string();
        let mut current_width = 0;

        // Splitting on single spaces keeps runs as empty words
        for word in body.split(' ') {
            let mut rest = word;
            loop {
                let rest_width = rest.chars().count();
                if current_width == 0 && rest.is_empty() {
                    // spaces at a wrap point are dropped
                    break;
                }
                if current_width > 0 && current_width + 1 + rest_width <= avail {
                    current_line.push(' ');
                    current_line.push_str(rest);
                    current_width += 1 + rest_width;
                    break;
                }
                if current_width == 0 && rest_width <= avail {
                    current_line.push_str(rest);
                    current_width = rest_width;
                    break;
                }
                if current_width > 0 {
                    lines.push(std::mem::replace(&mut current_line, indent.to_string()));
                    current_width = 0;
                    continue;
                }

                let split = rest
                    .char_indices()
                    .nth(avail)
                    .map_or(rest.len(), |(idx, _)| idx);
                current_line.push_str(&rest[..split]);
                lines.push(std::mem::replace(&mut current_line, indent.to_string()));
                rest = &rest[split..];
            }
        }

        lines.push(current_line);
    }

    lines
}
