use ratatui::{
    style::{Color, Style},
    text::{Line, Span},
};
use strum::{EnumIter, IntoEnumIterator};

/// Keyboard shortcuts the chat view understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum Shortcut {
    Send,
    Newline,
    Scroll,
    Quit,
}

impl Shortcut {
    pub fn keys(self) -> &'static str {
        match self {
            Shortcut::Send => "Enter",
            Shortcut::Newline => "Shift+Enter",
            Shortcut::Scroll => "PgUp/PgDn",
            Shortcut::Quit => "Esc",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Shortcut::Send => "send",
            Shortcut::Newline => "new line",
            Shortcut::Scroll => "scroll",
            Shortcut::Quit => "quit",
        }
    }
}

/// One-line hint bar listing every shortcut
pub fn hint_line() -> Line<'static> {
    let mut spans = Vec::new();
    for (i, shortcut) in Shortcut::iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled("  ·  ", Style::default().fg(Color::DarkGray)));
        }
        spans.push(Span::styled(shortcut.keys(), Style::default().fg(Color::Cyan)));
        spans.push(Span::styled(
            format!(" {}", shortcut.description()),
            Style::default().fg(Color::DarkGray),
        ));
    }
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hint_lists_every_shortcut() {
        let hint: String = hint_line()
            .spans
            .iter()
            .map(|span| span.content.as_ref())
            .collect();
        for shortcut in Shortcut::iter() {
            assert!(hint.contains(shortcut.keys()), "{hint}");
        }
        assert!(hint.starts_with("Enter send"));
    }
}
