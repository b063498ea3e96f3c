use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Widget,
};

const FRAMES: [&str; 4] = [".", "..", "...", "   "];

/// "Thinking…" line shown while a request is outstanding
#[derive(Debug, Clone, Default)]
pub struct PendingIndicator {
    active: bool,
    frame: usize,
}

impl PendingIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        self.active = true;
        self.frame = 0;
    }

    pub fn stop(&mut self) {
        self.active = false;
    }

    /// Advance the animation; called on every UI tick
    pub fn tick(&mut self) {
        if self.active {
            self.frame = (self.frame + 1) % FRAMES.len();
        }
    }
}

impl Widget for &PendingIndicator {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if !self.active || area.height == 0 {
            return;
        }

        let indicator = Line::from(vec![
            Span::styled(" ⏳ ", Style::default().fg(Color::Cyan)),
            Span::styled("Thinking", Style::default().fg(Color::Gray)),
            Span::styled(FRAMES[self.frame], Style::default().fg(Color::Yellow)),
        ]);
        buf.set_line(area.x, area.y, &indicator, area.width);
    }
}
