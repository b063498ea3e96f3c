use crate::client::AskBackend;
use crate::events::{AppEvent, TuiEvent};
use crate::tui::{self, EventHandler, Tui};
use crate::ui::conversation::{ConversationAction, ConversationManager, OutboundAsk};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Interactive chat session: routes events into the conversation and runs
/// requests off the UI loop
pub struct App {
    manager: ConversationManager,
    backend: Arc<dyn AskBackend>,
    events: mpsc::UnboundedSender<AppEvent>,
    should_quit: bool,
}

impl App {
    pub fn new(
        manager: ConversationManager,
        backend: Arc<dyn AskBackend>,
        events: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        Self {
            manager,
            backend,
            events,
            should_quit: false,
        }
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Tui(TuiEvent::Key(key)) => self.handle_key(key),
            AppEvent::Tui(TuiEvent::Paste(text)) => self.manager.handle_paste(&text),
            AppEvent::Tui(TuiEvent::Tick) => self.manager.tick(),
            AppEvent::Tui(TuiEvent::Resize(..)) => {}
            AppEvent::AskSettled { id, outcome } => {
                self.manager.settle(id, outcome);
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        let quit = key.code == KeyCode::Esc
            || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL));
        if quit {
            self.should_quit = true;
            return;
        }

        if let ConversationAction::Dispatch(ask) = self.manager.handle_key(key) {
            self.dispatch(ask);
        }
    }

    /// Run one request on its own task; the result comes back as an event
    fn dispatch(&self, ask: OutboundAsk) {
        let backend = Arc::clone(&self.backend);
        let events = self.events.clone();
        tokio::spawn(async move {
            let outcome = backend.ask(&ask.query).await;
            if events
                .send(AppEvent::AskSettled {
                    id: ask.id,
                    outcome,
                })
                .is_err()
            {
                tracing::debug!(id = ask.id.0, "event loop gone before reply arrived");
            }
        });
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn manager(&self) -> &ConversationManager {
        &self.manager
    }
}

/// Run the chat TUI until the user quits
pub async fn run(manager: ConversationManager, backend: Arc<dyn AskBackend>) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();
    let mut app = App::new(manager, backend, events.sender());

    let result = event_loop(&mut terminal, &mut events, &mut app).await;
    tui::restore()?;
    result
}

async fn event_loop(terminal: &mut Tui, events: &mut EventHandler, app: &mut App) -> Result<()> {
    while !app.should_quit() {
        terminal.draw(|frame| frame.render_widget(app.manager(), frame.size()))?;

        match events.next().await {
            Some(event) => app.handle_event(event),
            None => break,
        }
    }

    tracing::info!("chat session closed");
    Ok(())
}
