//! Conversation flow: submissions out, replies back in.

use crate::client::AskClient;
use crate::events::AppEvent;
use crate::ui::chat::composer::{Composer, ComposerResult};
use crate::ui::chat::transcript::{MessageId, Transcript};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
};
use tokio::sync::mpsc;

/// Shown in place of an answer when delivery fails for any reason.
pub const ERROR_TEXT: &str = "Sorry, there was an error processing your request.";

/// Wires the composer, the transcript, and the ask client together.
///
/// Each submission spawns its own request task; nothing blocks the UI and
/// nothing is cancelled. Replies carry the id of the placeholder they
/// belong to, so several in-flight questions can resolve in any order.
pub struct ChatController {
    transcript: Transcript,
    composer: Composer,
    client: AskClient,
    reply_tx: mpsc::UnboundedSender<AppEvent>,
}

impl ChatController {
    pub fn new(
        client: AskClient,
        reply_tx: mpsc::UnboundedSender<AppEvent>,
        show_timestamps: bool,
    ) -> Self {
        let mut composer = Composer::new("Type your question...".to_string());
        composer.set_focus(true);

        Self {
            transcript: Transcript::new(show_timestamps),
            composer,
            client,
            reply_tx,
        }
    }

    /// Handle key input
    pub fn handle_key(&mut self, key: KeyEvent) {
        // Release/repeat events would double up on terminals that report them.
        if key.kind != KeyEventKind::Press {
            return;
        }

        match key.code {
            KeyCode::PageUp => {
                let page = self.transcript.page_height();
                self.transcript.scroll_up(page);
            }
            KeyCode::PageDown => {
                let page = self.transcript.page_height();
                self.transcript.scroll_down(page);
            }
            KeyCode::Up if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.transcript.scroll_up(1);
            }
            KeyCode::Down if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.transcript.scroll_down(1);
            }
            KeyCode::End if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.transcript.scroll_to_bottom();
            }
            _ => {
                if let ComposerResult::Submitted(question) = self.composer.handle_key(key) {
                    self.submit(question);
                }
            }
        }
    }

    pub fn handle_paste(&mut self, text: &str) {
        self.composer.insert_str(text);
    }

    /// One submission: record the question, clear the input, park a
    /// placeholder, and send the request on its way. The reply comes back
    /// through the event channel and lands in [`Self::apply_reply`].
    pub fn submit(&mut self, question: String) {
        self.transcript.push_user(question.clone());
        self.composer.clear();
        let id = self.transcript.push_pending();
        self.dispatch(id, question);
    }

    fn dispatch(&self, id: MessageId, question: String) {
        let client = self.client.clone();
        let reply_tx = self.reply_tx.clone();

        tokio::spawn(async move {
            let result = client.ask(&question).await;
            // The receiver only goes away on shutdown.
            let _ = reply_tx.send(AppEvent::Reply { id, result });
        });
    }

    /// Apply one reply to the transcript. This is the only place a delivery
    /// failure becomes user-visible text.
    pub fn apply_reply(&mut self, id: MessageId, result: Result<String>) {
        let text = match result {
            Ok(answer) => answer,
            Err(error) => {
                tracing::warn!("ask request failed for {id:?}: {error:#}");
                ERROR_TEXT.to_string()
            }
        };

        if !self.transcript.finalize(id, text) {
            tracing::debug!("dropping reply for unknown or finished message {id:?}");
        }
    }

    #[allow(dead_code)]
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    #[allow(dead_code)]
    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    /// Render transcript above, composer below; the composer row grows
    /// with its content and collapses again once cleared.
    pub fn render(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(10),
                Constraint::Length(self.composer.height()),
            ])
            .split(frame.size());

        self.transcript.render(frame, chunks[0]);
        self.composer.render(frame, chunks[1]);
    }
}
