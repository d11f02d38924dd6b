//! Append-only conversation transcript.
//!
//! Messages are addressed by [`MessageId`] rather than position, so a reply
//! that arrives late, or out of order, still lands on the entry it belongs
//! to. Entries are never removed or reordered; a pending entry is rewritten
//! in place exactly once when its reply arrives.

use crate::format::{Block, format_text};
use chrono::{DateTime, Local};
use ratatui::{
    Frame,
    layout::{Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block as UiBlock, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState,
    },
};
use std::collections::HashMap;
use textwrap::wrap;

/// Placeholder text shown while a reply is in flight.
pub const PENDING_TEXT: &str = "Thinking...";

/// Stable handle for one transcript entry. Allocated by the transcript,
/// never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageId(u64);

/// Who a message is displayed as coming from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Assistant,
}

/// Whether a message still awaits its reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    Pending,
    Final,
}

/// A single transcript entry
#[derive(Debug, Clone)]
pub struct Message {
    pub id: MessageId,
    pub sender: Sender,
    pub text: String,
    pub state: RenderState,
    pub sent_at: DateTime<Local>,
}

impl Message {
    /// Render this message into display lines. Pure with respect to the
    /// message fields, so redrawing never changes what is shown.
    pub fn display_lines(&self, width: u16, show_timestamps: bool) -> Vec<Line<'static>> {
        let mut lines = Vec::new();

        let label = match self.sender {
            Sender::User => "👤 You",
            Sender::Assistant => "🤖 Assistant",
        };

        let header = if show_timestamps {
            let timestamp = self.sent_at.format("%H:%M:%S").to_string();
            format!("{} {} {}", label, timestamp, "─".repeat(16))
        } else {
            format!("{} {}", label, "─".repeat(16))
        };

        lines.push(Line::from(vec![Span::styled(
            header,
            Style::default().fg(Color::DarkGray),
        )]));

        let content_style = self.content_style();
        let wrap_width = (width as usize).saturating_sub(4).max(1);

        for block in format_text(&self.text) {
            match block {
                Block::Text(text_lines) => {
                    for raw in text_lines {
                        for wrapped in wrap(&raw, wrap_width) {
                            lines.push(Line::from(vec![
                                Span::raw("  "),
                                Span::styled(wrapped.to_string(), content_style),
                            ]));
                        }
                    }
                }
                Block::Code(code_lines) => {
                    // Code lines are kept verbatim, never re-wrapped.
                    for raw in code_lines {
                        lines.push(Line::from(vec![
                            Span::raw("  "),
                            Span::styled("▎ ", Style::default().fg(Color::DarkGray)),
                            Span::styled(raw, Style::default().fg(Color::Yellow)),
                        ]));
                    }
                }
            }
        }

        lines
    }

    fn content_style(&self) -> Style {
        if self.state == RenderState::Pending {
            return Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC);
        }

        match self.sender {
            Sender::User => Style::default().fg(Color::Blue),
            Sender::Assistant => Style::default().fg(Color::Green),
        }
    }
}

/// Append-only message log with scrollback
pub struct Transcript {
    messages: Vec<Message>,
    index: HashMap<MessageId, usize>,
    next_id: u64,
    /// Lines scrolled back from the newest message; 0 sticks to the bottom.
    scrollback: usize,
    /// Bounds learned at render time, used to clamp scrolling.
    max_scroll: usize,
    view_height: usize,
    show_timestamps: bool,
}

impl Transcript {
    pub fn new(show_timestamps: bool) -> Self {
        Self {
            messages: Vec::new(),
            index: HashMap::new(),
            next_id: 0,
            scrollback: 0,
            max_scroll: 0,
            view_height: 0,
            show_timestamps,
        }
    }

    /// Append a finished user message.
    pub fn push_user(&mut self, text: String) -> MessageId {
        self.push(Sender::User, text, RenderState::Final)
    }

    /// Append an assistant placeholder awaiting its reply.
    pub fn push_pending(&mut self) -> MessageId {
        self.push(Sender::Assistant, PENDING_TEXT.to_string(), RenderState::Pending)
    }

    fn push(&mut self, sender: Sender, text: String, state: RenderState) -> MessageId {
        let id = MessageId(self.next_id);
        self.next_id += 1;

        self.index.insert(id, self.messages.len());
        self.messages.push(Message {
            id,
            sender,
            text,
            state,
            sent_at: Local::now(),
        });

        // Appending re-sticks the view to the newest message.
        self.scrollback = 0;
        id
    }

    /// Rewrite a pending entry in place with its final text.
    ///
    /// Returns false without touching anything for ids this transcript
    /// never issued and for entries that are already final. The view
    /// position is left alone.
    pub fn finalize(&mut self, id: MessageId, text: String) -> bool {
        let Some(&position) = self.index.get(&id) else {
            return false;
        };

        let message = &mut self.messages[position];
        if message.state != RenderState::Pending {
            return false;
        }

        message.text = text;
        message.state = RenderState::Final;
        true
    }

    #[allow(dead_code)]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Look up an entry by its handle
    #[allow(dead_code)]
    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.index.get(&id).map(|&position| &self.messages[position])
    }

    /// Get message count
    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.scrollback = (self.scrollback + lines).min(self.max_scroll);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scrollback = self.scrollback.saturating_sub(lines);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scrollback = 0;
    }

    /// Lines one PageUp/PageDown moves, based on the last rendered height.
    pub fn page_height(&self) -> usize {
        self.view_height.saturating_sub(1).max(1)
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = UiBlock::default()
            .borders(Borders::ALL)
            .title("💬 Conversation");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        self.view_height = inner.height as usize;

        if self.messages.is_empty() {
            frame.render_widget(Paragraph::new(welcome_lines()), inner);
            return;
        }

        let mut all_lines: Vec<Line> = Vec::new();
        for message in &self.messages {
            all_lines.extend(message.display_lines(inner.width, self.show_timestamps));
            // spacing between messages
            all_lines.push(Line::from(""));
        }

        let height = inner.height as usize;
        let total = all_lines.len();
        self.max_scroll = total.saturating_sub(height);
        self.scrollback = self.scrollback.min(self.max_scroll);

        let start = total.saturating_sub(height + self.scrollback);
        let end = total - self.scrollback;
        frame.render_widget(Paragraph::new(all_lines[start..end].to_vec()), inner);

        if self.max_scroll > 0 {
            let mut scroll_state = ScrollbarState::new(self.max_scroll)
                .position(self.max_scroll - self.scrollback);
            frame.render_stateful_widget(
                Scrollbar::default()
                    .orientation(ScrollbarOrientation::VerticalRight)
                    .begin_symbol(Some("↑"))
                    .end_symbol(Some("↓")),
                area.inner(&Margin {
                    vertical: 1,
                    horizontal: 0,
                }),
                &mut scroll_state,
            );
        }
    }
}

fn welcome_lines() -> Vec<Line<'static>> {
    vec![
        Line::from(vec![Span::styled(
            "Welcome to askr! 💬",
            Style::default().fg(Color::Green),
        )]),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Type a question below to get started.",
            Style::default().fg(Color::Gray),
        )]),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Enter sends, Shift+Enter adds a line, PageUp/PageDown scroll, Esc quits.",
            Style::default().fg(Color::DarkGray),
        )]),
    ]
}
