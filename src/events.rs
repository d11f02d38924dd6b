use crate::ui::chat::MessageId;

/// Internal application events for coordinating between components
#[derive(Debug)]
pub enum AppEvent {
    /// Outcome of one ask request, addressed to the pending message it
    /// belongs to. Replies may arrive in any order.
    Reply {
        id: MessageId,
        result: anyhow::Result<String>,
    },
}

/// TUI-specific events forwarded from the terminal reader task
#[derive(Debug)]
pub enum TuiEvent {
    /// Key press event
    Key(crossterm::event::KeyEvent),

    /// Bracketed paste
    Paste(String),

    /// Terminal resize
    Resize,

    /// Periodic redraw tick
    Tick,
}
