//! Question composer for user input.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

/// Tallest the composer grows before it scrolls internally.
const MAX_ROWS: u16 = 6;

/// Result returned when the user interacts with the composer
#[derive(Debug, PartialEq, Eq)]
pub enum ComposerResult {
    /// Enter was pressed on non-blank content; carries the trimmed text.
    /// The composer content is left for the caller to clear.
    Submitted(String),
    None,
}

/// Multi-line input box. Enter submits, Shift+Enter inserts a newline.
///
/// The cursor is tracked as a character offset, so multi-byte input moves
/// and deletes whole characters.
pub struct Composer {
    content: String,
    cursor: usize,
    placeholder: String,
    has_focus: bool,
}

impl Composer {
    pub fn new(placeholder: String) -> Self {
        Self {
            content: String::new(),
            cursor: 0,
            placeholder,
            has_focus: true,
        }
    }

    /// Handle key input
    pub fn handle_key(&mut self, key: KeyEvent) -> ComposerResult {
        if key.kind != KeyEventKind::Press {
            return ComposerResult::None;
        }

        match key.code {
            KeyCode::Enter => {
                if key.modifiers.contains(KeyModifiers::SHIFT) {
                    self.insert_char('\n');
                } else if !self.content.trim().is_empty() {
                    return ComposerResult::Submitted(self.content.trim().to_string());
                }
                // Blank content is left untouched: no submission, no clearing.
            }
            KeyCode::Char(c) => {
                self.insert_char(c);
            }
            KeyCode::Backspace => {
                self.backspace();
            }
            KeyCode::Delete => {
                self.delete();
            }
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
            }
            KeyCode::Right => {
                if self.cursor < self.char_count() {
                    self.cursor += 1;
                }
            }
            KeyCode::Home => {
                self.cursor = 0;
            }
            KeyCode::End => {
                self.cursor = self.char_count();
            }
            _ => {}
        }

        ComposerResult::None
    }

    /// Insert pasted text at the cursor.
    pub fn insert_str(&mut self, text: &str) {
        for c in text.chars() {
            self.insert_char(c);
        }
    }

    /// Get current content
    #[allow(dead_code)]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Clear content and collapse back to a single row.
    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
    }

    pub fn set_focus(&mut self, has_focus: bool) {
        self.has_focus = has_focus;
    }

    /// Rows of content currently held, capped at the growth limit.
    pub fn rows(&self) -> u16 {
        let rows = self.content.split('\n').count() as u16;
        rows.clamp(1, MAX_ROWS)
    }

    /// Total height including the border.
    pub fn height(&self) -> u16 {
        self.rows() + 2
    }

    fn insert_char(&mut self, c: char) {
        let at = self.byte_offset(self.cursor);
        self.content.insert(at, c);
        self.cursor += 1;
    }

    fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_offset(self.cursor);
            self.content.remove(at);
        }
    }

    fn delete(&mut self) {
        if self.cursor < self.char_count() {
            let at = self.byte_offset(self.cursor);
            self.content.remove(at);
        }
    }

    fn char_count(&self) -> usize {
        self.content.chars().count()
    }

    fn byte_offset(&self, char_pos: usize) -> usize {
        self.content
            .char_indices()
            .nth(char_pos)
            .map(|(offset, _)| offset)
            .unwrap_or(self.content.len())
    }

    /// Cursor position as (row, column) in characters. Counted in usize so
    /// pathologically long pasted lines cannot overflow.
    fn cursor_row_col(&self) -> (usize, usize) {
        let mut row = 0usize;
        let mut col = 0usize;
        for c in self.content.chars().take(self.cursor) {
            if c == '\n' {
                row += 1;
                col = 0;
            } else {
                col += 1;
            }
        }
        (row, col)
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Ask")
            .style(if self.has_focus {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::Gray)
            });
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if self.content.is_empty() {
            frame.render_widget(
                Paragraph::new(Line::from(vec![Span::styled(
                    self.placeholder.clone(),
                    Style::default().fg(Color::DarkGray),
                )])),
                inner,
            );
            if self.has_focus {
                frame.set_cursor(inner.x, inner.y);
            }
            return;
        }

        let (row, col) = self.cursor_row_col();

        // Keep the cursor row and column inside the visible window. The
        // offsets can exceed u16 for extreme input; the scroll amount is
        // saturated, while the on-screen deltas always fit the window.
        let row_offset = row.saturating_sub(inner.height.saturating_sub(1) as usize);
        let col_offset = col.saturating_sub(inner.width.saturating_sub(1) as usize);

        let lines: Vec<Line> = self
            .content
            .split('\n')
            .map(|line| Line::from(line.to_string()))
            .collect();

        let scroll_row = u16::try_from(row_offset).unwrap_or(u16::MAX);
        let scroll_col = u16::try_from(col_offset).unwrap_or(u16::MAX);
        frame.render_widget(
            Paragraph::new(lines).scroll((scroll_row, scroll_col)),
            inner,
        );

        if self.has_focus {
            frame.set_cursor(
                inner.x + (col - col_offset) as u16,
                inner.y + (row - row_offset) as u16,
            );
        }
    }
}
