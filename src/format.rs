//! Message text formatting for display.
//!
//! Two passes, always in this order: fenced code extraction first, then
//! newline-to-line-break conversion on everything that remains, fence
//! interiors included. Line structure inside a code block therefore
//! survives formatting.

use once_cell::sync::Lazy;
use regex::Regex;

/// Pair of triple-backtick fences with everything between them, newlines
/// included. Non-greedy, so an unpaired trailing fence stays literal text.
static FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```(.*?)```").expect("fence pattern compiles")
});

/// A run of display lines produced by [`format_text`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// Regular text, one entry per display line.
    Text(Vec<String>),
    /// Interior of a fenced span, kept verbatim line by line.
    Code(Vec<String>),
}

impl Block {
    #[allow(dead_code)]
    pub fn is_code(&self) -> bool {
        matches!(self, Block::Code(_))
    }

    #[allow(dead_code)]
    pub fn lines(&self) -> &[String] {
        match self {
            Block::Text(lines) | Block::Code(lines) => lines,
        }
    }
}

/// Split raw message text into display blocks.
///
/// Applying the transform to any single output line reproduces that line,
/// so re-rendering a message never changes what is shown.
pub fn format_text(input: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut cursor = 0;

    for captures in FENCE.captures_iter(input) {
        let (whole, inner) = match (captures.get(0), captures.get(1)) {
            (Some(whole), Some(inner)) => (whole, inner),
            _ => continue,
        };
        push_text(&mut blocks, &input[cursor..whole.start()]);
        blocks.push(Block::Code(split_lines(inner.as_str())));
        cursor = whole.end();
    }

    push_text(&mut blocks, &input[cursor..]);
    blocks
}

fn push_text(blocks: &mut Vec<Block>, segment: &str) {
    if !segment.is_empty() {
        blocks.push(Block::Text(split_lines(segment)));
    }
}

/// Each newline is a line break; a trailing newline yields a trailing
/// empty line, which renders as a blank row.
fn split_lines(segment: &str) -> Vec<String> {
    segment.split('\n').map(str::to_string).collect()
}
