//! Chat UI components

pub mod composer;
pub mod controller;
pub mod transcript;

pub use composer::Composer;
pub use controller::{ChatController, ERROR_TEXT};
pub use transcript::{Message, MessageId, PENDING_TEXT, RenderState, Sender, Transcript};
