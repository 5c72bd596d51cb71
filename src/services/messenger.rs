//! Outbound messaging seam.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::Result;

/// Markup dialect of a message body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParseMode {
    Markdown,
}

/// A button attached to a message whose press comes back as an [`ActionEvent`].
///
/// [`ActionEvent`]: crate::services::ActionEvent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineAction {
    pub label: String,
    pub payload: String,
}

/// A message to deliver to one chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub chat_id: String,
    pub text: String,
    pub parse_mode: Option<ParseMode>,
    pub action: Option<InlineAction>,
}

impl OutboundMessage {
    /// Plain text message without markup or buttons.
    pub fn plain(chat_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            text: text.into(),
            parse_mode: None,
            action: None,
        }
    }
}

/// Messaging backend used by the notifier and the callback handler.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Deliver a message.
    async fn send_message(&self, message: &OutboundMessage) -> Result<()>;

    /// Acknowledge an interactive action with a short toast.
    async fn answer_action(&self, action_id: &str, text: &str) -> Result<()>;
}
