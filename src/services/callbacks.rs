//! Handles presses of the "contact seller" button.

use std::sync::Arc;

use crate::error::Result;
use crate::models::MessagesConfig;
use crate::services::messenger::{Messenger, OutboundMessage};
use crate::storage::PendingActions;

/// An interactive-action press, independent of the messaging transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionEvent {
    /// Transport id used to acknowledge the press
    pub id: String,
    /// Opaque payload attached to the button
    pub payload: String,
    /// Chat the pressed message lives in, when known
    pub chat_id: Option<String>,
}

pub struct CallbackHandler {
    messenger: Arc<dyn Messenger>,
    pending: PendingActions,
    default_chat_id: String,
    action_prefix: String,
    messages: MessagesConfig,
}

impl CallbackHandler {
    pub fn new(
        messenger: Arc<dyn Messenger>,
        pending: PendingActions,
        default_chat_id: impl Into<String>,
        action_prefix: impl Into<String>,
        messages: MessagesConfig,
    ) -> Self {
        Self {
            messenger,
            pending,
            default_chat_id: default_chat_id.into(),
            action_prefix: action_prefix.into(),
            messages,
        }
    }

    /// Whether this handler is responsible for a payload.
    pub fn matches(&self, payload: &str) -> bool {
        payload.starts_with(&self.action_prefix)
    }

    /// Link registered for the payload's listing id, or the not-found text.
    pub fn resolve_link(&self, payload: &str) -> String {
        payload
            .strip_prefix(&self.action_prefix)
            .and_then(|id| self.pending.resolve(id))
            .unwrap_or_else(|| self.messages.link_not_found.clone())
    }

    /// Reply to a contact press. Errors are logged, never returned.
    ///
    /// Returns `false` when the payload belongs to another action.
    pub async fn handle(&self, event: &ActionEvent) -> bool {
        if !self.matches(&event.payload) {
            log::debug!("Ignoring action payload {:?}", event.payload);
            return false;
        }

        if let Err(e) = self.reply(event).await {
            log::error!("Failed to handle action {}: {}", event.payload, e);
        }
        true
    }

    async fn reply(&self, event: &ActionEvent) -> Result<()> {
        let link = self.resolve_link(&event.payload);
        let text = self
            .messages
            .contact_template
            .replace("{contact}", &self.messages.contact_message)
            .replace("{link}", &link);
        let chat_id = event
            .chat_id
            .clone()
            .unwrap_or_else(|| self.default_chat_id.clone());

        self.messenger
            .send_message(&OutboundMessage::plain(chat_id, text))
            .await?;
        self.messenger
            .answer_action(&event.id, &self.messages.contact_ack)
            .await?;

        log::info!("Answered contact request for {}", link);
        Ok(())
    }
}
