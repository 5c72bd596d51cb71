//! Announces new listings to the configured chat.

use std::sync::Arc;

use crate::models::{Listing, MessagesConfig};
use crate::services::messenger::{InlineAction, Messenger, OutboundMessage, ParseMode};
use crate::storage::PendingActions;

/// Sends one message per new listing with a "contact seller" button.
pub struct Notifier {
    messenger: Arc<dyn Messenger>,
    pending: PendingActions,
    chat_id: String,
    action_prefix: String,
    messages: MessagesConfig,
}

impl Notifier {
    pub fn new(
        messenger: Arc<dyn Messenger>,
        pending: PendingActions,
        chat_id: impl Into<String>,
        action_prefix: impl Into<String>,
        messages: MessagesConfig,
    ) -> Self {
        Self {
            messenger,
            pending,
            chat_id: chat_id.into(),
            action_prefix: action_prefix.into(),
            messages,
        }
    }

    /// Build the outgoing message for a listing.
    pub fn render(&self, listing: &Listing) -> OutboundMessage {
        OutboundMessage {
            chat_id: self.chat_id.clone(),
            text: listing.format(&self.messages.listing_template),
            parse_mode: Some(ParseMode::Markdown),
            action: Some(InlineAction {
                label: self.messages.contact_label.clone(),
                payload: format!("{}{}", self.action_prefix, listing.id),
            }),
        }
    }

    /// Register the listing for callbacks and send it.
    ///
    /// Delivery errors are logged and swallowed; the return value tells
    /// whether the message went out.
    pub async fn notify(&self, listing: &Listing) -> bool {
        self.pending.register(&listing.id, &listing.link);

        let message = self.render(listing);
        match self.messenger.send_message(&message).await {
            Ok(()) => {
                log::info!("Notified: {} ({})", listing.title, listing.link);
                true
            }
            Err(e) => {
                log::error!("Failed to send listing {}: {}", listing.link, e);
                false
            }
        }
    }
}
