//! Service layer for the watcher.
//!
//! This module contains the business logic for:
//! - Listing extraction (`ListingExtractor`, `PageSource`)
//! - New-listing announcements (`Notifier`)
//! - Contact button presses (`CallbackHandler`)
//! - The Telegram transport (`TelegramClient`)

mod callbacks;
mod listings;
mod messenger;
mod notifier;
pub mod telegram;

#[cfg(test)]
pub(crate) mod testing;

pub use callbacks::{ActionEvent, CallbackHandler};
pub use listings::{HttpPageSource, ListingExtractor, PageSource};
pub use messenger::{InlineAction, Messenger, OutboundMessage, ParseMode};
pub use notifier::Notifier;
pub use telegram::TelegramClient;
