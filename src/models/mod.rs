// src/models/mod.rs

//! Domain models for the watcher.

mod config;
mod listing;
mod selectors;

// Re-export all public types
pub use config::{
    Config, CrawlerConfig, Credentials, MessagesConfig, PollConfig, SearchConfig, StorageConfig,
    TelegramConfig,
};
pub use listing::{Listing, escape_markdown};
pub use selectors::{CompiledSelectors, ListingSelectors};
