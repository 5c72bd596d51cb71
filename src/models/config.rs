//! Application configuration structures.

use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::ListingSelectors;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP fetch behavior
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Search pages to rotate through
    #[serde(default)]
    pub search: SearchConfig,

    /// CSS selectors for listing cards
    #[serde(default)]
    pub selectors: ListingSelectors,

    /// Poll interval and retry settings
    #[serde(default)]
    pub poll: PollConfig,

    /// Seen-link persistence
    #[serde(default)]
    pub storage: StorageConfig,

    /// Telegram Bot API settings
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// User-facing message texts
    #[serde(default)]
    pub messages: MessagesConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.search.urls.is_empty() {
            return Err(AppError::validation("No search URLs defined"));
        }
        for url in &self.search.urls {
            url::Url::parse(url)
                .map_err(|e| AppError::validation(format!("search URL {url:?}: {e}")))?;
        }
        url::Url::parse(&self.search.base_url)
            .map_err(|e| AppError::validation(format!("search.base_url: {e}")))?;
        if self.search.max_listings == 0 {
            return Err(AppError::validation("search.max_listings must be > 0"));
        }
        if self.telegram.long_poll_secs == 0 {
            return Err(AppError::validation("telegram.long_poll_secs must be > 0"));
        }
        if self.telegram.action_prefix.is_empty() {
            return Err(AppError::validation("telegram.action_prefix is empty"));
        }
        if self.storage.links_file.trim().is_empty() {
            return Err(AppError::validation("storage.links_file is empty"));
        }
        self.selectors.compile()?;
        Ok(())
    }
}

/// HTTP client settings for search page fetches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Search pages and per-page extraction limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Search-result pages, visited in order and then from the start again
    #[serde(default = "defaults::search_urls")]
    pub urls: Vec<String>,

    /// Marketplace origin used to absolutize relative listing links
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Maximum listing cards read from one page
    #[serde(default = "defaults::max_listings")]
    pub max_listings: usize,

    /// Appended to the raw price value
    #[serde(default = "defaults::currency_suffix")]
    pub currency_suffix: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            urls: defaults::search_urls(),
            base_url: defaults::base_url(),
            max_listings: defaults::max_listings(),
            currency_suffix: defaults::currency_suffix(),
        }
    }
}

/// Poll loop timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Pause between two successful cycles
    #[serde(default = "defaults::interval")]
    pub interval_secs: u64,

    /// Pause after a failed cycle
    #[serde(default = "defaults::retry_delay")]
    pub retry_delay_secs: u64,

    /// Random extra added to the retry pause, in milliseconds
    #[serde(default)]
    pub jitter_ms: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: defaults::interval(),
            retry_delay_secs: defaults::retry_delay(),
            jitter_ms: 0,
        }
    }
}

/// Seen-link file location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "defaults::links_file")]
    pub links_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            links_file: defaults::links_file(),
        }
    }
}

/// Telegram Bot API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// API origin (overridable for self-hosted Bot API servers)
    #[serde(default = "defaults::api_base")]
    pub api_base: String,

    /// `getUpdates` long-poll timeout in seconds
    #[serde(default = "defaults::long_poll")]
    pub long_poll_secs: u64,

    /// Callback payload prefix for the contact action
    #[serde(default = "defaults::action_prefix")]
    pub action_prefix: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_base: defaults::api_base(),
            long_poll_secs: defaults::long_poll(),
            action_prefix: defaults::action_prefix(),
        }
    }
}

/// Message texts and templates.
///
/// `listing_template` supports `{title}`, `{price}`, `{date}`, `{rating}`,
/// `{link}` and `{id}`. `contact_template` supports `{contact}` and `{link}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesConfig {
    #[serde(default = "defaults::listing_template")]
    pub listing_template: String,
    #[serde(default = "defaults::contact_label")]
    pub contact_label: String,
    #[serde(default = "defaults::contact_message")]
    pub contact_message: String,
    #[serde(default = "defaults::contact_template")]
    pub contact_template: String,
    #[serde(default = "defaults::contact_ack")]
    pub contact_ack: String,
    #[serde(default = "defaults::link_not_found")]
    pub link_not_found: String,
    #[serde(default = "defaults::date_missing")]
    pub date_missing: String,
    #[serde(default = "defaults::rating_missing")]
    pub rating_missing: String,
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            listing_template: defaults::listing_template(),
            contact_label: defaults::contact_label(),
            contact_message: defaults::contact_message(),
            contact_template: defaults::contact_template(),
            contact_ack: defaults::contact_ack(),
            link_not_found: defaults::link_not_found(),
            date_missing: defaults::date_missing(),
            rating_missing: defaults::rating_missing(),
        }
    }
}

/// Bot secrets, read from the environment rather than the config file.
#[derive(Clone)]
pub struct Credentials {
    pub bot_token: String,
    pub chat_id: String,
}

impl Credentials {
    pub const TOKEN_VAR: &'static str = "BOT_TOKEN";
    pub const CHAT_VAR: &'static str = "CHAT_ID";

    /// Read `BOT_TOKEN` and `CHAT_ID`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let fetch = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| AppError::config(format!("{key} is not set")))
        };
        Ok(Self {
            bot_token: fetch(Self::TOKEN_VAR)?,
            chat_id: fetch(Self::CHAT_VAR)?,
        })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

mod defaults {
    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/110.0.0.0 Safari/537.36".into()
    }
    pub fn timeout() -> u64 {
        50
    }

    // Search defaults
    pub fn search_urls() -> Vec<String> {
        vec![
            "https://www.avito.ru/all/tovary_dlya_kompyutera/komplektuyuschie/materinskie_platy-ASgBAgICAkTGB~pm7gnOZw?cd=1&q=am4&s=104".into(),
            "https://www.avito.ru/all/tovary_dlya_kompyutera?f=ASgBAQECAUTyig6kgpQBAUCCoRI1DFJ5emVuIDUgMjYwMApyeXplbiAyNjAwBDI2MDABRcaaDBR7ImZyb20iOjUwMDAsInRvIjowfQ&s=104".into(),
            "https://www.avito.ru/all/tovary_dlya_kompyutera/komplektuyuschie/videokarty-ASgBAgICAkTGB~pm7gmmZw?cd=1&f=ASgBAQICAkTGB~pm7gmmZwFAgqESJQxndHggMTA2MCA2Z2IEMTA2MA&s=104".into(),
            "https://www.avito.ru/all/tovary_dlya_kompyutera/komplektuyuschie/videokarty-ASgBAgICAkTGB~pm7gmmZw?cd=1&f=ASgBAgECAkTGB~pm7gmmZwJFxpoMGHsiZnJvbSI6NTAwMCwidG8iOjE0MDAwfYKhEgYiMTY2MCI&s=104".into(),
            "https://www.avito.ru/all/tovary_dlya_kompyutera?cd=1&f=ASgCAgECAkXGmgwYeyJmcm9tIjo1MDAwLCJ0byI6MTgwMDB9gqESCyJpMy0xMjEwMGYi&q=комплект+i3+12100f&s=104".into(),
        ]
    }
    pub fn base_url() -> String {
        "https://www.avito.ru".into()
    }
    pub fn max_listings() -> usize {
        15
    }
    pub fn currency_suffix() -> String {
        "₽".into()
    }

    // Poll defaults
    pub fn interval() -> u64 {
        60
    }
    pub fn retry_delay() -> u64 {
        60
    }

    // Storage defaults
    pub fn links_file() -> String {
        "processed_links.txt".into()
    }

    // Telegram defaults
    pub fn api_base() -> String {
        "https://api.telegram.org".into()
    }
    pub fn long_poll() -> u64 {
        30
    }
    pub fn action_prefix() -> String {
        "contact_".into()
    }

    // Message defaults
    pub fn listing_template() -> String {
        "*{title}*\nPrice: {price}\nPosted: {date}\nSeller rating: {rating}\n[Open listing]({link})"
            .into()
    }
    pub fn contact_label() -> String {
        "Contact seller".into()
    }
    pub fn contact_message() -> String {
        "Hello! I'm interested in your listing. Is it still available?".into()
    }
    pub fn contact_template() -> String {
        "Prefilled message: {contact}\nYou can contact the seller here: {link}".into()
    }
    pub fn contact_ack() -> String {
        "Message sent!".into()
    }
    pub fn link_not_found() -> String {
        "Link not found".into()
    }
    pub fn date_missing() -> String {
        "Date not specified".into()
    }
    pub fn rating_missing() -> String {
        "Rating not specified".into()
    }
}
