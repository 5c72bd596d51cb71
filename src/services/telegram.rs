// src/services/telegram.rs

//! Minimal Telegram Bot API client.
//!
//! Covers the three methods the watcher needs: `sendMessage`,
//! `answerCallbackQuery` and long-polling `getUpdates`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{AppError, Result};
use crate::models::{Credentials, TelegramConfig};
use crate::services::callbacks::ActionEvent;
use crate::services::messenger::{Messenger, OutboundMessage, ParseMode};

/// Extra HTTP time on top of the long-poll window.
const LONG_POLL_GRACE_SECS: u64 = 10;

/// Envelope of every Bot API response.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

/// One entry returned by `getUpdates`.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub chat: Chat,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

impl CallbackQuery {
    /// Convert into a transport-neutral event. Queries without data are dropped.
    pub fn into_event(self) -> Option<ActionEvent> {
        let payload = self.data?;
        Some(ActionEvent {
            id: self.id,
            payload,
            chat_id: self.message.map(|m| m.chat.id.to_string()),
        })
    }
}

#[derive(Serialize)]
struct InlineKeyboardButton<'a> {
    text: &'a str,
    callback_data: &'a str,
}

#[derive(Serialize)]
struct InlineKeyboardMarkup<'a> {
    inline_keyboard: Vec<Vec<InlineKeyboardButton<'a>>>,
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<ParseMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<InlineKeyboardMarkup<'a>>,
}

impl<'a> From<&'a OutboundMessage> for SendMessage<'a> {
    fn from(message: &'a OutboundMessage) -> Self {
        Self {
            chat_id: &message.chat_id,
            text: &message.text,
            parse_mode: message.parse_mode,
            reply_markup: message.action.as_ref().map(|action| InlineKeyboardMarkup {
                inline_keyboard: vec![vec![InlineKeyboardButton {
                    text: &action.label,
                    callback_data: &action.payload,
                }]],
            }),
        }
    }
}

/// Bot API client bound to one bot token.
pub struct TelegramClient {
    client: Client,
    endpoint: String,
    long_poll_secs: u64,
}

impl TelegramClient {
    pub fn new(credentials: &Credentials, config: &TelegramConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(
                config.long_poll_secs + LONG_POLL_GRACE_SECS,
            ))
            .build()?;

        Ok(Self {
            client,
            endpoint: format!(
                "{}/bot{}",
                config.api_base.trim_end_matches('/'),
                credentials.bot_token
            ),
            long_poll_secs: config.long_poll_secs,
        })
    }

    /// Long-poll for callback-query updates starting at `offset`.
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>> {
        self.call(
            "getUpdates",
            &json!({
                "offset": offset,
                "timeout": self.long_poll_secs,
                "allowed_updates": ["callback_query"],
            }),
        )
        .await
    }

    async fn call<P, R>(&self, method: &str, params: &P) -> Result<R>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}/{}", self.endpoint, method);
        let body = self.client.post(&url).json(params).send().await?.text().await?;
        parse_response(method, &body)
    }
}

/// Unwrap a Bot API envelope, mapping `ok: false` to [`AppError::Telegram`].
fn parse_response<R: DeserializeOwned>(method: &str, body: &str) -> Result<R> {
    let response: ApiResponse<R> = serde_json::from_str(body)?;
    if !response.ok {
        return Err(AppError::telegram(
            method,
            response.description.unwrap_or_else(|| "unknown error".into()),
        ));
    }
    response
        .result
        .ok_or_else(|| AppError::telegram(method, "response without result"))
}

#[async_trait]
impl Messenger for TelegramClient {
    async fn send_message(&self, message: &OutboundMessage) -> Result<()> {
        let _: serde_json::Value = self
            .call("sendMessage", &SendMessage::from(message))
            .await?;
        Ok(())
    }

    async fn answer_action(&self, action_id: &str, text: &str) -> Result<()> {
        let _: bool = self
            .call(
                "answerCallbackQuery",
                &json!({ "callback_query_id": action_id, "text": text }),
            )
            .await?;
        Ok(())
    }
}
