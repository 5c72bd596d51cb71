//! Long-polls for button presses and hands them to the callback handler.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::pipeline::RetryPolicy;
use crate::services::telegram::Update;
use crate::services::{CallbackHandler, TelegramClient};

/// Source of bot updates.
#[async_trait]
pub trait UpdateFeed: Send + Sync {
    /// Updates with `update_id >= offset`, waiting up to the long-poll window.
    async fn updates(&self, offset: i64) -> Result<Vec<Update>>;
}

#[async_trait]
impl UpdateFeed for TelegramClient {
    async fn updates(&self, offset: i64) -> Result<Vec<Update>> {
        self.get_updates(offset).await
    }
}

pub struct ActionListener {
    feed: Arc<dyn UpdateFeed>,
    handler: CallbackHandler,
    offset: i64,
    retry: RetryPolicy,
}

impl ActionListener {
    pub fn new(feed: Arc<dyn UpdateFeed>, handler: CallbackHandler, retry: RetryPolicy) -> Self {
        Self {
            feed,
            handler,
            offset: 0,
            retry,
        }
    }

    /// Next update id to request.
    pub fn offset(&self) -> i64 {
        self.offset
    }

    /// Fetch one batch of updates and handle it. Returns the handled count.
    pub async fn poll_once(&mut self) -> Result<usize> {
        let updates = self.feed.updates(self.offset).await?;
        Ok(self.dispatch(updates).await)
    }

    /// Handle callback queries in arrival order and advance the offset past
    /// every update, handled or not.
    pub async fn dispatch(&mut self, updates: Vec<Update>) -> usize {
        let mut handled = 0;
        for update in updates {
            self.offset = self.offset.max(update.update_id + 1);

            let Some(event) = update.callback_query.and_then(|q| q.into_event()) else {
                continue;
            };
            if self.handler.handle(&event).await {
                handled += 1;
            }
        }
        handled
    }

    /// Run until the task is dropped.
    pub async fn run(mut self) {
        log::info!("Listening for contact button presses");
        loop {
            if let Err(e) = self.poll_once().await {
                let delay = self.retry.next_delay();
                log::error!("Fetching updates failed: {}. Retrying in {}s", e, delay.as_secs());
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::MessagesConfig;
    use crate::services::telegram::{CallbackQuery, Chat, Message};
    use crate::services::testing::RecordingMessenger;
    use crate::storage::PendingActions;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    #[derive(Default)]
    struct ScriptedFeed {
        batches: Mutex<VecDeque<Result<Vec<Update>>>>,
        offsets: Mutex<Vec<i64>>,
    }

    #[async_trait]
    impl UpdateFeed for ScriptedFeed {
        async fn updates(&self, offset: i64) -> Result<Vec<Update>> {
            self.offsets.lock().unwrap().push(offset);
            self.batches
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    fn press(update_id: i64, data: &str) -> Update {
        Update {
            update_id,
            callback_query: Some(CallbackQuery {
                id: format!("q{update_id}"),
                data: Some(data.to_string()),
                message: Some(Message {
                    chat: Chat { id: 42 },
                }),
            }),
        }
    }

    fn listener(feed: Arc<ScriptedFeed>, messenger: Arc<RecordingMessenger>) -> ActionListener {
        let pending = PendingActions::new();
        pending.register("1", "https://x/item_1");
        let handler = CallbackHandler::new(
            messenger,
            pending,
            "-1001",
            "contact_",
            MessagesConfig::default(),
        );
        ActionListener::new(feed, handler, RetryPolicy::none())
    }

    #[tokio::test]
    async fn test_dispatch_handles_contact_presses() {
        let messenger = Arc::new(RecordingMessenger::new());
        let mut listener = listener(Arc::new(ScriptedFeed::default()), messenger.clone());

        let updates = vec![
            press(5, "contact_1"),
            press(6, "other_1"),
            Update {
                update_id: 7,
                callback_query: None,
            },
        ];
        let handled = listener.dispatch(updates).await;

        assert_eq!(handled, 1);
        assert_eq!(listener.offset(), 8);
        let sent = messenger.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].chat_id, "42");
        assert!(sent[0].text.ends_with("https://x/item_1"));
    }

    #[tokio::test]
    async fn test_poll_once_advances_offset() {
        let feed = Arc::new(ScriptedFeed::default());
        feed.batches
            .lock()
            .unwrap()
            .extend([Ok(vec![press(10, "contact_1")]), Ok(Vec::new())]);
        let messenger = Arc::new(RecordingMessenger::new());
        let mut listener = listener(feed.clone(), messenger.clone());

        assert_eq!(listener.poll_once().await.unwrap(), 1);
        assert_eq!(listener.poll_once().await.unwrap(), 0);
        assert_eq!(*feed.offsets.lock().unwrap(), vec![0, 11]);
    }

    #[tokio::test]
    async fn test_poll_once_reports_feed_error() {
        let feed = Arc::new(ScriptedFeed::default());
        feed.batches
            .lock()
            .unwrap()
            .push_back(Err(AppError::telegram("getUpdates", "Conflict")));
        let mut listener = listener(feed, Arc::new(RecordingMessenger::new()));

        assert!(listener.poll_once().await.is_err());
        assert_eq!(listener.offset(), 0);
    }
}
