//! Best-effort outbound notifications.
//!
//! Order handlers enqueue a message and move on; a single worker task drains
//! the queue and talks to the Telegram API. The queue is bounded, so a slow
//! or unreachable API cannot pile up in-flight sends: once the queue is full,
//! new messages are dropped with a warning. Failures are logged, never
//! retried and never surfaced to the HTTP caller.

mod telegram;

use std::time::Duration;

use tokio::sync::mpsc;

pub use telegram::TelegramConfig;

const QUEUE_CAPACITY: usize = 64;
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct Notifier {
    tx: mpsc::Sender<String>,
}

impl Notifier {
    /// Queue half without a worker; the receiver observes every enqueued
    /// message. Used by tests and by [`Notifier::spawn`].
    #[must_use]
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    /// Starts the consumer worker on the current tokio runtime. The worker
    /// exits once every `Notifier` clone is dropped and the queue is drained.
    #[must_use]
    pub fn spawn(config: TelegramConfig) -> Self {
        let (notifier, rx) = Self::channel(QUEUE_CAPACITY);
        tokio::spawn(worker(config, rx));
        notifier
    }

    /// Non-blocking enqueue; drops the message when the queue is full.
    pub fn notify(&self, text: impl Into<String>) {
        if self.tx.try_send(text.into()).is_err() {
            tracing::warn!("notification queue full, dropping message");
        }
    }
}

async fn worker(config: TelegramConfig, mut rx: mpsc::Receiver<String>) {
    let client = match reqwest::Client::builder().timeout(SEND_TIMEOUT).build() {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("notification client init failed: {e}");
            return;
        }
    };

    let mut chat_id: Option<String> = None;
    while let Some(text) = rx.recv().await {
        if config.bot_token.is_empty() {
            tracing::warn!("telegram not configured, dropping notification");
            continue;
        }
        if chat_id.is_none() {
            chat_id = telegram::resolve_chat_id(&client, &config).await;
        }
        let Some(chat) = chat_id.as_deref() else {
            tracing::warn!("telegram chat id unresolved, dropping notification");
            continue;
        };
        if let Err(e) = telegram::send_message(&client, &config.bot_token, chat, &text).await {
            tracing::warn!("telegram send failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_notify_delivers_to_queue() {
        let (notifier, mut rx) = Notifier::channel(4);
        notifier.notify("привет");
        assert_eq!(rx.recv().await.as_deref(), Some("привет"));
    }

    #[tokio::test]
    async fn test_overflow_drops_instead_of_blocking() {
        let (notifier, mut rx) = Notifier::channel(1);
        notifier.notify("first");
        notifier.notify("second"); // dropped, queue is full
        assert_eq!(rx.recv().await.as_deref(), Some("first"));
        assert!(rx.try_recv().is_err());
    }
}
