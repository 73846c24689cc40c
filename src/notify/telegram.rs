//! Thin Telegram Bot API client used by the notification worker.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::json;

// Build-time fallbacks for deployments that bake credentials in. Empty means
// "rely on the environment, then on chat discovery".
const DEFAULT_BOT_TOKEN: &str = "";
const DEFAULT_CHAT_ID: &str = "";

const CHAT_ID_CACHE_FILE: &str = "telegram_chat_id.txt";

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
    /// Where a discovered chat id is cached between runs.
    pub chat_id_cache: PathBuf,
}

impl TelegramConfig {
    /// Env vars first, embedded defaults second; an empty chat id is
    /// resolved later through `getUpdates` discovery.
    #[must_use]
    pub fn from_env(data_dir: &Path) -> Self {
        Self {
            bot_token: env_or_default("TELEGRAM_BOT_TOKEN", DEFAULT_BOT_TOKEN),
            chat_id: env_or_default("TELEGRAM_CHAT_ID", DEFAULT_CHAT_ID),
            chat_id_cache: data_dir.join(CHAT_ID_CACHE_FILE),
        }
    }

    /// Config that never sends anything; handy for tests and local runs.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            bot_token: String::new(),
            chat_id: String::new(),
            chat_id_cache: PathBuf::from(CHAT_ID_CACHE_FILE),
        }
    }
}

fn env_or_default(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

pub(super) async fn send_message(
    client: &reqwest::Client,
    bot_token: &str,
    chat_id: &str,
    text: &str,
) -> Result<(), reqwest::Error> {
    let url = format!("https://api.telegram.org/bot{bot_token}/sendMessage");
    client
        .post(&url)
        .json(&json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "HTML",
        }))
        .send()
        .await?
        .error_for_status()?;
    Ok(())
}

#[derive(Debug, Default, Deserialize)]
struct UpdatesResponse {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    result: Vec<Update>,
}

#[derive(Debug, Default, Deserialize)]
struct Update {
    #[serde(default)]
    message: Message,
}

#[derive(Debug, Default, Deserialize)]
struct Message {
    #[serde(default)]
    chat: Chat,
}

#[derive(Debug, Default, Deserialize)]
struct Chat {
    #[serde(default)]
    id: i64,
}

/// Configured chat id, cached discovery result, or a one-time `getUpdates`
/// call whose answer is written to the cache file. `None` disables sending.
pub(super) async fn resolve_chat_id(
    client: &reqwest::Client,
    config: &TelegramConfig,
) -> Option<String> {
    if !config.chat_id.is_empty() {
        return Some(config.chat_id.clone());
    }

    if let Ok(cached) = fs::read_to_string(&config.chat_id_cache) {
        let cached = cached.trim();
        if !cached.is_empty() {
            return Some(cached.to_string());
        }
    }

    let url = format!("https://api.telegram.org/bot{}/getUpdates", config.bot_token);
    let updates: UpdatesResponse = match client.get(&url).send().await {
        Ok(resp) => match resp.json().await {
            Ok(updates) => updates,
            Err(e) => {
                tracing::warn!("telegram getUpdates decode error: {e}");
                return None;
            }
        },
        Err(e) => {
            tracing::warn!("telegram getUpdates error: {e}");
            return None;
        }
    };

    if !updates.ok || updates.result.is_empty() {
        tracing::warn!("telegram getUpdates has no chats; message the bot once to initialize");
        return None;
    }

    let chat_id = updates.result[updates.result.len() - 1].message.chat.id.to_string();
    if let Err(e) = fs::write(&config.chat_id_cache, &chat_id) {
        tracing::warn!("failed to cache telegram chat id: {e}");
    }
    Some(chat_id)
}
