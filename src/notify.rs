//! Telegram通知
//!
//! Bot APIの `sendMessage` を直接叩く薄いクライアント。通知は
//! ベストエフォートで、失敗してもリトライしない（監視ループ側で
//! ログに残すのみ）。

use crate::error::NotifyError;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

/// 通知リクエストのタイムアウト（秒）
const NOTIFY_TIMEOUT_SECS: u64 = 10;

/// ログに残すレスポンス本文の最大長
const BODY_LOG_LIMIT: usize = 256;

/// Telegram Bot APIのベースURL
const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Delivers change notifications.
///
/// The monitor loop depends on this trait so tests can record sent messages
/// without network I/O.
#[async_trait]
pub trait Notify: Send {
    /// Send one message. 2xx from the provider is success; anything else is
    /// a reported failure. No retry.
    async fn send(&self, text: &str) -> Result<(), NotifyError>;
}

/// Telegram Bot API client
pub struct TelegramNotifier {
    client: Client,
    bot_token: String,
    chat_id: String,
    api_base: String,
}

impl TelegramNotifier {
    /// Create a notifier for the given credentials.
    ///
    /// Empty token or chat id is allowed; `send` then reports
    /// [`NotifyError::MissingCredentials`] without any network call.
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self::with_api_base(bot_token, chat_id, TELEGRAM_API_BASE)
    }

    /// Create a notifier against a custom API base URL (used by tests).
    pub fn with_api_base(
        bot_token: impl Into<String>,
        chat_id: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(NOTIFY_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
            api_base: api_base.into(),
        }
    }
}

#[async_trait]
impl Notify for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        if self.bot_token.is_empty() || self.chat_id.is_empty() {
            return Err(NotifyError::MissingCredentials);
        }

        let url = format!("{}/bot{}/sendMessage", self.api_base, self.bot_token);

        let response = self
            .client
            .post(&url)
            .json(&json!({
                "chat_id": self.chat_id,
                "text": text,
                "parse_mode": "HTML"
            }))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(NotifyError::Api {
                status,
                body: truncate(&body, BODY_LOG_LIMIT),
            })
        }
    }
}

/// Build the change notification message for the monitored URL.
///
/// HTML-formatted, with a local timestamp so the recipient can tell when the
/// change was observed.
pub fn change_message(url: &str) -> String {
    format!(
        "🎉 <b>Page updated!</b>\n\n🔗 Check now 👉\n{}\n\n⏰ {}",
        url,
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    )
}

fn truncate(text: &str, limit: usize) -> String {
    if text.len() <= limit {
        return text.to_string();
    }
    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}
