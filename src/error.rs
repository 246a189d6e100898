//! エラー型定義
//!
//! 統一エラー型（thiserror使用）

use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

/// Page fetch error type
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP transport error (connect, timeout, body read)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Target returned a non-2xx status
    #[error("unexpected status: {0}")]
    Status(StatusCode),

    /// No headless browser binary found on PATH
    #[error("no headless browser found on PATH")]
    NoBrowser,

    /// Renderer process failed
    #[error("renderer failed: {0}")]
    Render(String),

    /// Renderer did not finish within the budget
    #[error("renderer timed out after {0:?}")]
    RenderTimeout(Duration),

    /// I/O error while spawning the renderer
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Notification delivery error type
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Bot token or chat id is not configured; no network call was made
    #[error("bot token or chat id not set, notification skipped")]
    MissingCredentials,

    /// HTTP transport error talking to the messaging API
    #[error("notification request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Messaging API returned a non-2xx status
    #[error("messaging API returned {status}: {body}")]
    Api {
        /// HTTP status from the provider
        status: StatusCode,
        /// Response body, truncated for logging
        body: String,
    },
}
