//! pagewatch
//!
//! 単一ページの変更監視とTelegram通知
//!
//! Polls one web page on a fixed interval, hashes the content, and sends a
//! Telegram message when the digest changes. A tiny axum responder exposes
//! `/` and `/health` so an external pinger can keep the process alive.

#![warn(missing_docs)]

/// 設定管理（環境変数ヘルパー）
pub mod config;

/// ページ内容のダイジェスト計算
pub mod digest;

/// エラー型定義
pub mod error;

/// ページ取得（プレーンGET / ヘッドレスレンダリング）
pub mod fetch;

/// 変更監視ループ
pub mod monitor;

/// Telegram通知
pub mod notify;

/// ヘルスエンドポイント（axum）
pub mod server;

/// 協調シャットダウン
pub mod shutdown;
