//! ヘルスエンドポイント
//!
//! 外部の稼働監視pingに2xxを返すためだけの2ルート。監視ループとは
//! 状態を共有しない。
//!
//! リスナーのバインドは [`bind`] として分離してあり、`main` が起動時に
//! 実行する。バインド失敗はバックグラウンドタスク内で握り潰さず、
//! 起動時の致命的エラーとして扱う。

use crate::shutdown::ShutdownController;
use axum::{routing::get, Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tracing::info;

/// Static status payload for the liveness routes.
#[derive(Debug, Serialize)]
struct StatusResponse {
    status: &'static str,
}

/// GET /
async fn root() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "pagewatch is running",
    })
}

/// GET /health
async fn health() -> Json<StatusResponse> {
    Json(StatusResponse { status: "alive" })
}

/// Build the health responder routes.
pub fn router() -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
}

/// Bind the health responder listener.
///
/// Called from `main` before the serve task is spawned so that a bind
/// failure aborts startup instead of panicking inside a background task.
pub async fn bind(port: u16) -> std::io::Result<TcpListener> {
    TcpListener::bind(format!("0.0.0.0:{}", port)).await
}

/// Serve the health responder on an already-bound listener until shutdown
/// is requested.
pub async fn serve(listener: TcpListener, shutdown: ShutdownController) {
    if let Ok(addr) = listener.local_addr() {
        info!("Health responder listening on {}", addr);
    }

    axum::serve(listener, router())
        .with_graceful_shutdown(async move { shutdown.wait().await })
        .await
        .expect("Server error");

    info!("Health responder shutdown complete");
}
