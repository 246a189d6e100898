//! ページ取得
//!
//! プレーンHTTP GETでページ本文を取得する。`PAGEWATCH_RENDER` 有効時は
//! ヘッドレスChromiumでスクリプト実行後のDOMを取得し、失敗した場合は
//! プレーンGETへ透過的にフォールバックする。
//!
//! フォールバックが連続する場合は通常経路との区別がつくように
//! warnログを出す。

use crate::error::FetchError;
use async_trait::async_trait;
use reqwest::Client;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

/// ページ取得のタイムアウト（秒）
const FETCH_TIMEOUT_SECS: u64 = 20;

/// レンダリング全体のタイムアウト
const RENDER_TIMEOUT: Duration = Duration::from_secs(30);

/// ネットワーク待ちに割り当てる仮想時間（ミリ秒）
const RENDER_VIRTUAL_TIME_BUDGET_MS: u32 = 10_000;

/// 連続フォールバックの警告しきい値
const FALLBACK_WARN_THRESHOLD: u32 = 3;

/// ブラウザらしいUser-Agent
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// PATH上で探すヘッドレスブラウザ（優先順）
const BROWSER_NAMES: [&str; 4] = ["chromium", "chromium-browser", "google-chrome", "chrome"];

/// Source of normalized page text.
///
/// The monitor loop only depends on this trait, so tests can drive it with
/// scripted in-memory content instead of real HTTP.
#[async_trait]
pub trait PageSource: Send {
    /// Fetch the page and return its normalized (trimmed) text.
    async fn fetch(&mut self) -> Result<String, FetchError>;
}

/// Fetches the monitored page over HTTP.
pub struct PageFetcher {
    client: Client,
    url: String,
    render: bool,
    /// Consecutive render failures since the last render success.
    render_fallbacks: u32,
}

impl PageFetcher {
    /// Create a fetcher for the given URL.
    ///
    /// `render` enables the headless-browser path; it degrades to the plain
    /// GET whenever rendering fails.
    pub fn new(url: impl Into<String>, render: bool) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            url: url.into(),
            render,
            render_fallbacks: 0,
        }
    }

    /// Plain GET of the target URL.
    ///
    /// Non-2xx statuses are failures; the body is trimmed of leading and
    /// trailing whitespace but otherwise hashed as-is.
    async fn fetch_plain(&self) -> Result<String, FetchError> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }
        let text = response.text().await?;
        Ok(text.trim().to_string())
    }

    /// Render the page through a system headless Chromium and dump the DOM.
    ///
    /// The virtual time budget lets in-page network activity settle before
    /// the dump; the outer timeout bounds the whole process.
    async fn fetch_rendered(&self) -> Result<String, FetchError> {
        let browser = find_browser().ok_or(FetchError::NoBrowser)?;

        let output = tokio::time::timeout(
            RENDER_TIMEOUT,
            Command::new(&browser)
                .arg("--headless=new")
                .arg("--disable-gpu")
                .arg("--no-sandbox")
                .arg(format!("--user-agent={}", USER_AGENT))
                .arg(format!(
                    "--virtual-time-budget={}",
                    RENDER_VIRTUAL_TIME_BUDGET_MS
                ))
                .arg("--dump-dom")
                .arg(&self.url)
                .stdout(Stdio::piped())
                .stderr(Stdio::null())
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| FetchError::RenderTimeout(RENDER_TIMEOUT))??;

        if !output.status.success() {
            return Err(FetchError::Render(format!(
                "exited with {}",
                output.status
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if text.is_empty() {
            return Err(FetchError::Render("empty document".to_string()));
        }
        Ok(text)
    }
}

#[async_trait]
impl PageSource for PageFetcher {
    async fn fetch(&mut self) -> Result<String, FetchError> {
        if !self.render {
            return self.fetch_plain().await;
        }

        match self.fetch_rendered().await {
            Ok(text) => {
                self.render_fallbacks = 0;
                Ok(text)
            }
            Err(e) => {
                self.render_fallbacks += 1;
                if self.render_fallbacks >= FALLBACK_WARN_THRESHOLD {
                    warn!(
                        consecutive = self.render_fallbacks,
                        error = %e,
                        "Render path keeps failing, serving plain fetches"
                    );
                } else {
                    debug!(error = %e, "Render failed, falling back to plain fetch");
                }
                self.fetch_plain().await
            }
        }
    }
}

/// Locate a headless browser binary on PATH.
fn find_browser() -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&path) {
        for name in BROWSER_NAMES {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }
    None
}
