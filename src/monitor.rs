//! 変更監視ループ
//!
//! 取得→ダイジェスト比較→通知を1イテレーションとして回す。比較ロジックは
//! [`Monitor::poll_once`] に隔離してあり、スリープもネットワークもなしで
//! 単体テストできる。リトライ方針は [`RetryPolicy`] として分離。
//!
//! ループは明示的なシャットダウン要求以外では終了しない。イテレーション内の
//! 失敗はすべてログに落として継続する。

use crate::digest::page_digest;
use crate::fetch::PageSource;
use crate::notify::{change_message, Notify};
use crate::shutdown::ShutdownController;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// バックオフのデフォルト（秒）
const DEFAULT_BACKOFF_SECS: u64 = 60;

/// 警告を出す連続失敗回数
const DEFAULT_MAX_CONSECUTIVE_FAILURES: u32 = 5;

/// Retry policy for fetch failures, separate from the compare-and-notify
/// logic so the loop body can be tested without sleeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Consecutive failures at which a repeated-failure warning is logged.
    pub max_consecutive_failures: u32,
    /// Delay before the next attempt after a fetch failure, distinct from
    /// the normal poll interval.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_consecutive_failures: DEFAULT_MAX_CONSECUTIVE_FAILURES,
            backoff: Duration::from_secs(DEFAULT_BACKOFF_SECS),
        }
    }
}

/// What a single monitor iteration did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// First successful fetch; digest stored, no notification.
    BaselineCaptured,
    /// Digest matches the baseline.
    Unchanged,
    /// Digest differs; a notification was attempted.
    Changed {
        /// Whether the notification was delivered.
        notified: bool,
    },
    /// Fetch failed; baseline untouched.
    FetchFailed {
        /// Consecutive failures including this one.
        consecutive: u32,
    },
}

/// Watches one page for content changes.
pub struct Monitor<S, N> {
    source: S,
    notifier: N,
    url: String,
    poll_interval: Duration,
    policy: RetryPolicy,
    baseline: Option<String>,
    consecutive_failures: u32,
}

impl<S: PageSource, N: Notify> Monitor<S, N> {
    /// Create a monitor over the given source and notifier.
    pub fn new(
        source: S,
        notifier: N,
        url: impl Into<String>,
        poll_interval: Duration,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            source,
            notifier,
            url: url.into(),
            poll_interval,
            policy,
            baseline: None,
            consecutive_failures: 0,
        }
    }

    /// Run one fetch/compare/notify iteration.
    ///
    /// Never panics and never returns an error: every failure inside the
    /// iteration is logged and folded into the outcome so the loop can
    /// always continue.
    pub async fn poll_once(&mut self) -> PollOutcome {
        let text = match self.source.fetch().await {
            Ok(text) => text,
            Err(e) => {
                self.consecutive_failures += 1;
                if self.consecutive_failures >= self.policy.max_consecutive_failures {
                    warn!(
                        failures = self.consecutive_failures,
                        error = %e,
                        "Repeated fetch failures, check the network or the target URL"
                    );
                } else {
                    warn!(
                        attempt = self.consecutive_failures,
                        error = %e,
                        "Fetch failed, retrying after backoff"
                    );
                }
                return PollOutcome::FetchFailed {
                    consecutive: self.consecutive_failures,
                };
            }
        };

        self.consecutive_failures = 0;
        let digest = page_digest(&text);

        match &self.baseline {
            None => {
                info!(digest = %&digest[..12], "Baseline captured");
                self.baseline = Some(digest);
                PollOutcome::BaselineCaptured
            }
            Some(previous) if *previous == digest => {
                debug!("No change");
                PollOutcome::Unchanged
            }
            Some(_) => {
                let notified = match self.notifier.send(&change_message(&self.url)).await {
                    Ok(()) => {
                        info!(digest = %&digest[..12], "Change detected, notification sent");
                        true
                    }
                    Err(e) => {
                        // Dropped notifications are surfaced here only; no retry.
                        error!(error = %e, "Change detected but notification failed");
                        false
                    }
                };
                self.baseline = Some(digest);
                PollOutcome::Changed { notified }
            }
        }
    }

    /// Delay to apply after the given outcome.
    fn delay_for(&self, outcome: &PollOutcome) -> Duration {
        match outcome {
            PollOutcome::FetchFailed { .. } => self.policy.backoff,
            _ => self.poll_interval,
        }
    }

    /// Run the monitor loop until shutdown is requested.
    pub async fn run(mut self, shutdown: ShutdownController) {
        info!(
            url = %self.url,
            interval_secs = self.poll_interval.as_secs(),
            "Monitor loop started"
        );

        while !shutdown.is_shutdown_requested() {
            let outcome = self.poll_once().await;
            let delay = self.delay_for(&outcome);

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = shutdown.wait() => break,
            }
        }

        info!("Monitor loop stopped");
    }
}
