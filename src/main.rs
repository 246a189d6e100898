//! pagewatch entry point
//!
//! Health responder on a spawned task, monitor loop on the main task. The
//! two share nothing but the shutdown controller.

use pagewatch::config::Config;
use pagewatch::fetch::PageFetcher;
use pagewatch::monitor::{Monitor, RetryPolicy};
use pagewatch::notify::TelegramNotifier;
use pagewatch::server;
use pagewatch::shutdown::{watch_signals, ShutdownController};
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        url = %config.target_url,
        interval_secs = config.poll_interval.as_secs(),
        port = config.port,
        render = config.render,
        "pagewatch starting"
    );

    if !config.notifications_enabled() {
        warn!("Bot token or chat id not set, change notifications are disabled");
    }

    let shutdown = ShutdownController::default();
    tokio::spawn(watch_signals(shutdown.clone()));

    // Bind before spawning so a bad port is a startup fatal, not a silent
    // panic inside the serve task.
    let listener = server::bind(config.port)
        .await
        .expect("Failed to bind health responder port");
    tokio::spawn(server::serve(listener, shutdown.clone()));

    let fetcher = PageFetcher::new(config.target_url.clone(), config.render);
    let notifier = TelegramNotifier::new(config.bot_token.clone(), config.chat_id.clone());
    let monitor = Monitor::new(
        fetcher,
        notifier,
        config.target_url.clone(),
        config.poll_interval,
        RetryPolicy::default(),
    );

    monitor.run(shutdown).await;

    info!("pagewatch stopped");
}
