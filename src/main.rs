//! Market Terminal
//!
//! Subscribes to the trade, depth, ticker and kline streams of one instrument
//! and renders them until Escape, `q` or Ctrl-C.

use std::fs::OpenOptions;
use std::sync::Mutex;

use tokio::sync::mpsc;
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use market_terminal::dashboard;
use market_terminal::input::{self, ExitReason};
use market_terminal::{Config, Dashboard, FeedMetrics, StreamManager, TerminalSink, WebSocketConnector};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;

    // stdout belongs to the dashboard, so logs go to a file
    init_logging(&config.log_file)?;

    let instrument = config.instrument()?;
    info!(
        instrument = %instrument,
        endpoint = %config.ws_endpoint,
        "Starting market terminal"
    );

    let metrics = FeedMetrics::new()?;
    let (message_tx, message_rx) = mpsc::unbounded_channel();
    let manager = StreamManager::from_config(WebSocketConnector, &config, metrics.clone());

    let mut feeds = Vec::new();
    for stream in instrument.stream_names(config.depth_params()) {
        let handle = manager.connect(&stream, dashboard::forwarder(message_tx.clone()))?;
        feeds.push(handle);
    }
    drop(message_tx);

    let mut sink = TerminalSink::enter(&format!("{} market terminal", instrument.display_symbol()))?;

    let (exit_tx, exit_rx) = mpsc::unbounded_channel();
    input::spawn_key_listener(exit_tx.clone())?;
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = exit_tx.send(ExitReason::Interrupt);
        }
    });

    let dashboard = Dashboard::new(&config, instrument, feeds, metrics);
    let result = dashboard.run(message_rx, exit_rx, &mut sink).await;
    drop(sink);

    match result {
        Ok(reason) => {
            info!(reason = %reason, "Market terminal stopped");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Market terminal failed");
            Err(e.into())
        }
    }
}

fn init_logging(path: &str) -> anyhow::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    tracing_subscriber::registry()
        .with(fmt::layer().json().with_writer(Mutex::new(file)))
        .with(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    Ok(())
}
