use std::sync::Arc;

use kioskfeed_core::sequencer::DisplaySequencer;
use kioskfeed_display::{
    pull::PullClient,
    push::PushClient,
    render::TracingRenderer,
    runner::{DisplayCommand, DisplayRunner, RunnerChannels},
    DisplayConfig,
};
use tokio::sync::mpsc;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

fn init_tracing() {
    let log_format = std::env::var("KIOSK_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry.with(fmt::layer().with_target(true)).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = DisplayConfig::from_env()?;
    init_tracing();

    let (pushed_tx, pushed_rx) = mpsc::channel(64);
    let (push_client, status_rx) = PushClient::new(config.push_url()?, pushed_tx);
    let push_client = push_client.with_idle_timeout(config.push_idle_timeout);
    tokio::spawn(push_client.run());

    let (commands_tx, commands_rx) = mpsc::channel(8);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = commands_tx.send(DisplayCommand::Shutdown).await;
        }
    });

    let runner = DisplayRunner::new(
        DisplaySequencer::new(),
        Arc::new(TracingRenderer),
        PullClient::new(config.latest_url(), config.pull_timeout)?,
        config.display_duration,
        config.poll_interval,
    );
    tracing::info!("Kiosk display following {}", config.server_url);

    runner
        .run(RunnerChannels {
            pushed: pushed_rx,
            status: status_rx,
            commands: commands_rx,
        })
        .await;
    Ok(())
}
