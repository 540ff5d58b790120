// tirc - terminal IRC client
//
// Architecture:
// - Session controller: multi-channel state machine (registry, navigation,
//   command dispatch), mutated only from the TUI event loop
// - Transport (tokio): one task per connection, talks IRC over TCP/TLS and
//   exchanges typed events with the session over mpsc channels
// - TUI (ratatui): renders session snapshots, owns keyboard input
// - Logging: tracing captured to an in-memory buffer, optionally to
//   rotating files

mod cli;
mod config;
mod events;
mod logging;
mod session;
mod transport;
mod tui;

use anyhow::Result;
use config::{Config, LogRotation};
use logging::{LogBuffer, TuiLogLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Subcommands (config --show etc.) run and exit before any TUI setup
    let Some(args) = cli::handle_cli() else {
        return Ok(());
    };

    let had_config = Config::config_path().map(|p| p.exists()).unwrap_or(false);
    let config = Config::load();

    let log_buffer = LogBuffer::new();
    // The guard must stay alive until exit so buffered file writes flush
    let _file_guard = init_tracing(&config, log_buffer.clone());

    tracing::info!("tirc {} starting", config::VERSION);

    // First run (or --setup) walks through the wizard; otherwise connect
    // straight away with the saved configuration
    let skip_setup = had_config && !args.setup;
    tui::run_tui(config, log_buffer, skip_setup).await?;

    tracing::info!("goodbye");
    Ok(())
}

/// Wire up tracing: logs always go to the in-memory buffer so the TUI can
/// show them without garbling the alternate screen; file logging is layered
/// on top when enabled. RUST_LOG overrides the configured level.
fn init_tracing(
    config: &Config,
    log_buffer: LogBuffer,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let default_filter = format!("tirc={}", config.logging.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());

    if config.logging.file_enabled {
        if let Err(e) = std::fs::create_dir_all(&config.logging.file_dir) {
            eprintln!(
                "Warning: could not create log directory {:?}: {}",
                config.logging.file_dir, e
            );
            tracing_subscriber::registry()
                .with(filter)
                .with(TuiLogLayer::new(log_buffer))
                .init();
            return None;
        }

        let file_appender = match config.logging.file_rotation {
            LogRotation::Hourly => tracing_appender::rolling::hourly(
                &config.logging.file_dir,
                &config.logging.file_prefix,
            ),
            LogRotation::Daily => tracing_appender::rolling::daily(
                &config.logging.file_dir,
                &config.logging.file_prefix,
            ),
            LogRotation::Never => tracing_appender::rolling::never(
                &config.logging.file_dir,
                &config.logging.file_prefix,
            ),
        };

        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        tracing_subscriber::registry()
            .with(filter)
            .with(TuiLogLayer::new(log_buffer))
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(non_blocking)
                    .with_ansi(false),
            )
            .init();

        Some(guard)
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(TuiLogLayer::new(log_buffer))
            .init();

        None
    }
}
