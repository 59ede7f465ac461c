use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod cli;
mod commands;
mod config;
mod runtime;
mod worker;

use cli::{Args, Mode};

/// Log files live in $CONDUIT_LOG_DIR, falling back to ~/.conduit
fn log_dir() -> PathBuf {
    resolve_log_dir(
        std::env::var("CONDUIT_LOG_DIR").ok(),
        std::env::var("HOME").ok(),
    )
}

fn resolve_log_dir(configured: Option<String>, home: Option<String>) -> PathBuf {
    match configured {
        Some(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
        _ => PathBuf::from(home.unwrap_or_else(|| ".".to_string())).join(".conduit"),
    }
}

/// Every command writes a daily server.log; `serve` also echoes to stderr
fn initialize_tracing(console: bool) -> Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "info,\
         conduit_server=debug,\
         conduit_orchestrations=debug,\
         duroxide::runtime=info,\
         tower_http=debug,\
         sqlx::query=warn"
            .into()
    });

    let dir = log_dir();
    std::fs::create_dir_all(&dir)?;
    let (file_writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(&dir, "server.log"));
    // The guard flushes on drop; logging lasts for the whole process
    std::mem::forget(guard);

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true);
    let console_layer = console.then(|| fmt::layer().with_writer(std::io::stderr).compact());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    initialize_tracing(matches!(args.mode, Mode::Serve { .. }))?;

    match args.mode {
        Mode::Serve { port, no_relay } => commands::serve::run(port, no_relay).await,
        Mode::Create { name } => commands::channel::run_create(name).await,
        Mode::Delete { channel } => commands::channel::run_delete(channel).await,
        Mode::Rename {
            channel,
            new_name,
            account,
        } => commands::channel::run_rename(channel, new_name, account).await,
        Mode::List { output } => commands::channel::run_list(output).await,
        Mode::Publish {
            channel,
            message,
            account,
            timestamp,
        } => commands::channel::run_publish(channel, message, account, timestamp).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_dir_prefers_configured_directory() {
        let dir = resolve_log_dir(Some("/var/log/conduit".into()), Some("/home/ops".into()));
        assert_eq!(dir, PathBuf::from("/var/log/conduit"));
    }

    #[test]
    fn test_log_dir_falls_back_to_home() {
        let dir = resolve_log_dir(Some("  ".into()), Some("/home/ops".into()));
        assert_eq!(dir, PathBuf::from("/home/ops/.conduit"));

        let dir = resolve_log_dir(None, None);
        assert_eq!(dir, PathBuf::from("./.conduit"));
    }
}
