//! CLI entry point.
//!
//! Installs logging, loads `.env`, parses arguments and hands off to
//! [`aibot_cli::run`]. Ctrl-C cancels the root token so in-flight
//! repository calls stop with `Cancelled`.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use aibot_cli::Cli;
use aibot_core::CancellationToken;

#[tokio::main]
async fn main() {
    // Load environment variables before clap reads them
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, cancelling");
            on_interrupt.cancel();
        }
    });

    if let Err(e) = aibot_cli::run(cli, cancel).await {
        eprintln!("error: {e}");
        std::process::exit(e.exit_code());
    }
}
