//! Administration CLI for the AIBot Q&A backend.
//!
//! `main.rs` parses arguments and installs logging; everything else lives
//! here so it can be tested without spawning the binary.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

#[cfg(test)]
use tokio_test as _;

// Used by the binary only.
use dotenvy as _;
use tokio as _;
use tracing_subscriber as _;

pub mod bootstrap;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod parser;

pub use bootstrap::{CliConfig, CliContext, bootstrap};
pub use commands::{Commands, LikeTarget, QuestionCommand, UserCommand};
pub use error::CliError;
pub use parser::Cli;

use aibot_core::CancellationToken;

/// Run one parsed command line to completion.
///
/// `cancel` is the root token; every repository call made on behalf of
/// the command observes it.
pub async fn run(cli: Cli, cancel: CancellationToken) -> Result<(), CliError> {
    let Some(command) = cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        return Ok(());
    };

    let config = CliConfig::from_cli(
        cli.database_url.as_deref(),
        cli.cache_capacity,
        cli.cache_ttl_secs,
    );
    let ctx = bootstrap(config, cancel)
        .await
        .map_err(|e| CliError::Database(format!("{e:#}")))?;

    match command {
        Commands::Init => handlers::init::execute(&ctx),
        Commands::User(command) => handlers::user::execute(&ctx, command).await,
        Commands::Question(command) => handlers::question::execute(&ctx, command).await,
        Commands::Like {
            target,
            uid,
            id,
            undo,
        } => handlers::like::execute(&ctx, target, uid, id, undo).await,
    }
}
