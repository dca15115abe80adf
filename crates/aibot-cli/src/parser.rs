//! Main CLI parser and top-level argument handling.

use clap::Parser;

use crate::commands::Commands;

/// Command-line interface for administering the AIBot database.
///
/// Global options may also come from the environment (or a `.env` file).
#[derive(Parser)]
#[command(name = "aibot")]
#[command(about = "Administer the AIBot Q&A database")]
#[command(version)]
pub struct Cli {
    /// Database URL, e.g. `sqlite:///var/lib/aibot/aibot.db`
    #[arg(long, env = "AIBOT_DATABASE_URL", global = true)]
    pub database_url: Option<String>,

    /// Maximum number of cached rows (unbounded when omitted)
    #[arg(long, env = "AIBOT_CACHE_CAPACITY", global = true)]
    pub cache_capacity: Option<usize>,

    /// Seconds a cached row stays valid (forever when omitted)
    #[arg(long, env = "AIBOT_CACHE_TTL_SECS", global = true)]
    pub cache_ttl_secs: Option<u64>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
