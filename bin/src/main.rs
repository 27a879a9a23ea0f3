//! tickhist CLI - Tick history market depth extractions.

use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tickhist_lib::prelude::*;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod display;

#[derive(Parser)]
#[command(name = "tickhist")]
#[command(about = "Tick history market depth extractions", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (suppress progress output)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(flatten)]
    connection: Connection,
}

/// Options shared by every command that talks to the service.
#[derive(Args)]
pub(crate) struct Connection {
    /// Account username
    #[arg(long, env = "TICKHIST_USERNAME", global = true)]
    pub(crate) username: Option<String>,

    /// Account password (prompted for when omitted)
    #[arg(long, env = "TICKHIST_PASSWORD", hide_env_values = true, global = true)]
    pub(crate) password: Option<String>,

    /// Base URL of the REST API
    #[arg(long, env = "TICKHIST_BASE_URL", global = true)]
    pub(crate) base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value = "60", global = true)]
    pub(crate) timeout: u64,
}

impl Connection {
    /// Client configuration for these options.
    pub(crate) fn config(&self) -> ClientConfig {
        let mut config = ClientConfig {
            timeout: Duration::from_secs(self.timeout),
            ..Default::default()
        };
        if let Some(base_url) = &self.base_url {
            config.base_url.clone_from(base_url);
        }
        config
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run a market depth extraction and save the raw result
    Extract(ExtractArgs),

    /// Exchange credentials for a token and exit
    Token,
}

/// Arguments of `tickhist extract`.
#[derive(Args)]
pub(crate) struct ExtractArgs {
    /// Instrument RICs (e.g., IBM.N)
    #[arg(required = true)]
    pub(crate) rics: Vec<String>,

    /// Content field names. Defaults to a standard depth field set.
    #[arg(short, long, value_delimiter = ',')]
    pub(crate) fields: Vec<String>,

    /// Depth view (RawMarketByPrice, RawMarketByOrder, RawMarketMaker, LegacyLevel2, NormalizedLL2)
    #[arg(long, default_value = "NormalizedLL2")]
    pub(crate) view: MarketDepthView,

    /// Number of price levels (0 leaves it to the service)
    #[arg(short, long, default_value = "10")]
    pub(crate) levels: u32,

    /// Row ordering (SingleByRic, SingleByTimestamp)
    #[arg(long, default_value = "SingleByRic")]
    pub(crate) sort: TickHistorySort,

    /// Timestamp zone (LocalExchangeTime, GmtUtc)
    #[arg(long, default_value = "GmtUtc")]
    pub(crate) timezone: TimestampZone,

    /// Window start (YYYY-MM-DD or RFC 3339)
    #[arg(short, long, requires = "end", conflicts_with = "days_ago")]
    pub(crate) start: Option<String>,

    /// Window end (YYYY-MM-DD or RFC 3339)
    #[arg(short, long, requires = "start")]
    pub(crate) end: Option<String>,

    /// Relative window in days instead of start/end
    #[arg(long)]
    pub(crate) days_ago: Option<u32>,

    /// Omit the source RIC column
    #[arg(long)]
    pub(crate) no_source_ric: bool,

    /// Reject instruments that are no longer active
    #[arg(long)]
    pub(crate) no_historical: bool,

    /// Allow open access instruments
    #[arg(long)]
    pub(crate) allow_open_access: bool,

    /// Use the account's stored validation preferences
    #[arg(long)]
    pub(crate) user_preferences: bool,

    /// Output file path. Defaults to output_<pid>.csv.gz
    #[arg(short, long)]
    pub(crate) output: Option<PathBuf>,

    /// Seconds between status polls
    #[arg(long, default_value = "3")]
    pub(crate) poll_interval: u64,

    /// Give up if the job is still running after this many seconds
    #[arg(long)]
    pub(crate) max_wait: Option<u64>,

    /// Print the request body and exit without contacting the service
    #[arg(long)]
    pub(crate) dry_run: bool,
}

fn init_tracing(verbose: u8, quiet: bool) {
    let default = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug,hyper=info,reqwest=info",
        (false, _) => "trace",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    // Show help if no command provided
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Extract(args) => {
            commands::extract::extract(&cli.connection, &args, cli.quiet).await
        }
        Commands::Token => commands::token::token(&cli.connection).await,
    }
}
