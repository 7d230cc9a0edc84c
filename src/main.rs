mod commands;
mod feed;
mod notion;
mod render;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};
use staysync_core::config::SyncConfig;
use staysync_core::matching::MatchPolicyKind;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "staysync")]
#[command(about = "Add guest stays from a calendar feed to the Notion stays database")]
struct Cli {
    /// Log more (-v for progress, -vv for debug output)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create every stay that is in the calendar but not in Notion
    Sync {
        /// Only consider stays starting in the last N days
        #[arg(long)]
        days: Option<u32>,

        /// How calendar stays are matched to Notion rows (identity or heuristic)
        #[arg(long)]
        policy: Option<MatchPolicyKind>,

        /// Show what would be added without writing anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Show missing stays without writing anything
    Status {
        /// Only consider stays starting in the last N days
        #[arg(long)]
        days: Option<u32>,

        /// How calendar stays are matched to Notion rows (identity or heuristic)
        #[arg(long)]
        policy: Option<MatchPolicyKind>,
    },
    /// Print the config file location and the resolved settings
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = SyncConfig::load()?;

    match cli.command {
        Commands::Sync {
            days,
            policy,
            dry_run,
        } => {
            apply_overrides(&mut config, days, policy);
            commands::sync::run(config, dry_run).await
        }
        Commands::Status { days, policy } => {
            apply_overrides(&mut config, days, policy);
            commands::status::run(config).await
        }
        Commands::Config => commands::config::run(&config),
    }
}

/// `RUST_LOG` wins over the verbosity flag.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "warn,staysync=info,staysync_core=info",
        _ => "warn,staysync=debug,staysync_core=debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn apply_overrides(config: &mut SyncConfig, days: Option<u32>, policy: Option<MatchPolicyKind>) {
    if let Some(days) = days {
        config.lookback_days = Some(days);
    }
    if let Some(policy) = policy {
        config.match_policy = policy;
    }
}
