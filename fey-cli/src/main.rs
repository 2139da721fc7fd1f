//! FEY CLI
//!
//! Runs the dashboard API and the individual data jobs from the command line.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use fey_api::{jobs, ApiConfig, ApiServer, AppState};
use fey_core::constants::{DEFAULT_HISTORY_LIMIT, LAUNCHPAD_ADDRESS};
use fey_core::traits::RateHistory;

/// FEY dashboard backend
#[derive(Parser)]
#[command(name = "fey")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true, env = "FEY_JSON_LOGS")]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the API server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3001", env = "PORT")]
        port: u16,
        /// Bind address
        #[arg(short, long, default_value = "0.0.0.0")]
        bind: String,
    },

    /// Record one xFEY → FEY conversion snapshot
    Snapshot,

    /// Fetch the FEY awarded total from Dune and refresh the cache
    RefreshDune,

    /// Probe the launchpad token count
    Launchpad,

    /// Fetch pool volume and TVL
    Volume,

    /// Print recorded conversion snapshots
    History {
        /// Maximum number of snapshots
        #[arg(short, long, default_value_t = DEFAULT_HISTORY_LIMIT)]
        limit: usize,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "fey=debug,info"
    } else {
        "fey=info,warn"
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into());

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    let config = ApiConfig::from_env().context("Invalid configuration")?;

    match cli.command {
        Commands::Serve { port, bind } => cmd_serve(config, port, &bind).await,
        Commands::Snapshot => cmd_snapshot(config).await,
        Commands::RefreshDune => cmd_refresh_dune(config).await,
        Commands::Launchpad => cmd_launchpad(config).await,
        Commands::Volume => cmd_volume(config).await,
        Commands::History { limit, json } => cmd_history(config, limit, json).await,
    }
}

async fn connect(config: ApiConfig) -> Result<AppState> {
    AppState::connect(config).await.context("Failed to initialize stores")
}

/// Run the API server
async fn cmd_serve(config: ApiConfig, port: u16, bind: &str) -> Result<()> {
    println!("{}", "🚀 Starting FEY API server...".cyan().bold());
    println!("   {} http://{}:{}", "Listening on:".green(), bind, port);
    println!("   {} http://{}:{}/health", "Health check:".dimmed(), bind, port);
    if let Some(secs) = config.snapshot_interval_seconds {
        println!("   {} every {}s", "Rate snapshots:".dimmed(), secs);
    }
    println!("\n   Press Ctrl+C to stop.\n");

    let server = ApiServer::connect(config).await.context("Failed to initialize server")?;

    let addr: SocketAddr = format!("{}:{}", bind, port)
        .parse()
        .with_context(|| format!("Invalid bind address {bind}:{port}"))?;
    server.run(addr).await?;

    Ok(())
}

/// Record one conversion snapshot
async fn cmd_snapshot(config: ApiConfig) -> Result<()> {
    let state = connect(config).await?;
    let snapshot = jobs::record_rate_snapshot(&state).await?;

    println!("{}", "✅ Snapshot recorded".green().bold());
    println!("   xFEY:  {}", snapshot.xfey_amount);
    println!("   FEY:   {}", snapshot.fey_amount.to_string().cyan());
    println!("   Rate:  {:.6}", snapshot.conversion_rate);
    println!("   Gain:  {:+.4}%", snapshot.gains_percent);
    println!("   At:    {}", snapshot.timestamp.to_rfc3339());

    Ok(())
}

/// Refresh the Dune total
async fn cmd_refresh_dune(config: ApiConfig) -> Result<()> {
    let state = connect(config).await?;
    let fresh = jobs::refresh_fey_awarded(&state).await.context("Dune refresh failed")?;

    println!(
        "{} {}",
        "✅ Total FEY awarded:".green().bold(),
        fresh.total_fey_awarded.to_string().cyan()
    );

    Ok(())
}

/// Probe the launchpad
async fn cmd_launchpad(config: ApiConfig) -> Result<()> {
    let state = connect(config).await?;
    println!("{} {}", "🔍 Probing launchpad".cyan().bold(), LAUNCHPAD_ADDRESS.dimmed());

    let count = jobs::launchpad_count(&state).await.context("Launchpad probe failed")?;

    if count.is_unknown() {
        println!("{}", "⚠️  No strategy produced a token count".yellow());
    } else {
        println!(
            "{} {} {}",
            "✅ Tokens launched:".green().bold(),
            count.token_count.to_string().cyan(),
            format!("(via {})", count.source).dimmed()
        );
    }

    Ok(())
}

/// Fetch pool stats
async fn cmd_volume(config: ApiConfig) -> Result<()> {
    let state = connect(config).await?;
    let stats = jobs::pool_volume(&state).await.context("Subgraph query failed")?;

    println!(
        "{} {}/{}",
        "📈 Pool".cyan().bold(),
        stats.token0_symbol,
        stats.token1_symbol
    );
    println!("   Volume:   ${:.2}", stats.volume_usd);
    println!("   TVL:      ${:.2}", stats.total_value_locked_usd);
    println!("   Txs:      {}", stats.tx_count);

    Ok(())
}

/// Print snapshot history
async fn cmd_history(config: ApiConfig, limit: usize, json: bool) -> Result<()> {
    let state = connect(config).await?;
    let snapshots = state.history.list(limit).await.context("Failed to read history")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshots)?);
        return Ok(());
    }

    if snapshots.is_empty() {
        println!("{}", "No snapshots recorded yet.".yellow());
        return Ok(());
    }

    println!(
        "{}",
        format!("{:<25} {:>12} {:>12} {:>10}", "timestamp", "xFEY", "FEY", "gain %").bold()
    );
    for s in &snapshots {
        let gain = format!("{:+.4}", s.gains_percent);
        let gain = if s.gains_percent >= 0.0 { gain.green() } else { gain.red() };
        println!(
            "{:<25} {:>12} {:>12} {:>10}",
            s.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            s.xfey_amount,
            s.fey_amount,
            gain
        );
    }
    println!("\n{} {}", "Total:".dimmed(), snapshots.len());

    Ok(())
}
