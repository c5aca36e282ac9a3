//! visor-probe
//!
//! Runs the visor core against a live backend and prints the result.

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use data_access::{CacheEvent, DataAccessConfig, DataCache, HttpApiClient};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};
use visor_probe::report::format_stats;
use visor_probe::Target;
use visor_protocol::VisorApi;
use visor_state::{SessionConfig, VisorSession};

#[derive(Parser, Debug)]
#[command(name = "visor-probe")]
#[command(about = "Drive the dispersion visor core against a live backend")]
struct Cli {
    /// Backend base URL
    #[arg(long, env = "VISOR_API_URL")]
    url: Option<String>,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Bound the session cache to this many keys
    #[arg(long, env = "VISOR_CACHE_CAPACITY")]
    cache_capacity: Option<usize>,

    /// Print cache counters when done
    #[arg(long)]
    stats: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone)]
struct SelectionArgs {
    #[arg(short, long)]
    domain: Option<String>,

    #[arg(short, long)]
    instance: Option<String>,

    #[arg(short, long)]
    variable: Option<String>,
}

impl From<SelectionArgs> for Target {
    fn from(args: SelectionArgs) -> Self {
        Target {
            domain: args.domain,
            instance: args.instance,
            variable: args.variable,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the session context
    Context,

    /// Run the selection cascade and print the option lists
    Browse {
        #[command(flatten)]
        selection: SelectionArgs,
    },

    /// Summarize the combined field
    Field {
        #[command(flatten)]
        selection: SelectionArgs,

        #[arg(long, default_value = "0")]
        frame: usize,

        #[arg(long, default_value = "0")]
        level: usize,
    },

    /// Print per-project series at a point
    Series {
        #[command(flatten)]
        selection: SelectionArgs,

        #[arg(long, allow_hyphen_values = true)]
        lon: Option<f64>,

        #[arg(long, allow_hyphen_values = true)]
        lat: Option<f64>,
    },

    /// Print the domain border extent
    Outline {
        #[command(flatten)]
        selection: SelectionArgs,
    },

    /// Summarize wind glyphs at a frame
    Wind {
        #[command(flatten)]
        selection: SelectionArgs,

        #[arg(long, default_value = "0")]
        frame: usize,
    },
}

fn init_tracing(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn data_config(cli: &Cli) -> Result<DataAccessConfig> {
    let mut config = DataAccessConfig::from_env();
    if let Some(url) = &cli.url {
        config.base_url = url.trim_end_matches('/').to_string();
    }
    if cli.cache_capacity.is_some() {
        config.cache_capacity = cli.cache_capacity;
    }
    config.validate().map_err(|e| anyhow!(e))?;
    Ok(config)
}

/// Log every cache alert while the probe runs.
fn watch_alerts(cache: &DataCache) {
    let mut events = cache.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            if let CacheEvent::Alert(alert) = event {
                warn!(status = alert.status, "{}", alert.message);
            }
        }
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.json_logs);

    let data_config = data_config(&cli)?;
    let session_config = SessionConfig::from_env();
    session_config.validate().map_err(|e| anyhow!(e))?;
    info!(url = %data_config.base_url, "Starting visor probe");

    let client = HttpApiClient::new(&data_config).context("building the HTTP client")?;
    let cache = DataCache::new(Arc::new(client), data_config);
    watch_alerts(&cache);

    let output = match cli.command {
        Commands::Context => {
            let context = cache
                .api()
                .context()
                .await
                .context("fetching /api/context")?;
            serde_json::to_string_pretty(&context)?
        }
        command => {
            let session = VisorSession::connect(cache.clone(), session_config).await;
            run(&session, command).await?
        }
    };
    println!("{}", output);

    if cli.stats {
        println!("{}", format_stats(&cache.stats().await));
    }
    Ok(())
}

async fn run(session: &VisorSession, command: Commands) -> Result<String> {
    match command {
        Commands::Context => Ok(serde_json::to_string_pretty(session.context())?),
        Commands::Browse { selection } => {
            visor_probe::select(session, &selection.into()).await;
            Ok(visor_probe::browse_report(session).await)
        }
        Commands::Field {
            selection,
            frame,
            level,
        } => {
            visor_probe::select(session, &selection.into()).await;
            visor_probe::field_report(session, frame, level).await
        }
        Commands::Series {
            selection,
            lon,
            lat,
        } => {
            visor_probe::select(session, &selection.into()).await;
            visor_probe::series_report(session, lon, lat).await
        }
        Commands::Outline { selection } => {
            visor_probe::select(session, &selection.into()).await;
            visor_probe::outline_report(session).await
        }
        Commands::Wind { selection, frame } => {
            visor_probe::select(session, &selection.into()).await;
            session.set_frame(frame).await;
            visor_probe::wind_report(session).await
        }
    }
}
