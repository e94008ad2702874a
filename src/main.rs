//! CLI entry point for ndskit
//!
//! Offline helpers around NDS2 queries:
//! - `hosts`: ordered servers to try for a site and epoch
//! - `trend-times`: widen a GPS interval onto the minute-trend grid
//! - `types`: channel and data type flags
//! - `query`: how channel queries are sent to a server
//!
//! # Usage
//!
//! ```bash
//! ndskit hosts --site L1 --epoch "Jan 1 2015"
//! ndskit trend-times 1167264018 1198800018
//! NDSSERVER=nds.example:31200 ndskit hosts --site H1 --json
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use nds_client::{EnvSelection, HostResolver, ProcessEnv};
use nds_core::{
    align_minute_trend, gps_now, parse_gps, ChannelQuery, ChannelType, DataType, Epoch, NdsFlag,
};
use ndskit::{config::NdsKitConfig, logging};
use tracing::debug;

#[derive(Parser)]
#[command(name = "ndskit")]
#[command(about = "NDS2 host resolution and channel query helpers", long_about = None)]
struct Cli {
    /// Config file (defaults to ./ndskit.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the configured log level
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List NDS servers to try, most preferred first
    Hosts {
        /// Site identifier, e.g. L1 or H1
        #[arg(long)]
        site: Option<String>,

        /// Epoch: `now`, GPS seconds or a date
        #[arg(long, conflicts_with = "interval")]
        epoch: Option<String>,

        /// GPS start and end of the query
        #[arg(long, num_args = 2, value_names = ["START", "END"])]
        interval: Option<Vec<i64>>,

        /// Read servers from this variable instead of NDSSERVER/LIGONDSIP
        #[arg(long, conflicts_with = "no_env")]
        env: Option<String>,

        /// Ignore server variables in the environment
        #[arg(long)]
        no_env: bool,

        /// Print JSON instead of host:port lines
        #[arg(long)]
        json: bool,
    },

    /// Widen START..END onto the minute-trend grid
    TrendTimes {
        /// Start: GPS seconds, `now` or a date
        start: String,
        /// End: GPS seconds, `now` or a date
        end: String,
    },

    /// Show channel and data type flags
    Types,

    /// Show how channel queries are sent to a server
    Query {
        /// Queries of the form NAME[,TYPE]
        #[arg(required = true)]
        queries: Vec<String>,

        /// Server protocol version
        #[arg(long, default_value_t = 2)]
        protocol: u32,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => NdsKitConfig::load_from(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => NdsKitConfig::load().context("loading configuration")?,
    };
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    config.validate().context("validating configuration")?;
    logging::init_from_config(&config).context("initializing logging")?;
    debug!(?config, "Configuration loaded");

    match cli.command {
        Commands::Hosts {
            site,
            epoch,
            interval,
            env,
            no_env,
            json,
        } => {
            let epoch = match (epoch, interval.as_deref()) {
                (Some(text), _) => Epoch::Text(text),
                (None, Some([start, end])) => Epoch::Interval(*start, *end),
                _ => Epoch::Now,
            };
            let selection = match (env, no_env) {
                (_, true) => EnvSelection::Disabled,
                (Some(name), false) => EnvSelection::Named(name),
                (None, false) => EnvSelection::Default,
            };
            show_hosts(&config, site.as_deref(), &epoch, &selection, json)
        }
        Commands::TrendTimes { start, end } => trend_times(&start, &end),
        Commands::Types => {
            show_types();
            Ok(())
        }
        Commands::Query { queries, protocol } => show_queries(&queries, protocol),
    }
}

fn show_hosts(
    config: &NdsKitConfig,
    site: Option<&str>,
    epoch: &Epoch,
    selection: &EnvSelection,
    json: bool,
) -> Result<()> {
    let resolver = HostResolver::with_env(config.resolver.clone(), ProcessEnv);
    let hosts = resolver
        .resolve(site, epoch, selection)
        .context("resolving NDS hosts")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&hosts)?);
    } else {
        for host in &hosts {
            println!("{host}");
        }
    }
    Ok(())
}

fn trend_times(start: &str, end: &str) -> Result<()> {
    let now = gps_now();
    let start = parse_gps(start, now).with_context(|| format!("parsing start '{start}'"))?;
    let end = parse_gps(end, now).with_context(|| format!("parsing end '{end}'"))?;
    if end < start {
        anyhow::bail!("end {end} is before start {start}");
    }
    let (start, end) = align_minute_trend(start, end).context("aligning to minute trends")?;
    println!("{start} {end}");
    Ok(())
}

fn show_types() {
    println!("Channel types (any = {}):", ChannelType::any());
    for ctype in ChannelType::ALL {
        println!("  {:>3}  {:<8} {}", ctype.value(), ctype.name(), ctype.nds2name());
    }
    println!("Data types (any = {}):", DataType::any());
    for dtype in DataType::ALL {
        println!(
            "  {:>3}  {:<10} {:<8} {} bytes, {}",
            dtype.value(),
            dtype.name(),
            dtype.nds2name(),
            dtype.size_bytes(),
            dtype.rust_type()
        );
    }
}

fn show_queries(queries: &[String], protocol: u32) -> Result<()> {
    for text in queries {
        let query = ChannelQuery::parse(text).with_context(|| format!("parsing query '{text}'"))?;
        let ctype = query
            .channel_type
            .map_or_else(|| "any".to_string(), |c| c.nds2name().to_string());
        println!(
            "{query}: pattern={} type={} mask={}",
            query.request_pattern(protocol),
            ctype,
            query.type_mask(ChannelType::any())
        );
    }
    Ok(())
}
