//! gexlab CLI - dealer positioning analytics for index option chains
//!
//! # Commands
//!
//! - `gexlab metrics --index Nifty` - Flip point, regime, cage and quant power
//! - `gexlab exposure --file chain.csv --kind gamma` - Per-strike exposures
//! - `gexlab levels` / `quant-power` / `vol-surface` - Single components
//! - `gexlab flow --index Nifty` - Classify trading between two captures
//! - `gexlab filter --radius 5` - Strike window around ATM
//! - `gexlab check` - Effective configuration and data availability
//!
//! # Architecture
//!
//! As part of the **S**ervice layer, this binary wires `adapter_chain` input
//! into the `gex_analytics` kernel and renders the results.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use gex_analytics::exposure::ExposureKind;
use tracing::debug;

use service_cli::commands::flow::FlowArgs;
use service_cli::commands::{self, OutputFormat, SnapshotArgs};
use service_cli::config::{build_config, CliArgs, LogLevel};
use service_cli::{init_logging, Result};

/// Dealer positioning analytics for index option chains
#[derive(Parser)]
#[command(name = "gexlab")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path (default: ./gexlab.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    /// Root of the snapshot capture tree
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Risk-free rate for recomputed Greeks
    #[arg(long, global = true)]
    risk_free_rate: Option<f64>,

    /// Vanna weight in the quant power blend
    #[arg(long, global = true)]
    vanna_weight: Option<f64>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Headline market structure: flip point, regime, cage, quant power
    Metrics {
        #[command(flatten)]
        snapshot: SnapshotArgs,
    },

    /// Per-strike dealer exposure
    Exposure {
        #[command(flatten)]
        snapshot: SnapshotArgs,

        /// Exposure kind (gamma, delta, vanna, charm); all when omitted
        #[arg(short, long)]
        kind: Option<ExposureKind>,

        /// Also write the exposure columns to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Flip point, gamma cage, vacuum and power zones
    Levels {
        #[command(flatten)]
        snapshot: SnapshotArgs,
    },

    /// Quant power strike and power zone
    QuantPower {
        #[command(flatten)]
        snapshot: SnapshotArgs,

        /// Also list the per-strike series
        #[arg(long)]
        points: bool,
    },

    /// Risk reversal and butterfly skew
    VolSurface {
        #[command(flatten)]
        snapshot: SnapshotArgs,
    },

    /// Classify option flow between two snapshots
    Flow {
        #[command(flatten)]
        args: FlowArgs,
    },

    /// Keep strikes near ATM
    Filter {
        #[command(flatten)]
        snapshot: SnapshotArgs,

        /// Strikes kept below ATM (defaults to analytics.strike_radius)
        #[arg(short, long)]
        radius: Option<usize>,

        /// Write the filtered snapshot to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check configuration and data availability
    Check,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = build_config(&CliArgs {
        config_file: cli.config.clone(),
        log_level: cli.log_level,
        data_dir: cli.data_dir.clone(),
        risk_free_rate: cli.risk_free_rate,
        vanna_weight: cli.vanna_weight,
    })?;

    let level = if cli.verbose {
        LogLevel::Debug
    } else {
        config.log_level
    };
    init_logging(level.as_filter_str());
    debug!(data_dir = %config.data_dir.display(), "configuration loaded");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let format = cli.format;

    match &cli.command {
        Commands::Metrics { snapshot } => commands::metrics::run(snapshot, &config, format, &mut out),
        Commands::Exposure {
            snapshot,
            kind,
            csv,
        } => commands::exposure::run(snapshot, &config, *kind, csv.as_ref(), format, &mut out),
        Commands::Levels { snapshot } => commands::levels::run(snapshot, &config, format, &mut out),
        Commands::QuantPower { snapshot, points } => {
            commands::quant_power::run(snapshot, &config, format, *points, &mut out)
        }
        Commands::VolSurface { snapshot } => {
            commands::vol_surface::run(snapshot, &config, format, &mut out)
        }
        Commands::Flow { args } => commands::flow::run(args, &config, format, &mut out),
        Commands::Filter {
            snapshot,
            radius,
            output,
        } => commands::filter::run(snapshot, &config, *radius, output.as_ref(), format, &mut out),
        Commands::Check => commands::check::run(&config, format, &mut out),
    }?;

    out.flush()?;
    Ok(())
}
