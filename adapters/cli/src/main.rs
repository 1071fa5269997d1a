#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives a trip session from a fixed-interval clock.

mod clock;
mod settings;

use std::{
    io::{self, Write},
    path::PathBuf,
    time::Duration,
};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trip_telemetry_session::TripSession;
use trip_telemetry_system_speed_sampler::SeededSource;

use self::clock::DriveOptions;

/// Simulated driver telemetry for a single route.
#[derive(Debug, Parser)]
#[command(name = "trip-telemetry", version, about)]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Prints the waypoints of a route with their kilometre markers.
    Route {
        /// TOML route definition; the built-in sample route when omitted.
        #[arg(long)]
        route: Option<PathBuf>,
    },
    /// Drives a simulated trip along a route until it completes.
    Drive(DriveArgs),
}

#[derive(Debug, Args)]
struct DriveArgs {
    /// TOML route definition; the built-in sample route when omitted.
    #[arg(long)]
    route: Option<PathBuf>,
    /// TOML session configuration; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for the speed sampler; random when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Simulated duration of one tick in milliseconds.
    #[arg(long, default_value_t = 1_000, value_parser = clap::value_parser!(u64).range(1..))]
    tick_ms: u64,
    /// Ends the trip after this many ticks if it has not arrived.
    #[arg(long)]
    max_ticks: Option<u64>,
    /// Sleeps for the tick duration between ticks.
    #[arg(long)]
    realtime: bool,
    /// Overrides the configured speed limit in km/h.
    #[arg(long)]
    speed_limit: Option<f64>,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        CliCommand::Route { route } => {
            let route = settings::load_route(route.as_deref())?;
            settings::write_route(&route, &mut out)?;
        }
        CliCommand::Drive(args) => drive(args, &mut out)?,
    }

    out.flush().context("failed to flush output")
}

fn drive(args: DriveArgs, out: &mut impl Write) -> Result<()> {
    let route = settings::load_route(args.route.as_deref())?;
    let mut config = settings::load_config(args.config.as_deref())?;
    if let Some(limit) = args.speed_limit {
        config.speed_limit_kmh = limit;
    }

    let seed = args.seed.unwrap_or_else(rand::random);
    tracing::info!(seed, "seeding speed sampler");

    let mut session = TripSession::start(&route, config, SeededSource::from_seed(seed))
        .context("session configuration rejected")?;

    let options = DriveOptions {
        tick: Duration::from_millis(args.tick_ms),
        max_ticks: args.max_ticks,
        realtime: args.realtime,
    };
    let summary = clock::drive(&mut session, &options, out)?;
    clock::write_summary(&summary, out)
}
