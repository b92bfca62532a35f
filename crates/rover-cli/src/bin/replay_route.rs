//! CLI tool to plan a route and replay background travel until arrival.

use clap::Parser;
use rover_cli::{init_tracing, replay, ReplayOptions};
use rover_core::{
    controller::surface_altitude, ActivationRequest, BodyCatalog, Passability, TickOutcome,
    TravelController, TravelRules, VehicleSituation, VehicleSystems,
};

/// Replay autopilot travel headlessly
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Body to travel on
    #[arg(long, default_value = "Terra")]
    body: String,

    /// Start latitude in degrees
    #[arg(long, default_value_t = 0.0)]
    start_lat: f64,

    /// Start longitude in degrees
    #[arg(long, default_value_t = 0.0)]
    start_lon: f64,

    /// Target latitude in degrees
    #[arg(long)]
    target_lat: f64,

    /// Target longitude in degrees
    #[arg(long)]
    target_lon: f64,

    /// Passability mode: land, ocean, amphibious or any
    #[arg(long, default_value_t = Passability::Land)]
    mode: Passability,

    /// Average speed in meters per second
    #[arg(long, default_value_t = 10.0)]
    speed: f64,

    /// Simulated seconds per tick
    #[arg(long, default_value_t = 60.0)]
    tick: f64,

    /// Print a progress line every N ticks
    #[arg(long, default_value_t = 10)]
    every: usize,

    /// Terrain seed for the body catalog
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing()?;

    let catalog = BodyCatalog::standard(args.seed);
    let body = catalog
        .get(&args.body)
        .ok_or_else(|| anyhow::anyhow!("unknown body: {}", args.body))?;

    let situation = match args.mode {
        Passability::Ocean => VehicleSituation::Splashed,
        _ => VehicleSituation::Landed,
    };
    let mut controller = TravelController::new("cli", "CLI Rover", TravelRules::default());
    let total = controller.activate(&ActivationRequest {
        body,
        lat: args.start_lat,
        lon: args.start_lon,
        altitude_m: surface_altitude(args.start_lat, args.start_lon, body),
        situation,
        systems: VehicleSystems {
            average_speed_mps: args.speed,
            ..VehicleSystems::default()
        },
        target_lat: args.target_lat,
        target_lon: args.target_lon,
        mode: args.mode,
    })?;

    println!("Replaying {:.0} m on {} at {} m/s", total, body.name, args.speed);
    let every = args.every.max(1);
    let mut count = 0usize;
    let summary = replay(
        &mut controller,
        body,
        ReplayOptions {
            tick_seconds: args.tick,
            ..ReplayOptions::default()
        },
        |now, outcome| {
            count += 1;
            if let TickOutcome::Advanced { lat, lon } = outcome {
                if count % every == 0 {
                    println!("  t={:>8.0}s  {:.6}, {:.6}", now, lat, lon);
                }
            }
        },
    );

    if summary.arrived {
        println!(
            "Arrived at {:.6}, {:.6} after {:.0} simulated seconds ({} ticks)",
            summary.lat, summary.lon, summary.simulated_seconds, summary.ticks
        );
    } else {
        println!(
            "Stopped after {} ticks, {:.0} of {:.0} m travelled",
            summary.ticks, summary.distance_travelled_m, total
        );
    }

    Ok(())
}
