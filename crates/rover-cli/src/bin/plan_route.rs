//! CLI tool to plan a surface route on a catalog body.
//!
//! Prints the route distance, search statistics, waypoints and the encoded
//! route string.

use clap::Parser;
use rover_cli::{init_tracing, plan_route, PlanRequest};
use rover_core::{BodyCatalog, Passability, TravelRules};

/// Plan a hex-lattice route between two coordinates
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Body to plan on
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

    /// Lattice step size in meters
    #[arg(long, default_value_t = 1000.0)]
    step: f64,

    /// Search budget in milliseconds
    #[arg(long, default_value_t = 10_000)]
    budget_ms: u64,

    /// Terrain seed for the body catalog
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing()?;

    let catalog = BodyCatalog::standard(args.seed);
    let report = plan_route(
        &catalog,
        &PlanRequest {
            body_name: args.body,
            start_lat: args.start_lat,
            start_lon: args.start_lon,
            target_lat: args.target_lat,
            target_lon: args.target_lon,
            mode: args.mode,
            rules: TravelRules {
                step_size_m: args.step,
                search_budget_ms: args.budget_ms,
                ..TravelRules::default()
            },
        },
    )?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Route on {} ({} mode)", report.body, report.mode);
    println!("  Distance: {:.0} m (straight line {:.0} m)", report.distance_m, report.straight_line_m);
    println!("  Tiles generated: {}, nodes expanded: {}", report.tiles_generated, report.nodes_expanded);
    println!("  Waypoints:");
    for (i, waypoint) in report.waypoints.iter().enumerate() {
        println!("    {:>3}: {:.6}, {:.6}", i, waypoint.lat, waypoint.lon);
    }
    if let Some(encoded) = &report.encoded_path {
        println!("  Encoded: {}", encoded);
    }

    Ok(())
}
