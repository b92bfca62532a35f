//! Rover CLI - command line tools for surface travel.
//!
//! This crate provides the CLI binaries:
//! - plan_route: plan a route on a catalog body and print it
//! - replay_route: plan, then replay travel headlessly until arrival

pub mod plan;
pub mod replay;

pub use plan::{plan_route, PlanRequest, RouteReport};
pub use replay::{replay, ReplayOptions, ReplaySummary};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the CLI log subscriber.
pub fn init_tracing() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("rover_cli=info".parse()?))
        .try_init()?;
    Ok(())
}
