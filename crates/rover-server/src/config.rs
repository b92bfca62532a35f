//! Server configuration from environment.

use rover_core::TravelRules;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub tick_interval_ms: u64,
    /// Simulated seconds per wall-clock second
    pub time_scale: f64,
    pub state_path: PathBuf,
    pub terrain_seed: u64,
    pub rules: TravelRules,
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = TravelRules::default();
        Self {
            server_port: env_or("ROVER_PORT", 3000),
            tick_interval_ms: env_or("ROVER_TICK_INTERVAL_MS", 1000).max(1),
            time_scale: env_or("ROVER_TIME_SCALE", 1.0),
            state_path: env::var("ROVER_STATE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/travel_state.json")),
            terrain_seed: env_or("ROVER_TERRAIN_SEED", 42),
            rules: TravelRules {
                step_size_m: positive_env_or("ROVER_STEP_SIZE_M", defaults.step_size_m),
                search_budget_ms: env_or("ROVER_SEARCH_BUDGET_MS", defaults.search_budget_ms),
                proximity_threshold_m: positive_env_or(
                    "ROVER_PROXIMITY_M",
                    defaults.proximity_threshold_m,
                ),
                ..defaults
            },
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Simulated time that passes per tick.
    pub fn simulated_seconds_per_tick(&self) -> f64 {
        self.tick_interval().as_secs_f64() * self.time_scale
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// Like [`env_or`], but only accepts a positive finite length.
fn positive_env_or(key: &str, default: f64) -> f64 {
    positive_or(key, env::var(key).ok().as_deref(), default)
}

fn positive_or(key: &str, raw: Option<&str>, default: f64) -> f64 {
    let Some(raw) = raw else {
        return default;
    };
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => value,
        _ => {
            tracing::warn!("Ignoring {}={:?}: expected a positive length", key, raw);
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulated_time_scales_with_interval() {
        let mut config = Config::from_env();
        config.tick_interval_ms = 500;
        config.time_scale = 4.0;
        assert_eq!(config.simulated_seconds_per_tick(), 2.0);
    }

    #[test]
    fn lengths_must_be_positive_and_finite() {
        assert_eq!(positive_or("K", None, 1000.0), 1000.0);
        assert_eq!(positive_or("K", Some("250"), 1000.0), 250.0);
        assert_eq!(positive_or("K", Some(" 12.5 "), 1000.0), 12.5);
        for raw in ["0", "-5", "NaN", "inf", "", "ten"] {
            assert_eq!(positive_or("K", Some(raw), 1000.0), 1000.0, "accepted {raw:?}");
        }
    }

    #[test]
    fn zero_step_size_from_env_falls_back_to_default() {
        env::set_var("ROVER_STEP_SIZE_M", "0");
        env::set_var("ROVER_PROXIMITY_M", "-5");
        let config = Config::from_env();
        env::remove_var("ROVER_STEP_SIZE_M");
        env::remove_var("ROVER_PROXIMITY_M");

        let defaults = TravelRules::default();
        assert_eq!(config.rules.step_size_m, defaults.step_size_m);
        assert_eq!(config.rules.proximity_threshold_m, defaults.proximity_threshold_m);
    }
}
