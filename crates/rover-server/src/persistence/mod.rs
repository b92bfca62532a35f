//! JSON snapshot of every tracked vehicle and the simulated clock.

use anyhow::{Context, Result};
use rover_core::{TravelState, VehicleSituation};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleRecord {
    pub vehicle_id: String,
    pub name: String,
    pub body_name: String,
    pub lat: f64,
    pub lon: f64,
    pub altitude_m: f64,
    #[serde(default)]
    pub situation: VehicleSituation,
    #[serde(default)]
    pub travel: TravelState,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Simulated universal time in seconds
    pub universal_time: f64,
    pub vehicles: Vec<VehicleRecord>,
}

/// Load a snapshot; a missing file is an empty snapshot.
pub async fn load_snapshot(path: &Path) -> Result<Snapshot> {
    if !fs::try_exists(path).await? {
        return Ok(Snapshot::default());
    }
    let bytes = fs::read(path).await?;
    let snapshot = serde_json::from_slice::<Snapshot>(&bytes)?;
    Ok(snapshot)
}

/// Load a snapshot, starting empty if the file cannot be read or parsed.
pub async fn load_snapshot_or_default(path: &Path) -> Snapshot {
    match load_snapshot(path).await {
        Ok(snapshot) => snapshot,
        Err(err) => {
            tracing::warn!(
                "Travel state at {} could not be loaded, starting empty: {:#}",
                path.display(),
                err
            );
            Snapshot::default()
        }
    }
}

/// Write the snapshot next to `path`, then rename it into place so readers
/// never see a partial file.
pub async fn save_snapshot(path: &Path, snapshot: &Snapshot) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }
    let payload = serde_json::to_vec_pretty(snapshot)?;
    let staging = staging_path(path);
    fs::write(&staging, payload)
        .await
        .with_context(|| format!("writing {}", staging.display()))?;
    fs::rename(&staging, path)
        .await
        .with_context(|| format!("replacing {}", path.display()))?;
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(tag: &str) -> std::path::PathBuf {
        std::env::temp_dir()
            .join(format!("rover-{tag}-{}", std::process::id()))
            .join("state.json")
    }

    #[tokio::test]
    async fn missing_snapshot_is_empty() {
        let snapshot = load_snapshot(&temp_path("missing")).await.expect("load");
        assert_eq!(snapshot, Snapshot::default());
    }

    #[tokio::test]
    async fn corrupt_snapshot_starts_empty() {
        let path = temp_path("corrupt");
        fs::create_dir_all(path.parent().unwrap()).await.unwrap();
        fs::write(&path, b"{\"universal_time\": 12, \"vehic").await.unwrap();

        assert!(load_snapshot(&path).await.is_err());
        assert_eq!(load_snapshot_or_default(&path).await, Snapshot::default());
        let _ = fs::remove_dir_all(path.parent().unwrap()).await;
    }

    #[tokio::test]
    async fn save_replaces_the_file_without_leftovers() {
        let path = temp_path("replace");
        fs::create_dir_all(path.parent().unwrap()).await.unwrap();
        fs::write(&path, b"stale").await.unwrap();

        let snapshot = Snapshot {
            universal_time: 42.0,
            vehicles: Vec::new(),
        };
        save_snapshot(&path, &snapshot).await.expect("save");
        assert_eq!(load_snapshot(&path).await.expect("load"), snapshot);

        let staging = staging_path(&path);
        assert_eq!(staging.file_name().unwrap(), "state.json.tmp");
        assert!(!fs::try_exists(&staging).await.unwrap());
        let _ = fs::remove_dir_all(path.parent().unwrap()).await;
    }

    #[tokio::test]
    async fn snapshot_survives_save_and_load() {
        let path = temp_path("roundtrip");
        let snapshot = Snapshot {
            universal_time: 1234.5,
            vehicles: vec![VehicleRecord {
                vehicle_id: "rover-1".to_string(),
                name: "Rover One".to_string(),
                body_name: "Terra".to_string(),
                lat: 1.0,
                lon: 2.0,
                altitude_m: 3.0,
                situation: VehicleSituation::Landed,
                travel: TravelState {
                    active: true,
                    encoded_path: Some("MDowOw==".to_string()),
                    ..TravelState::default()
                },
            }],
        };
        save_snapshot(&path, &snapshot).await.expect("save");
        let loaded = load_snapshot(&path).await.expect("load");
        assert_eq!(loaded, snapshot);
        let _ = fs::remove_dir_all(path.parent().unwrap()).await;
    }
}
