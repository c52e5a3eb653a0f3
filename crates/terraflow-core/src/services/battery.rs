use std::{
    io,
    path::{Path, PathBuf},
    sync::Arc,
};

use masterror::{AppError, AppResult};

/// Supply directories checked in order.
pub const DEFAULT_SUPPLIES: [&str; 3] = [
    "/sys/class/power_supply/BAT0",
    "/sys/class/power_supply/BAT1",
    "/sys/class/power_supply/battery",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatteryStatus {
    /// Charge level in percent.
    pub capacity: u8,
    pub charging: bool,
}

/// Battery reader over the kernel power-supply class.
///
/// The first listed directory that exists is read; the others are ignored
/// even when the chosen one is unreadable.
#[derive(Debug, Clone)]
pub struct SysfsBattery {
    supplies: Arc<[PathBuf]>,
}

impl Default for SysfsBattery {
    fn default() -> Self {
        Self::with_supplies(DEFAULT_SUPPLIES.iter().map(PathBuf::from))
    }
}

impl SysfsBattery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_supplies(supplies: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            supplies: supplies.into_iter().collect(),
        }
    }

    /// Read `capacity` and `status` of the first present supply.
    ///
    /// Resolves to `Ok(None)` on machines without a battery.
    pub async fn read(&self) -> AppResult<Option<BatteryStatus>> {
        for supply in self.supplies.iter() {
            if tokio::fs::try_exists(supply).await.unwrap_or(false) {
                return read_supply(supply).await.map(Some);
            }
        }

        Ok(None)
    }
}

async fn read_attribute(supply: &Path, name: &str) -> AppResult<String> {
    let path = supply.join(name);

    tokio::fs::read_to_string(&path)
        .await
        .map(|value| value.trim().to_owned())
        .map_err(|e: io::Error| {
            AppError::internal(format!("Failed to read {}: {}", path.display(), e))
        })
}

async fn read_supply(supply: &Path) -> AppResult<BatteryStatus> {
    let capacity = read_attribute(supply, "capacity").await?;
    let status = read_attribute(supply, "status").await?;

    let capacity = capacity.parse::<u8>().map_err(|e| {
        AppError::internal(format!(
            "Invalid battery capacity {:?} in {}: {}",
            capacity,
            supply.display(),
            e
        ))
    })?;

    Ok(BatteryStatus {
        capacity,
        charging: status == "Charging",
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn supply(dir: &TempDir, name: &str, capacity: &str, status: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::create_dir(&path).expect("supply dir");
        fs::write(path.join("capacity"), format!("{capacity}\n")).expect("capacity");
        fs::write(path.join("status"), format!("{status}\n")).expect("status");
        path
    }

    #[tokio::test]
    async fn reads_first_present_supply() {
        let dir = TempDir::new().expect("tempdir");
        let missing = dir.path().join("BAT0");
        let bat1 = supply(&dir, "BAT1", "57", "Charging");
        let other = supply(&dir, "battery", "12", "Discharging");

        let battery = SysfsBattery::with_supplies([missing, bat1, other]);

        assert_eq!(
            battery.read().await.expect("read"),
            Some(BatteryStatus {
                capacity: 57,
                charging: true
            })
        );
    }

    #[tokio::test]
    async fn full_status_is_not_charging() {
        let dir = TempDir::new().expect("tempdir");
        let bat0 = supply(&dir, "BAT0", "100", "Full");

        let status = SysfsBattery::with_supplies([bat0]).read().await.expect("read");

        assert_eq!(
            status,
            Some(BatteryStatus {
                capacity: 100,
                charging: false
            })
        );
    }

    #[tokio::test]
    async fn no_supply_means_no_battery() {
        let dir = TempDir::new().expect("tempdir");
        let battery = SysfsBattery::with_supplies([dir.path().join("BAT0")]);

        assert_eq!(battery.read().await.expect("read"), None);
    }

    #[tokio::test]
    async fn unparsable_capacity_is_an_error() {
        let dir = TempDir::new().expect("tempdir");
        let bat0 = supply(&dir, "BAT0", "unknown", "Discharging");

        let result = SysfsBattery::with_supplies([bat0]).read().await;

        assert!(result.is_err());
    }
}
