//! hwmon device discovery.
//!
//! Lists `<hwmon_root>/<device_prefix>*`, reads each device's `name` file and
//! classifies the device by name prefix: CPU temperature sources on one side,
//! the single PWM fan controller on the other. Runs once at startup.

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{debug, info, warn};

use crate::{
    config::Config,
    drivers::HwmonPwmController,
    error::{FanError, Result},
    sensors::TemperatureSensor,
    temperature_sensors::HwmonTempSource,
};

/// Raw discovery result, before any topology checks.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Discovery {
    /// Temperature source device directories, in path order.
    pub sources: Vec<PathBuf>,
    /// Fan controller device directory; the last match wins.
    pub controller: Option<PathBuf>,
    /// Controller matches that were overridden by a later one.
    pub shadowed_controllers: Vec<PathBuf>,
}

/// Handles the control loop works with.
#[derive(Debug)]
pub struct Topology {
    pub sensors: Vec<Box<dyn TemperatureSensor>>,
    pub controller: HwmonPwmController,
}

/// Enumerates and classifies hwmon devices.
///
/// Devices without a readable `name` file are skipped. Only failure to list
/// `hwmon_root` itself is an error.
pub fn discover(
    hwmon_root: &Path,
    device_prefix: &str,
    sensor_marker: &str,
    controller_marker: &str,
) -> Result<Discovery> {
    let entries = fs::read_dir(hwmon_root).map_err(|source| FanError::Discovery {
        path: hwmon_root.to_path_buf(),
        source,
    })?;

    let mut devices: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().starts_with(device_prefix))
        .map(|entry| entry.path())
        .collect();
    devices.sort();

    let mut discovery = Discovery::default();
    for device in devices {
        let Some(name) = read_device_name(&device) else {
            debug!("Skipping {}: no readable name file", device.display());
            continue;
        };

        if name.starts_with(sensor_marker) {
            debug!("Temperature source {} ({name})", device.display());
            discovery.sources.push(device);
        } else if name.starts_with(controller_marker) {
            debug!("Fan controller candidate {} ({name})", device.display());
            if let Some(previous) = discovery.controller.replace(device) {
                discovery.shadowed_controllers.push(previous);
            }
        }
    }

    Ok(discovery)
}

fn read_device_name(device: &Path) -> Option<String> {
    fs::read_to_string(device.join("name")).ok()
}

impl Discovery {
    /// Checks the topology and builds the sensor and controller handles.
    ///
    /// No sources, or no controller, is fatal. Several controllers are
    /// tolerated: each overridden one is logged and the last one is used.
    pub fn into_topology(self, config: &Config) -> Result<Topology> {
        for shadowed in &self.shadowed_controllers {
            warn!(
                "Multiple '{}' fan controllers found, ignoring {}",
                config.controller_marker,
                shadowed.display()
            );
        }

        if self.sources.is_empty() {
            return Err(FanError::EmptySourceSet);
        }
        let controller = self.controller.ok_or_else(|| FanError::ControllerNotFound {
            marker: config.controller_marker.clone(),
        })?;

        info!(
            "Discovered {} temperature source(s), fan controller {}",
            self.sources.len(),
            controller.display()
        );

        let sensors = self
            .sources
            .into_iter()
            .inspect(|source| info!("Temperature source: {}", source.display()))
            .map(|source| {
                Box::new(HwmonTempSource::new(source, &config.temp_input))
                    as Box<dyn TemperatureSensor>
            })
            .collect();

        Ok(Topology {
            sensors,
            controller: HwmonPwmController::new(controller, config.fan_channels.as_slice()),
        })
    }
}

/// Discovers devices using the paths and markers from `config`.
pub fn discover_topology(config: &Config) -> Result<Topology> {
    discover(
        &config.hwmon_root,
        &config.device_prefix,
        &config.sensor_marker,
        &config.controller_marker,
    )?
    .into_topology(config)
}


#[cfg(test)]
mod tests {
    use super::testing::FakeHwmon;
    use super::*;
    use pretty_assertions::assert_eq;

    fn config_for(fake: &FakeHwmon) -> Config {
        Config {
            hwmon_root: fake.root.path().to_path_buf(),
            ..Default::default()
        }
    }

    #[test]
    fn classifies_devices_by_name_prefix() {
        let fake = FakeHwmon::new();
        let cpu0 = fake.cpu("hwmon1", 40_000);
        let cpu1 = fake.cpu("hwmon4", 50_000);
        let ctrl = fake.fan_controller("hwmon3");
        fake.device("hwmon0", Some("acpitz"));
        fake.device("hwmon2", Some("nvme"));

        let discovery = discover(fake.root.path(), "hwmon", "coretemp", "nct").unwrap();

        assert_eq!(discovery.sources, vec![cpu0, cpu1]);
        assert_eq!(discovery.controller, Some(ctrl));
        assert!(discovery.shadowed_controllers.is_empty());
    }

    #[test]
    fn skips_devices_without_name_and_foreign_entries() {
        let fake = FakeHwmon::new();
        fake.device("hwmon0", None);
        fake.device("thermal0", Some("coretemp"));
        let cpu = fake.cpu("hwmon5", 45_000);

        let discovery = discover(fake.root.path(), "hwmon", "coretemp", "nct").unwrap();

        assert_eq!(discovery.sources, vec![cpu]);
        assert_eq!(discovery.controller, None);
    }

    #[test]
    fn last_controller_wins_and_others_are_recorded() {
        let fake = FakeHwmon::new();
        let first = fake.fan_controller("hwmon2");
        let second = fake.fan_controller("hwmon6");

        let discovery = discover(fake.root.path(), "hwmon", "coretemp", "nct").unwrap();

        assert_eq!(discovery.controller, Some(second));
        assert_eq!(discovery.shadowed_controllers, vec![first]);
    }

    #[test]
    fn missing_root_is_discovery_error() {
        let result = discover(Path::new("/nonexistent/hwmon"), "hwmon", "coretemp", "nct");
        assert!(matches!(result, Err(FanError::Discovery { .. })));
    }

    #[test]
    fn topology_requires_sources() {
        let fake = FakeHwmon::new();
        fake.fan_controller("hwmon3");

        let result = discover_topology(&config_for(&fake));

        assert!(matches!(result, Err(FanError::EmptySourceSet)));
    }

    #[test]
    fn topology_requires_controller() {
        let fake = FakeHwmon::new();
        fake.cpu("hwmon1", 40_000);

        match discover_topology(&config_for(&fake)) {
            Err(FanError::ControllerNotFound { marker }) => assert_eq!(marker, "nct"),
            other => panic!("Expected ControllerNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn topology_builds_working_handles() {
        let fake = FakeHwmon::new();
        fake.cpu("hwmon1", 40_000);
        fake.cpu("hwmon2", 50_000);
        let ctrl = fake.fan_controller("hwmon3");

        let topology = discover_topology(&config_for(&fake)).unwrap();

        assert_eq!(topology.sensors.len(), 2);
        assert_eq!(
            crate::sensors::read_average_temperature(&topology.sensors)
                .await
                .unwrap(),
            45_000
        );
        assert_eq!(topology.controller.device(), ctrl.as_path());
        assert_eq!(
            topology.controller.channels(),
            &[ctrl.join("pwm1"), ctrl.join("pwm2")]
        );
    }
}
