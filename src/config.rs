//! Configuration management for the hwmon-fand daemon.
//!
//! Handles loading, parsing, and validation of the optional YAML configuration
//! file. Every key has a default, and the defaults reproduce the classic
//! coretemp/nct setup: two PWM channels, 30-70 °C mapped onto 0-255, at most
//! 5 units of change per 5 second tick.

use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{fan_curve::DutyCycle, sensors::Temperature};

/// Main configuration structure for the hwmon-fand daemon.
///
/// # Example
///
/// ```yaml
/// version: 1
/// hwmon_root: /sys/class/hwmon
/// sensor_marker: coretemp
/// controller_marker: nct
/// fan_channels: [pwm1, pwm2]
/// temp_min: 30000
/// temp_max: 70000
/// max_step: 5
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Configuration version for compatibility checking.
    pub version: u8,

    /// Directory holding the hwmon device directories.
    #[serde(default = "defaults::hwmon_root")]
    pub hwmon_root: PathBuf,

    /// Only entries of `hwmon_root` starting with this prefix are devices.
    #[serde(default = "defaults::device_prefix")]
    pub device_prefix: String,

    /// Name prefix marking a CPU temperature source.
    #[serde(default = "defaults::sensor_marker")]
    pub sensor_marker: String,

    /// Name prefix marking the fan controller.
    #[serde(default = "defaults::controller_marker")]
    pub controller_marker: String,

    /// Temperature value file inside a source device.
    #[serde(default = "defaults::temp_input")]
    pub temp_input: String,

    /// PWM channel files inside the controller device, written in order.
    #[serde(default = "defaults::fan_channels")]
    pub fan_channels: Vec<String>,

    /// At or below this temperature (millidegrees) the fan gets `pwm_min`.
    #[serde(default = "defaults::temp_min")]
    pub temp_min: Temperature,

    /// At or above this temperature (millidegrees) the fan gets `pwm_max`.
    #[serde(default = "defaults::temp_max")]
    pub temp_max: Temperature,

    #[serde(default = "defaults::pwm_min")]
    pub pwm_min: DutyCycle,

    #[serde(default = "defaults::pwm_max")]
    pub pwm_max: DutyCycle,

    /// Largest duty cycle change allowed per tick.
    #[serde(default = "defaults::max_step")]
    pub max_step: DutyCycle,

    /// Control interval in seconds. Defaults to `max_step` seconds.
    #[serde(default)]
    pub tick_seconds: Option<u16>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: 1,
            hwmon_root: defaults::hwmon_root(),
            device_prefix: defaults::device_prefix(),
            sensor_marker: defaults::sensor_marker(),
            controller_marker: defaults::controller_marker(),
            temp_input: defaults::temp_input(),
            fan_channels: defaults::fan_channels(),
            temp_min: defaults::temp_min(),
            temp_max: defaults::temp_max(),
            pwm_min: defaults::pwm_min(),
            pwm_max: defaults::pwm_max(),
            max_step: defaults::max_step(),
            tick_seconds: None,
        }
    }
}

impl Config {
    /// Validates the configuration for consistency.
    ///
    /// # Example
    ///
    /// ```
    /// use hwmon_fand::config::Config;
    ///
    /// let config = Config::default();
    /// config.validate()?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn validate(&self) -> Result<()> {
        if self.temp_min >= self.temp_max {
            anyhow::bail!(
                "temp_min ({}) must be lower than temp_max ({})",
                self.temp_min,
                self.temp_max
            );
        }
        if self.pwm_min > self.pwm_max {
            anyhow::bail!(
                "pwm_min ({}) must not exceed pwm_max ({})",
                self.pwm_min,
                self.pwm_max
            );
        }
        if self.max_step == 0 {
            anyhow::bail!("max_step must be greater than zero");
        }
        if self.tick_seconds == Some(0) {
            anyhow::bail!("tick_seconds must be greater than zero");
        }
        if self.fan_channels.is_empty() {
            anyhow::bail!("At least one fan channel is required");
        }
        for (idx, channel) in self.fan_channels.iter().enumerate() {
            if self.fan_channels[..idx].contains(channel) {
                anyhow::bail!("Fan channel '{}' is listed twice", channel);
            }
        }
        Ok(())
    }

    /// Interval between control ticks.
    pub fn tick_interval(&self) -> Duration {
        let secs = self
            .tick_seconds
            .map_or(u64::from(self.max_step), u64::from);
        Duration::from_secs(secs)
    }

    /// Duty cycle written on shutdown: the midpoint of the valid range.
    pub fn neutral_duty(&self) -> DutyCycle {
        ((u16::from(self.pwm_min) + u16::from(self.pwm_max)) / 2) as DutyCycle
    }
}

mod defaults {
    use std::path::PathBuf;

    use crate::{fan_curve::DutyCycle, sensors::Temperature};

    pub fn hwmon_root() -> PathBuf {
        PathBuf::from("/sys/class/hwmon")
    }

    pub fn device_prefix() -> String {
        "hwmon".into()
    }

    pub fn sensor_marker() -> String {
        "coretemp".into()
    }

    pub fn controller_marker() -> String {
        "nct".into()
    }

    pub fn temp_input() -> String {
        "temp1_input".into()
    }

    pub fn fan_channels() -> Vec<String> {
        vec!["pwm1".into(), "pwm2".into()]
    }

    pub fn temp_min() -> Temperature {
        30_000
    }

    pub fn temp_max() -> Temperature {
        70_000
    }

    pub fn pwm_min() -> DutyCycle {
        0
    }

    pub fn pwm_max() -> DutyCycle {
        255
    }

    pub fn max_step() -> DutyCycle {
        5
    }
}

/// Searches the standard locations. `None` means no file exists anywhere.
fn locate_config() -> Option<PathBuf> {
    if let Ok(env_path) = env::var("HWMON_FAND_CONFIG") {
        return Some(PathBuf::from(env_path));
    }

    if let Some(mut cfg_dir) = env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("HOME").map(|h| Path::new(&h).join(".config")))
    {
        cfg_dir.push("hwmon-fand/config.yml");
        if cfg_dir.exists() {
            return Some(cfg_dir);
        }
    }

    let etc = Path::new("/etc/hwmon-fand/config.yml");
    if etc.exists() {
        return Some(etc.to_path_buf());
    }

    None
}

/// Loaded configuration together with the file it came from.
///
/// The configuration is read once at startup; the daemon never reloads it.
///
/// # Example
///
/// ```no_run
/// use hwmon_fand::config::ConfigManager;
/// use std::path::PathBuf;
///
/// # fn example() -> anyhow::Result<()> {
/// // Load from specific path
/// let config_manager = ConfigManager::load(Some(PathBuf::from("config.yml")))?;
///
/// // Load from standard locations, falling back to defaults
/// let config_manager = ConfigManager::load(None)?;
/// let interval = config_manager.config().tick_interval();
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: Config,
    path: Option<PathBuf>,
}

impl ConfigManager {
    /// Creates a new ConfigManager with the given config and path.
    pub fn new(config: Config, path: Option<PathBuf>) -> Self {
        Self { config, path }
    }

    /// Loads configuration from file or standard locations.
    ///
    /// Searches for configuration in the following order:
    /// 1. Provided path parameter
    /// 2. HWMON_FAND_CONFIG environment variable
    /// 3. XDG_CONFIG_HOME/hwmon-fand/config.yml or ~/.config/hwmon-fand/config.yml
    /// 4. /etc/hwmon-fand/config.yml
    ///
    /// Built-in defaults are used when none of these exist.
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let Some(config_path) = path.or_else(locate_config) else {
            info!("No config file found, using built-in defaults");
            return Ok(Self::new(Config::default(), None));
        };

        info!("Loading config from: {}", config_path.display());
        let config = Self::load_config_from_path(&config_path)?;

        Ok(Self::new(config, Some(config_path)))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the path of the loaded file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn load_config_from_path(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML in: {}", path.display()))?;

        if config.version != 1 {
            anyhow::bail!(
                "Unsupported config version {} in file: {}",
                config.version,
                path.display()
            );
        }

        config
            .validate()
            .with_context(|| format!("Configuration validation failed for: {}", path.display()))?;

        Ok(config)
    }
}
