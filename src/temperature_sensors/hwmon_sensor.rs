use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::debug;

use crate::{
    error::{FanError, Result},
    sensors::{Temperature, TemperatureSensor},
};

/// CPU temperature source backed by an hwmon device directory.
#[derive(Debug, Clone)]
pub struct HwmonTempSource {
    device: PathBuf,
    input: PathBuf,
}

impl HwmonTempSource {
    /// `input_file` is the value file inside `device`, normally `temp1_input`.
    pub fn new(device: impl Into<PathBuf>, input_file: &str) -> Self {
        let device = device.into();
        let input = device.join(input_file);
        Self { device, input }
    }

    pub fn device(&self) -> &Path {
        &self.device
    }
}

#[async_trait]
impl TemperatureSensor for HwmonTempSource {
    fn key(&self) -> String {
        self.device.display().to_string()
    }

    async fn read_temperature(&self) -> Result<Temperature> {
        let content = tokio::fs::read_to_string(&self.input)
            .await
            .map_err(|e| FanError::SensorRead {
                path: self.input.clone(),
                reason: e.to_string(),
            })?;

        let temp = parse_millidegrees(&content).map_err(|reason| FanError::SensorRead {
            path: self.input.clone(),
            reason,
        })?;

        debug!("Temperature of {}: {temp}", self.key());
        Ok(temp)
    }
}

/// Parses exactly one decimal integer, surrounding whitespace allowed.
fn parse_millidegrees(content: &str) -> std::result::Result<Temperature, String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err("empty value".into());
    }
    trimmed
        .parse::<Temperature>()
        .map_err(|e| format!("invalid value '{trimmed}': {e}"))
}
