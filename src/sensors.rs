//! Temperature source abstraction and multi-source averaging.

use async_trait::async_trait;

use crate::error::{FanError, Result};

/// Temperature in millidegrees Celsius, as hwmon reports it.
pub type Temperature = i64;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TemperatureSensor: Send + Sync {
    /// Stable identifier used in logs (the device path for hwmon sources).
    fn key(&self) -> String;

    async fn read_temperature(&self) -> Result<Temperature>;
}

impl core::fmt::Debug for dyn TemperatureSensor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "TemperatureSensor({})", self.key())
    }
}

/// Reads every source in order and returns the arithmetic mean.
///
/// Reads are sequential and the first failure aborts the whole average. The division truncates toward zero,
/// so `[40000, 40001]` averages to `40000`. The sum is widened, so readings
/// near the `i64` limits still average correctly.
pub async fn read_average_temperature(
    sensors: &[Box<dyn TemperatureSensor>],
) -> Result<Temperature> {
    if sensors.is_empty() {
        return Err(FanError::EmptySourceSet);
    }

    let mut sum: i128 = 0;
    for sensor in sensors {
        sum += i128::from(sensor.read_temperature().await?);
    }

    // A mean of i64 values lies between their extremes.
    Ok((sum / sensors.len() as i128) as Temperature)
}
