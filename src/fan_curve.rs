//! Temperature to duty cycle mapping.
//!
//! A clamped linear ramp: below the lower threshold the fan gets the minimum
//! duty cycle, above the upper threshold the maximum, and in between the
//! duty cycle grows proportionally with temperature.

use serde::{Deserialize, Serialize};

use crate::{config::Config, sensors::Temperature};

/// PWM level written to a fan channel; 0 is off, 255 is full speed.
pub type DutyCycle = u8;

/// Clamped linear temperature ramp.
///
/// # Example
///
/// ```
/// use hwmon_fand::fan_curve::LinearCurve;
///
/// let curve = LinearCurve::default(); // 30 °C -> 0, 70 °C -> 255
/// assert_eq!(curve.calc_target(25_000), 0);
/// assert_eq!(curve.calc_target(45_000), 95);
/// assert_eq!(curve.calc_target(90_000), 255);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinearCurve {
    pub temp_min: Temperature,
    pub temp_max: Temperature,
    pub pwm_min: DutyCycle,
    pub pwm_max: DutyCycle,
}

impl Default for LinearCurve {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for LinearCurve {
    fn from(config: &Config) -> Self {
        Self {
            temp_min: config.temp_min,
            temp_max: config.temp_max,
            pwm_min: config.pwm_min,
            pwm_max: config.pwm_max,
        }
    }
}

impl LinearCurve {
    /// Target duty cycle for `temp`. Total over every temperature.
    ///
    /// Inside the ramp the offset above `pwm_min` is
    /// `floor((temp - temp_min) * (pwm_max - pwm_min) / (temp_max - temp_min))`,
    /// computed in integers so the result never depends on float rounding.
    /// The midpoint of the default ramp (50 °C) maps to 127.
    pub fn calc_target(&self, temp: Temperature) -> DutyCycle {
        if temp <= self.temp_min {
            return self.pwm_min;
        }
        if temp >= self.temp_max {
            return self.pwm_max;
        }

        let span = i128::from(self.temp_max) - i128::from(self.temp_min);
        let offset = i128::from(temp) - i128::from(self.temp_min);
        let range = i128::from(self.pwm_max - self.pwm_min);

        // 0 <= offset < span, so the quotient stays below `range`.
        self.pwm_min + (offset * range / span) as DutyCycle
    }

    /// Duty cycle used when the temperature cannot be determined.
    pub fn fail_safe(&self) -> DutyCycle {
        self.pwm_max
    }
}
