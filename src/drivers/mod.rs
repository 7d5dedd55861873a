//! Hardware drivers for fan controllers.

pub mod hwmon_pwm;

pub use hwmon_pwm::HwmonPwmController;
