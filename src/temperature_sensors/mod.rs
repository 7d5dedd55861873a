//! Temperature source implementations.

pub mod hwmon_sensor;

pub use hwmon_sensor::HwmonTempSource;
