//! Read-only context shared by the coordinator and the control loop.

use std::{sync::Arc, time::Duration};

use crate::{
    config::Config,
    fan_controller::FanController,
    fan_curve::{DutyCycle, LinearCurve},
    hwmon::Topology,
    rate_limiter::RateLimiter,
    sensors::TemperatureSensor,
};

/// Discovered handles plus the control policy.
///
/// Nothing in here changes after startup, so it is shared through an `Arc`
/// without locking. The only mutable control data,
/// [`ControlState`](crate::rate_limiter::ControlState), lives outside.
#[derive(Debug)]
pub struct ControlContext {
    /// Temperature sources averaged on every tick.
    pub sensors: Vec<Box<dyn TemperatureSensor>>,
    /// Fan actuator every duty cycle is written to.
    pub controller: Arc<dyn FanController>,
    pub curve: LinearCurve,
    pub limiter: RateLimiter,
    /// Written once when the daemon stops.
    pub neutral_duty: DutyCycle,
    pub tick_interval: Duration,
}

impl ControlContext {
    pub fn new(
        sensors: Vec<Box<dyn TemperatureSensor>>,
        controller: Arc<dyn FanController>,
        config: &Config,
    ) -> Self {
        Self {
            sensors,
            controller,
            curve: LinearCurve::from(config),
            limiter: RateLimiter::new(config.max_step),
            neutral_duty: config.neutral_duty(),
            tick_interval: config.tick_interval(),
        }
    }

    /// Builds the context from discovered hwmon devices.
    pub fn from_topology(topology: Topology, config: &Config) -> Self {
        Self::new(topology.sensors, Arc::new(topology.controller), config)
    }
}
