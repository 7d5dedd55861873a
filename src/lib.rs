//! # hwmon_fand
//!
//! A Linux daemon that drives PWM fans from CPU temperature through the
//! hwmon sysfs interface.
//!
//! ## Control cycle
//!
//! - **Discovery**: hwmon devices are classified by their `name` file into
//!   CPU temperature sources (`coretemp*`) and one fan controller (`nct*`).
//! - **Temperature**: the sources are read and averaged.
//! - **Curve**: the average is mapped onto a duty cycle by a clamped
//!   linear ramp (30 °C → 0, 70 °C → 255 by default).
//! - **Rate limiting**: each tick moves the duty cycle by at most a few
//!   units, so fan speed changes stay gradual.
//! - **Actuation**: the duty cycle is written to every PWM channel.
//!
//! An unreadable sensor selects full speed. On SIGTERM, SIGQUIT, SIGINT or
//! SIGHUP the loop is stopped and the fans are left at half speed.
//!
//! ## Architecture
//!
//! - [`SystemCoordinator`](coordinator::SystemCoordinator) - Starting, Running, Stopping lifecycle
//! - [`TaskManager`](task_manager::TaskManager) - background loop with cooperative cancellation
//! - [`ControlContext`](app_context::ControlContext) - read-only handles and policy
//! - [`ControlState`](rate_limiter::ControlState) - the only mutable control data
//!
//! ## Example
//!
//! ```no_run
//! use hwmon_fand::{application::Application, config::ConfigManager};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config_manager = ConfigManager::load(None)?;
//!     Application::builder()
//!         .with_config_manager(config_manager)
//!         .build()?
//!         .run()
//!         .await
//! }
//! ```

pub mod app_context;
pub mod application;
pub mod cli;
pub mod config;
pub mod control_loop;
pub mod coordinator;
pub mod drivers;
pub mod error;
pub mod fan_controller;
pub mod fan_curve;
pub mod hwmon;
pub mod rate_limiter;
pub mod sensors;
pub mod signals;
pub mod task_manager;
pub mod temperature_sensors;
