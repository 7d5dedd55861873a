//! Fan controller abstraction.

use async_trait::async_trait;

use crate::{error::Result, fan_curve::DutyCycle};

/// Trait for fan controller hardware implementations.
///
/// # Example
///
/// ```no_run
/// use hwmon_fand::{error::Result, fan_controller::FanController, fan_curve::DutyCycle};
///
/// #[derive(Debug)]
/// struct NullController;
///
/// #[async_trait::async_trait]
/// impl FanController for NullController {
///     fn key(&self) -> String { "null".into() }
///     async fn apply(&self, _duty: DutyCycle) -> Result<()> { Ok(()) }
/// }
/// ```
#[async_trait]
pub trait FanController: Send + Sync + core::fmt::Debug {
    /// Identifier used in logs.
    fn key(&self) -> String;

    /// Writes `duty` to every fan channel, in channel order.
    ///
    /// Stops at the first failing channel. Channels written before the
    /// failure keep the new value; nothing is rolled back or retried.
    async fn apply(&self, duty: DutyCycle) -> Result<()>;
}
