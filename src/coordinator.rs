//! Control scheduler lifecycle: Starting, Running, Stopping.

use std::{fmt, future::Future, sync::Arc};

use anyhow::{Context, Result, bail};
use log::{error, info, warn};

use crate::{
    app_context::ControlContext,
    control_loop::{run_control_loop, target_duty},
    error::FanError,
    fan_curve::DutyCycle,
    rate_limiter::ControlState,
    task_manager::TaskManager,
};

const CONTROL_TASK: &str = "FanControlLoop";

/// Lifecycle phase of the coordinator. `Stopping` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlPhase {
    Starting,
    Running,
    Stopping,
}

/// Drives the control loop from the initial application to the final
/// neutral write.
///
/// # Lifecycle
/// - [`initialize`](Self::initialize): applies the unlimited initial duty.
///   Failure here is the only fatal error.
/// - [`start`](Self::start): hands the control state to the background loop.
/// - [`shutdown`](Self::shutdown): cancels and joins the loop, then writes
///   the neutral duty once.
pub struct SystemCoordinator {
    phase: ControlPhase,
    task_manager: TaskManager,
    context: Option<Arc<ControlContext>>,
    state: Option<ControlState>,
}

impl Default for SystemCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemCoordinator {
    pub fn new() -> Self {
        Self {
            phase: ControlPhase::Starting,
            task_manager: TaskManager::new(),
            context: None,
            state: None,
        }
    }

    pub const fn phase(&self) -> ControlPhase {
        self.phase
    }

    /// Applies the first duty cycle straight from the curve and seeds the
    /// control state with it.
    ///
    /// A sensor failure here selects the fail-safe maximum like any tick.
    /// An empty sensor set or a failed write aborts startup.
    pub async fn initialize(&mut self, context: ControlContext) -> Result<DutyCycle> {
        if self.phase != ControlPhase::Starting || self.context.is_some() {
            bail!("Coordinator already initialized");
        }
        if context.sensors.is_empty() {
            return Err(FanError::EmptySourceSet).context("Cannot start fan control");
        }

        info!("Initializing fan control on {}", context.controller.key());

        let duty = target_duty(&context).await;
        context
            .controller
            .apply(duty)
            .await
            .context("Can't set initial fan PWM")?;
        info!("Initial duty cycle {duty}");

        self.state = Some(ControlState::new(duty));
        self.context = Some(Arc::new(context));
        Ok(duty)
    }

    /// Spawns the periodic control loop. Requires a successful `initialize`.
    pub fn start(&mut self) -> Result<()> {
        let (Some(context), Some(state)) = (self.context.clone(), self.state.take()) else {
            bail!("Coordinator must be initialized before start");
        };

        info!(
            "Starting control loop, interval {:?}, max step {}",
            context.tick_interval,
            context.limiter.max_step()
        );
        self.task_manager
            .spawn_task(CONTROL_TASK, move |cancel_token| {
                run_control_loop(context, state, cancel_token)
            });
        self.phase = ControlPhase::Running;
        Ok(())
    }

    /// Waits for `shutdown_request` and then performs the shutdown sequence.
    pub async fn run_main_loop<F, S>(&mut self, shutdown_request: F) -> Result<()>
    where
        F: Future<Output = S>,
        S: fmt::Display,
    {
        let reason = shutdown_request.await;
        info!("exit: {reason}");
        self.shutdown().await
    }

    /// Stops the loop and writes the neutral duty cycle.
    ///
    /// The neutral write only happens after the loop task has been joined,
    /// so it can never interleave with a tick's write. A failed write is
    /// logged, not returned. Calling this again is a no-op.
    pub async fn shutdown(&mut self) -> Result<()> {
        if self.phase == ControlPhase::Stopping {
            return Ok(());
        }
        self.phase = ControlPhase::Stopping;
        info!("Initiating graceful shutdown...");

        if let Err(e) = self.task_manager.shutdown_all().await {
            error!("Error during task shutdown: {e:#}");
        }

        let Some(context) = self.context.take() else {
            warn!("Shutdown before initialization, no fan state to restore");
            return Ok(());
        };

        let neutral = context.neutral_duty;
        match context.controller.apply(neutral).await {
            Ok(()) => info!("Fan PWM set to neutral duty {neutral}"),
            Err(e) => error!("Can't set neutral fan PWM: {e}"),
        }

        info!("Shutdown complete");
        Ok(())
    }

    #[cfg(test)]
    fn loop_running(&self) -> bool {
        self.task_manager.is_running(CONTROL_TASK)
    }
}
