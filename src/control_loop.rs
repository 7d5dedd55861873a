//! The periodic read, compute, limit and apply cycle.

use std::sync::Arc;

use anyhow::Result;
use log::{debug, error, info, warn};
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;

use crate::{
    app_context::ControlContext,
    error,
    fan_curve::DutyCycle,
    rate_limiter::ControlState,
    sensors::read_average_temperature,
};

/// Duty cycle the curve asks for right now, before rate limiting.
///
/// Any sensor failure selects the curve's fail-safe maximum: an unknown
/// temperature must never leave the fan slow.
pub async fn target_duty(ctx: &ControlContext) -> DutyCycle {
    match read_average_temperature(&ctx.sensors).await {
        Ok(temp) => {
            let target = ctx.curve.calc_target(temp);
            debug!("Average temperature {temp}, target duty {target}");
            target
        }
        Err(e) => {
            let fail_safe = ctx.curve.fail_safe();
            warn!("{e}; using fail-safe duty {fail_safe}");
            fail_safe
        }
    }
}

/// Runs one control tick and returns the duty cycle that was applied.
///
/// `state` is updated even when the write fails, so the next tick continues
/// the ramp from the value this tick attempted.
pub async fn tick(ctx: &ControlContext, state: &mut ControlState) -> error::Result<DutyCycle> {
    let target = target_duty(ctx).await;
    let duty = ctx.limiter.limit(target, state);
    debug!("Applying duty {duty} (target {target})");
    ctx.controller.apply(duty).await?;
    Ok(duty)
}

/// Ticks every `ctx.tick_interval` until `cancel_token` fires.
///
/// The first tick happens one full interval after the call; the initial
/// application belongs to startup. Write failures are logged and retried by
/// the next tick. A tick that has started always runs to completion.
pub async fn run_control_loop(
    ctx: Arc<ControlContext>,
    mut state: ControlState,
    cancel_token: CancellationToken,
) -> Result<()> {
    let period = ctx.tick_interval;
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;

            () = cancel_token.cancelled() => {
                info!("Control loop cancelled (last duty {})", state.last_applied);
                break;
            }
            _instant = interval.tick() => {
                if let Err(e) = tick(&ctx, &mut state).await {
                    error!("Can't set fan PWM: {e}");
                }
            }
        }
    }
    Ok(())
}
