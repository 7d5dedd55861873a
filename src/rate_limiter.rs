//! Slew-rate limiting of duty cycle changes between control ticks.

use crate::fan_curve::DutyCycle;

/// Mutable state carried from one control tick to the next.
///
/// Owned by exactly one task at a time: the coordinator while starting, then
/// the control loop until it exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlState {
    pub last_applied: DutyCycle,
}

impl ControlState {
    /// Seeds the state with the duty cycle applied at startup.
    pub const fn new(initial: DutyCycle) -> Self {
        Self {
            last_applied: initial,
        }
    }
}

/// Bounds the per-tick change of the duty cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimiter {
    max_step: DutyCycle,
}

impl RateLimiter {
    pub const fn new(max_step: DutyCycle) -> Self {
        Self { max_step }
    }

    pub const fn max_step(&self) -> DutyCycle {
        self.max_step
    }

    /// Moves from the last applied value toward `target` by at most
    /// `max_step`, records the result in `state` and returns it.
    ///
    /// ```
    /// use hwmon_fand::rate_limiter::{ControlState, RateLimiter};
    ///
    /// let limiter = RateLimiter::new(5);
    /// let mut state = ControlState::new(0);
    /// assert_eq!(limiter.limit(95, &mut state), 5);
    /// assert_eq!(limiter.limit(95, &mut state), 10);
    /// assert_eq!(limiter.limit(8, &mut state), 8);
    /// ```
    pub fn limit(&self, target: DutyCycle, state: &mut ControlState) -> DutyCycle {
        let last = state.last_applied;
        let next = if target > last {
            target.min(last.saturating_add(self.max_step))
        } else {
            target.max(last.saturating_sub(self.max_step))
        };
        state.last_applied = next;
        next
    }
}
