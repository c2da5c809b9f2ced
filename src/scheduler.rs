//! Clean-due scheduler.
//!
//! Decides when the controller must press the button on its own.  Two
//! independent sources exist:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Trigger Sources                          │
//! │                                                              │
//! │  ┌──────────────────────────┐      ┌──────────────────────┐  │
//! │  │ Clean deadline           │      │ Debug press loop     │  │
//! │  │ (stale clean + undocked) │      │ (fixed period)       │  │
//! │  └────────────┬─────────────┘      └───────────┬──────────┘  │
//! │               │                                │             │
//! │               ▼                                ▼             │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │          DockController → ButtonActuator::press        │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Clean deadline
//!
//! Every iteration, while the shaver is **not** docked and either the last
//! clean is older than `clean_interval_ms` or the device is still inside
//! its `boot_window_ms`, the deadline is (re-)armed at
//! `now + clean_delay_ms`.  Continuous undocking therefore keeps pushing
//! the deadline out; it only elapses `clean_delay_ms` after the last
//! undocked observation, i.e. once the shaver has been put back.
//!
//! ```text
//!  Disarmed ──(stale ∧ undocked)──▶ Armed ──(now > due)──▶ Fired
//!      ▲                              │ ▲                    │
//!      │                              └─┘ re-arm            │
//!      └─────────────────────────────────────────────────────┘
//! ```
//!
//! Re-docking does not disarm a pending deadline.

use log::debug;

use crate::app::state::DockState;
use crate::config::DockConfig;

/// Arms and fires the autonomous clean press.
#[derive(Debug, Clone, Copy)]
pub struct CleanScheduler {
    clean_interval_ms: u64,
    boot_window_ms: u64,
    clean_delay_ms: u64,
}

impl CleanScheduler {
    pub fn new(config: &DockConfig) -> Self {
        Self {
            clean_interval_ms: config.clean_interval_ms,
            boot_window_ms: config.boot_window_ms,
            clean_delay_ms: config.clean_delay_ms,
        }
    }

    /// Whether a clean is owed: the last one is stale, or we are still in
    /// the boot window (so a fresh power-up never waits a full interval).
    pub fn clean_is_stale(&self, state: &DockState, now_ms: u64) -> bool {
        now_ms.saturating_sub(state.last_cleaned_at) > self.clean_interval_ms
            || now_ms < self.boot_window_ms
    }

    /// Re-arm the deadline if a clean is owed and the shaver is out.
    /// Returns `true` if the deadline was (re-)armed.
    pub fn arm(&self, state: &mut DockState, now_ms: u64) -> bool {
        if !state.is_docked && self.clean_is_stale(state, now_ms) {
            state.clean_due_at = Some(now_ms + self.clean_delay_ms);
            return true;
        }
        false
    }

    /// Disarm and report `true` once the armed deadline has passed.
    ///
    /// The deadline is cleared *before* the caller presses, so a press that
    /// itself takes wall-clock time cannot fire twice.
    pub fn take_due(&self, state: &mut DockState, now_ms: u64) -> bool {
        match state.clean_due_at {
            Some(due) if now_ms > due => {
                state.clean_due_at = None;
                debug!("scheduler: clean deadline {} elapsed at {}", due, now_ms);
                true
            }
            _ => false,
        }
    }

    /// One scheduler pass: arm, then check for expiry.
    pub fn tick(&self, state: &mut DockState, now_ms: u64) -> bool {
        self.arm(state, now_ms);
        self.take_due(state, now_ms)
    }
}

/// Fixed-period bench loop that presses regardless of dock state.
#[derive(Debug, Clone, Copy)]
pub struct DebugPressLoop {
    period_ms: u64,
    next_at: u64,
}

impl DebugPressLoop {
    pub fn new(period_ms: u64) -> Self {
        Self {
            period_ms,
            next_at: 0,
        }
    }

    /// `true` when a press is owed.  The next slot advances by one period
    /// from the previous slot, not from `now`.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        if now_ms > self.next_at {
            self.next_at += self.period_ms;
            return true;
        }
        false
    }

    pub fn next_at(&self) -> u64 {
        self.next_at
    }
}
