//! The controller's single mutable state record.
//!
//! Written once per loop iteration by the acquisition, filter, scheduler
//! and actuator stages, in that order.  Nothing here survives a reset.

use crate::control::confidence::DockConfidence;

/// Process-wide dock state (timestamps in milliseconds since boot).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DockState {
    /// A manual press was sensed on the button pad this iteration.
    pub button_is_pressed: bool,
    /// Thresholded dock reading this iteration.
    pub dock_raw: bool,
    /// Debounce counter; owns the `is_docked` decision.
    pub confidence: DockConfidence,
    /// Mirror of `confidence.is_docked()` after the latest update.
    pub is_docked: bool,
    /// Time of the last press issued while docked.
    pub last_cleaned_at: u64,
    /// Armed clean deadline, `None` while disarmed.
    pub clean_due_at: Option<u64>,
    /// Time of the last press for any reason.
    pub last_pressed_at: u64,
}

impl DockState {
    /// Boot state: confidence at its midpoint, nothing scheduled.
    pub fn new() -> Self {
        let confidence = DockConfidence::new();
        Self {
            button_is_pressed: false,
            dock_raw: false,
            confidence,
            is_docked: confidence.is_docked(),
            last_cleaned_at: 0,
            clean_due_at: None,
            last_pressed_at: 0,
        }
    }

    /// Deadline as logged: `0` while disarmed.
    pub fn clean_due_ms(&self) -> u64 {
        self.clean_due_at.unwrap_or(0)
    }
}

impl Default for DockState {
    fn default() -> Self {
        Self::new()
    }
}
