//! Button press emulation.
//!
//! Holds the dock's button pad high for a fixed time, exactly like a finger
//! on the switch, then releases it.  There is no feedback from the shaver:
//! a press that stops a running clean looks identical to one that starts
//! it, so "cleaned" is recorded purely from the docked flag at press time.

use super::ports::{ButtonLine, Clock, StatusIndicator};
use super::state::DockState;

/// Fire-and-forget press pulse generator.
#[derive(Debug, Clone, Copy)]
pub struct ButtonActuator {
    press_duration_ms: u32,
}

impl ButtonActuator {
    pub fn new(press_duration_ms: u32) -> Self {
        Self { press_duration_ms }
    }

    /// Issue one press.  Blocks for the full pulse; never cancelled.
    /// Returns the press timestamp.
    pub fn press(
        &self,
        state: &mut DockState,
        hw: &mut (impl ButtonLine + StatusIndicator),
        clock: &mut impl Clock,
    ) -> u64 {
        let at = clock.now_ms();
        state.last_pressed_at = at;
        if state.is_docked {
            state.last_cleaned_at = at;
        }

        hw.suppress();
        hw.drive(true);
        clock.delay_ms(self.press_duration_ms);
        hw.drive(false);
        hw.restore();

        at
    }

    pub fn press_duration_ms(&self) -> u32 {
        self.press_duration_ms
    }
}
