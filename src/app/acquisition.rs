//! Signal acquisition: manual button and raw dock contact.
//!
//! The button pad is normally a driven output (idle low).  To see whether
//! someone pressed the physical switch we briefly flip it to a pulled-up
//! input, let the pull-up settle, sample, and flip it back.  The dock
//! hardware sees that flip as a very short pulse; the settle window is
//! kept short enough that it does not count it as a press.

use super::ports::{ButtonLine, Clock, DockSensor};

/// Raw inputs for one iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    pub button_pressed: bool,
    pub dock_raw: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct SignalAcquisition {
    settle_ms: u32,
}

impl SignalAcquisition {
    pub fn new(settle_ms: u32) -> Self {
        Self { settle_ms }
    }

    /// Probe the button pad.  Always leaves it as an output driving low.
    pub fn read_button(&self, line: &mut impl ButtonLine, clock: &mut impl Clock) -> bool {
        line.enter_input_pullup();
        clock.delay_ms(self.settle_ms);
        // Active-low: the switch pulls the pad to ground.
        let pressed = !line.is_high();
        line.drive(false);
        pressed
    }

    pub fn sample(
        &self,
        hw: &mut (impl ButtonLine + DockSensor),
        clock: &mut impl Clock,
    ) -> Sample {
        let button_pressed = self.read_button(hw, clock);
        let dock_raw = hw.read_raw();
        Sample {
            button_pressed,
            dock_raw,
        }
    }
}
