//! Bidirectional driver for the dock's button pad.
//!
//! ## Hardware
//!
//! The controller GPIO is wired in parallel with the dock's own momentary
//! switch.  Idle, the pin is an output driving low.  To emulate a press it
//! drives high; to detect a manual press it briefly becomes a pulled-up
//! input and reads the level (the switch pulls the pad to ground).
//!
//! ## Dual-target design
//!
//! On ESP-IDF: switches the real pin via hw_init helpers.
//! On host/test: reads the input level from a simulation atomic and records
//! the last driven level in another.

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicBool, Ordering};

use crate::app::ports::ButtonLine;
use crate::drivers::hw_init;

#[cfg(not(target_os = "espidf"))]
static SIM_BUTTON_LEVEL: AtomicBool = AtomicBool::new(true);
#[cfg(not(target_os = "espidf"))]
static SIM_BUTTON_DRIVEN: AtomicBool = AtomicBool::new(false);

/// Simulated pad level seen while in input mode (`false` = switch held).
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_button_level(high: bool) {
    SIM_BUTTON_LEVEL.store(high, Ordering::Relaxed);
}

/// Last level driven while in output mode.
#[cfg(not(target_os = "espidf"))]
pub fn sim_driven_level() -> bool {
    SIM_BUTTON_DRIVEN.load(Ordering::Relaxed)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadMode {
    Input,
    Output { high: bool },
}

pub struct ButtonLineDriver {
    gpio: i32,
    mode: PadMode,
}

impl ButtonLineDriver {
    /// Matches the boot state set by `hw_init::init_peripherals`.
    pub fn new(gpio: i32) -> Self {
        Self {
            gpio,
            mode: PadMode::Output { high: false },
        }
    }

    pub fn gpio(&self) -> i32 {
        self.gpio
    }

    pub fn mode(&self) -> PadMode {
        self.mode
    }

    #[cfg(target_os = "espidf")]
    fn level(&self) -> bool {
        hw_init::gpio_read(self.gpio)
    }

    #[cfg(not(target_os = "espidf"))]
    fn level(&self) -> bool {
        SIM_BUTTON_LEVEL.load(Ordering::Relaxed)
    }
}

impl ButtonLine for ButtonLineDriver {
    fn enter_input_pullup(&mut self) {
        if self.mode != PadMode::Input {
            hw_init::gpio_set_input_pullup(self.gpio);
            self.mode = PadMode::Input;
        }
    }

    fn is_high(&mut self) -> bool {
        match self.mode {
            PadMode::Input => self.level(),
            PadMode::Output { high } => high,
        }
    }

    fn drive(&mut self, high: bool) {
        if self.mode == PadMode::Input {
            hw_init::gpio_set_output(self.gpio);
        }
        hw_init::gpio_write(self.gpio, high);
        #[cfg(not(target_os = "espidf"))]
        SIM_BUTTON_DRIVEN.store(high, Ordering::Relaxed);
        self.mode = PadMode::Output { high };
    }
}
