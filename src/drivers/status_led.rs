//! Single-colour status LED driver.
//!
//! One LEDC PWM channel.  Glows at an idle duty while the loop runs and
//! goes dark during an emulated press so the pulse is visible on the bench.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the LEDC channel via hw_init.
//! On host/test: tracks duty in-memory only.

use crate::drivers::hw_init;

pub struct StatusLed {
    idle_duty: u8,
    current: u8,
}

impl StatusLed {
    pub fn new(idle_duty: u8) -> Self {
        Self {
            idle_duty,
            current: 0,
        }
    }

    pub fn set_duty(&mut self, duty: u8) {
        hw_init::ledc_set(hw_init::LEDC_CH_STATUS, duty);
        self.current = duty;
    }

    pub fn idle(&mut self) {
        self.set_duty(self.idle_duty);
    }

    pub fn off(&mut self) {
        self.set_duty(0);
    }

    pub fn current_duty(&self) -> u8 {
        self.current
    }
}
