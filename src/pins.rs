//! GPIO / peripheral pin assignments for the supported controller boards.
//!
//! Single source of truth for pin numbers.  [`DockConfig`](crate::config::DockConfig)
//! picks one [`BoardPins`] preset at startup; no driver hard-codes a pin.
//!
//! The dock PCB exposes two signals we care about:
//!
//! - the **button pad** (the physical clean/stop switch), which we both
//!   sense (pulled-up input, active-low) and drive (push-pull output), and
//! - the **dock status pad** (top-right test point), an analog level that
//!   sits above ~300 mV while a shaver is seated.

use serde::{Deserialize, Serialize};

/// Pin set for one controller board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardPins {
    /// Button pad: output for press emulation, pulled-up input for sensing.
    pub button_gpio: i32,
    /// Dock status pad (analog) or centre LED tap (digital).
    pub dock_status_gpio: i32,
    /// ADC1 channel wired to `dock_status_gpio`.
    pub dock_adc_channel: u32,
    /// Controller status LED, if the board has one.
    pub status_led_gpio: Option<i32>,
}

// ---------------------------------------------------------------------------
// Wemos S2 Mini (ESP32-S2), fits inside the dock housing
// ---------------------------------------------------------------------------

pub const S2_MINI: BoardPins = BoardPins {
    button_gpio: 4,
    dock_status_gpio: 8,
    // GPIO8 is ADC1_CH7 on the ESP32-S2.
    dock_adc_channel: 7,
    status_led_gpio: Some(15),
};

// ---------------------------------------------------------------------------
// ESP32-WROOM-32 devkit
// ---------------------------------------------------------------------------

pub const WROOM_32: BoardPins = BoardPins {
    button_gpio: 25,
    dock_status_gpio: 33,
    // GPIO33 is ADC1_CH5 on the ESP32.
    dock_adc_channel: 5,
    status_led_gpio: None,
};

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// LEDC timer resolution (bits).  8-bit gives 0 – 255 duty levels.
pub const PWM_RESOLUTION_BITS: u32 = 8;
/// LEDC frequency for the status LED (5 kHz).
pub const LED_PWM_FREQ_HZ: u32 = 5_000;
