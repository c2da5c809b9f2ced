//! Raw dock-presence probes.
//!
//! ## Variants
//!
//! | Probe            | Source                          | Present when           |
//! |------------------|---------------------------------|------------------------|
//! | Analog (mV)      | calibrated ADC1 millivolts      | `mv > threshold_mv`    |
//! | Analog (raw)     | raw ADC1 counts                 | `raw > threshold`      |
//! | Status LED       | digital GPIO on the dock LED    | level == active level  |
//!
//! A single reading is noisy; filtering happens in
//! [`crate::control::confidence`].
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads real pins via hw_init helpers.
//! On host/test: reads simulation atomics (default: shaver absent).

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicBool, AtomicU16, Ordering};

use crate::app::ports::DockSensor;
use crate::config::{DockConfig, DockSensing};

#[cfg(not(target_os = "espidf"))]
static SIM_DOCK_MV: AtomicU16 = AtomicU16::new(0);
#[cfg(not(target_os = "espidf"))]
static SIM_DOCK_RAW: AtomicU16 = AtomicU16::new(0);
#[cfg(not(target_os = "espidf"))]
static SIM_DOCK_LED: AtomicBool = AtomicBool::new(false);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_dock_mv(mv: u16) {
    SIM_DOCK_MV.store(mv, Ordering::Relaxed);
}

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_dock_raw(raw: u16) {
    SIM_DOCK_RAW.store(raw, Ordering::Relaxed);
}

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_dock_led(level_high: bool) {
    SIM_DOCK_LED.store(level_high, Ordering::Relaxed);
}

// ── Analog probe ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalogScale {
    Millivolts,
    Raw,
}

pub struct AnalogDockSensor {
    channel: u32,
    scale: AnalogScale,
    threshold: u16,
    last_value: u16,
}

impl AnalogDockSensor {
    pub fn new(channel: u32, scale: AnalogScale, threshold: u16) -> Self {
        Self {
            channel,
            scale,
            threshold,
            last_value: 0,
        }
    }

    /// Last sampled value, in the probe's own scale.
    pub fn last_value(&self) -> u16 {
        self.last_value
    }

    #[cfg(target_os = "espidf")]
    fn sample(&self) -> u16 {
        use crate::drivers::hw_init;
        match self.scale {
            AnalogScale::Millivolts => hw_init::adc1_read_mv(self.channel),
            AnalogScale::Raw => hw_init::adc1_read_raw(self.channel),
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn sample(&self) -> u16 {
        let _ = self.channel;
        match self.scale {
            AnalogScale::Millivolts => SIM_DOCK_MV.load(Ordering::Relaxed),
            AnalogScale::Raw => SIM_DOCK_RAW.load(Ordering::Relaxed),
        }
    }
}

impl DockSensor for AnalogDockSensor {
    fn read_raw(&mut self) -> bool {
        self.last_value = self.sample();
        self.last_value > self.threshold
    }
}

// ── Status LED probe ──────────────────────────────────────────

pub struct LedDockSensor {
    gpio: i32,
    active_high: bool,
}

impl LedDockSensor {
    pub fn new(gpio: i32, active_high: bool) -> Self {
        Self { gpio, active_high }
    }

    #[cfg(target_os = "espidf")]
    fn level(&self) -> bool {
        crate::drivers::hw_init::gpio_read(self.gpio)
    }

    #[cfg(not(target_os = "espidf"))]
    fn level(&self) -> bool {
        let _ = self.gpio;
        SIM_DOCK_LED.load(Ordering::Relaxed)
    }
}

impl DockSensor for LedDockSensor {
    fn read_raw(&mut self) -> bool {
        self.level() == self.active_high
    }
}

// ── Probe selection ───────────────────────────────────────────

/// The probe selected by [`DockConfig::dock_sensing`].
pub enum DockProbe {
    Analog(AnalogDockSensor),
    StatusLed(LedDockSensor),
}

impl DockProbe {
    pub fn from_config(config: &DockConfig) -> Self {
        let pins = &config.pins;
        match config.dock_sensing {
            DockSensing::AnalogMillivolts { threshold_mv } => Self::Analog(AnalogDockSensor::new(
                pins.dock_adc_channel,
                AnalogScale::Millivolts,
                threshold_mv,
            )),
            DockSensing::AnalogRaw { threshold } => Self::Analog(AnalogDockSensor::new(
                pins.dock_adc_channel,
                AnalogScale::Raw,
                threshold,
            )),
            DockSensing::StatusLed { active_high } => {
                Self::StatusLed(LedDockSensor::new(pins.dock_status_gpio, active_high))
            }
        }
    }
}

impl DockSensor for DockProbe {
    fn read_raw(&mut self) -> bool {
        match self {
            Self::Analog(s) => s.read_raw(),
            Self::StatusLed(s) => s.read_raw(),
        }
    }
}
