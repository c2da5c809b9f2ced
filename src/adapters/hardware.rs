//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the button pad driver, the dock probe and the optional status LED,
//! exposing them through [`ButtonLine`], [`DockSensor`] and
//! [`StatusIndicator`].  This is the only module in the system that touches
//! actual hardware.  On non-espidf targets, the underlying drivers use
//! cfg-gated simulation stubs.

use crate::app::ports::{ButtonLine, DockSensor, StatusIndicator};
use crate::config::DockConfig;
use crate::drivers::button::ButtonLineDriver;
use crate::drivers::status_led::StatusLed;
use crate::sensors::DockProbe;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter {
    button: ButtonLineDriver,
    dock: DockProbe,
    led: Option<StatusLed>,
}

impl HardwareAdapter {
    pub fn new(button: ButtonLineDriver, dock: DockProbe, led: Option<StatusLed>) -> Self {
        Self { button, dock, led }
    }

    /// Build every driver from the board pin map and sensing strategy.
    /// Call after `hw_init::init_peripherals`.
    pub fn from_config(config: &DockConfig) -> Self {
        let led = config
            .pins
            .status_led_gpio
            .map(|_| StatusLed::new(config.led_idle_duty));
        let mut hw = Self::new(
            ButtonLineDriver::new(config.pins.button_gpio),
            DockProbe::from_config(config),
            led,
        );
        hw.restore();
        hw
    }

    pub fn led_duty(&self) -> Option<u8> {
        self.led.as_ref().map(StatusLed::current_duty)
    }
}

// ── ButtonLine implementation ─────────────────────────────────

impl ButtonLine for HardwareAdapter {
    fn enter_input_pullup(&mut self) {
        self.button.enter_input_pullup();
    }

    fn is_high(&mut self) -> bool {
        self.button.is_high()
    }

    fn drive(&mut self, high: bool) {
        self.button.drive(high);
    }
}

// ── DockSensor implementation ─────────────────────────────────

impl DockSensor for HardwareAdapter {
    fn read_raw(&mut self) -> bool {
        self.dock.read_raw()
    }
}

// ── StatusIndicator implementation ────────────────────────────

impl StatusIndicator for HardwareAdapter {
    fn suppress(&mut self) {
        if let Some(led) = self.led.as_mut() {
            led.off();
        }
    }

    fn restore(&mut self) {
        if let Some(led) = self.led.as_mut() {
            led.idle();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pins;

    #[test]
    fn led_follows_board() {
        let with_led = HardwareAdapter::from_config(&DockConfig {
            pins: pins::S2_MINI,
            led_idle_duty: 64,
            ..DockConfig::default()
        });
        assert_eq!(with_led.led_duty(), Some(64));

        let without = HardwareAdapter::from_config(&DockConfig {
            pins: pins::WROOM_32,
            ..DockConfig::default()
        });
        assert_eq!(without.led_duty(), None);
    }

    #[test]
    fn indicator_dark_while_suppressed() {
        let mut hw = HardwareAdapter::from_config(&DockConfig {
            pins: pins::S2_MINI,
            ..DockConfig::default()
        });
        hw.suppress();
        assert_eq!(hw.led_duty(), Some(0));
        hw.restore();
        assert_eq!(hw.led_duty(), Some(DockConfig::default().led_idle_duty));
    }
}
