//! System configuration parameters
//!
//! Every tunable of the dock controller lives in [`DockConfig`].  There is no
//! persisted configuration: the defaults below are the firmware's
//! compile-time constants, with network secrets taken from build-time
//! environment variables (`DOCK_WIFI_SSID`, `DOCK_WIFI_PASSWORD`,
//! `DOCK_OTA_PASSWORD`, `DOCK_HOSTNAME`).

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::pins::{self, BoardPins};

/// Longest button-line settle window the dock tolerates before it reads the
/// pull-up transition as a real press.
pub const MAX_BUTTON_SETTLE_MS: u32 = 20;

/// How the dock-status pad is turned into a raw "docked" boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DockSensing {
    /// Calibrated ADC voltage above `threshold_mv`.
    AnalogMillivolts { threshold_mv: u16 },
    /// Uncalibrated ADC counts above `threshold`.
    AnalogRaw { threshold: u16 },
    /// Digital read of the dock's centre status LED.
    StatusLed { active_high: bool },
}

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DockConfig {
    // --- Board ---
    pub pins: BoardPins,
    pub dock_sensing: DockSensing,
    /// Status LED PWM duty while idle (0-255, 255 = fully lit).
    pub led_idle_duty: u8,

    // --- Button line ---
    /// Pull-up settle time before sampling the button pad (ms).
    pub button_settle_ms: u32,
    /// Length of an emulated press (ms).
    pub press_duration_ms: u32,

    // --- Scheduling ---
    /// Sleep at the end of every control loop iteration (ms).
    pub loop_period_ms: u32,
    /// A clean older than this is stale (ms).
    pub clean_interval_ms: u64,
    /// Uptime during which every undock arms a clean (ms).
    pub boot_window_ms: u64,
    /// Delay between the last undocked observation and the clean press (ms).
    pub clean_delay_ms: u64,
    /// Press the button every `debug_loop_period_ms` regardless of state.
    pub debug_loop: bool,
    pub debug_loop_period_ms: u64,

    // --- Network ---
    pub hostname: heapless::String<32>,
    pub wifi_ssid: heapless::String<32>,
    pub wifi_password: heapless::String<64>,
    pub ota_password: heapless::String<64>,
    pub ota_port: u16,
    /// Wait before restarting after a failed association (ms).
    pub restart_delay_ms: u32,
}

impl Default for DockConfig {
    fn default() -> Self {
        Self {
            // Board
            pins: pins::S2_MINI,
            dock_sensing: DockSensing::AnalogMillivolts { threshold_mv: 300 },
            led_idle_duty: 255,

            // Button line
            button_settle_ms: 5,
            press_duration_ms: 800,

            // Scheduling
            loop_period_ms: 25,
            clean_interval_ms: 60 * 60 * 1000, // 1 h
            boot_window_ms: 60 * 60 * 1000,    // 1 h
            clean_delay_ms: 30 * 1000,         // 30 s
            debug_loop: false,
            debug_loop_period_ms: 10 * 1000,

            // Network
            hostname: bounded(option_env!("DOCK_HOSTNAME").unwrap_or("braun-dock")),
            wifi_ssid: bounded(option_env!("DOCK_WIFI_SSID").unwrap_or("")),
            wifi_password: bounded(option_env!("DOCK_WIFI_PASSWORD").unwrap_or("")),
            ota_password: bounded(option_env!("DOCK_OTA_PASSWORD").unwrap_or("")),
            ota_port: 3232,
            restart_delay_ms: 5000,
        }
    }
}

impl DockConfig {
    /// Range-check the configuration.  Called once at startup.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.button_settle_ms == 0 || self.button_settle_ms > MAX_BUTTON_SETTLE_MS {
            return Err(ConfigError::ValidationFailed(
                "button_settle_ms must be 1..=20",
            ));
        }
        if self.press_duration_ms == 0 {
            return Err(ConfigError::ValidationFailed("press_duration_ms must be > 0"));
        }
        if self.loop_period_ms == 0 {
            return Err(ConfigError::ValidationFailed("loop_period_ms must be > 0"));
        }
        if self.clean_delay_ms == 0 {
            return Err(ConfigError::ValidationFailed("clean_delay_ms must be > 0"));
        }
        if self.debug_loop && self.debug_loop_period_ms <= u64::from(self.press_duration_ms) {
            return Err(ConfigError::ValidationFailed(
                "debug_loop_period_ms must exceed press_duration_ms",
            ));
        }
        if self.hostname.is_empty() {
            return Err(ConfigError::ValidationFailed("hostname must not be empty"));
        }
        if self.ota_port == 0 {
            return Err(ConfigError::ValidationFailed("ota_port must be non-zero"));
        }
        Ok(())
    }

    /// JSON rendering for the boot log, with secrets masked.
    pub fn to_redacted_json(&self) -> String {
        let mut shown = self.clone();
        for secret in [&mut shown.wifi_password, &mut shown.ota_password] {
            if !secret.is_empty() {
                *secret = bounded("***");
            }
        }
        serde_json::to_string(&shown).unwrap_or_default()
    }
}

/// Copy `s` into a fixed-capacity string, truncating at a char boundary.
fn bounded<const N: usize>(s: &str) -> heapless::String<N> {
    let mut out = heapless::String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

/// Errors from configuration checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let c = DockConfig::default();
        assert!(c.validate().is_ok());
        assert_eq!(c.button_settle_ms, 5);
        assert_eq!(c.press_duration_ms, 800);
        assert_eq!(c.clean_delay_ms, 30_000);
        assert_eq!(c.clean_interval_ms, 3_600_000);
        assert_eq!(c.ota_port, 3232);
    }

    #[test]
    fn timing_ratios_make_sense() {
        let c = DockConfig::default();
        assert!(
            c.button_settle_ms < c.loop_period_ms,
            "settle window must be shorter than the loop period"
        );
        assert!(
            u64::from(c.press_duration_ms) < c.clean_delay_ms,
            "a press must finish well before the next clean can be due"
        );
    }

    #[test]
    fn rejects_long_settle_window() {
        let c = DockConfig {
            button_settle_ms: 50,
            ..DockConfig::default()
        };
        assert!(matches!(c.validate(), Err(ConfigError::ValidationFailed(_))));
    }

    #[test]
    fn rejects_debug_loop_faster_than_press() {
        let c = DockConfig {
            debug_loop: true,
            debug_loop_period_ms: 500,
            ..DockConfig::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn redacted_json_hides_secrets() {
        let c = DockConfig {
            wifi_password: bounded("hunter2hunter2"),
            ota_password: bounded("flash-me"),
            ..DockConfig::default()
        };
        let json = c.to_redacted_json();
        assert!(!json.contains("hunter2hunter2"));
        assert!(!json.contains("flash-me"));
        assert!(json.contains("\"press_duration_ms\":800"));
    }

    #[test]
    fn serde_roundtrip() {
        let c = DockConfig::default();
        let json = serde_json::to_string(&c).unwrap();
        let c2: DockConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(c.pins, c2.pins);
        assert_eq!(c.dock_sensing, c2.dock_sensing);
        assert_eq!(c.hostname, c2.hostname);
    }

    #[test]
    fn idle_led_is_full_scale_at_pwm_resolution() {
        let full = (1u32 << pins::PWM_RESOLUTION_BITS) - 1;
        assert_eq!(u32::from(DockConfig::default().led_idle_duty), full);
    }

    #[test]
    fn bounded_truncates() {
        let s: heapless::String<4> = bounded("abcdef");
        assert_eq!(s.as_str(), "abcd");
    }
}
