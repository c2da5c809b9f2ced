//! One-shot hardware peripheral initialization and raw pin helpers.
//!
//! Configures the button pad, the dock-status ADC channel (with voltage
//! calibration when the chip supports it) and the status LED LEDC channel
//! using raw ESP-IDF sys calls.  Called once from `main()` before the
//! control loop starts.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::{info, warn};

use crate::config::{DockConfig, DockSensing};

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    AdcInitFailed(i32),
    GpioConfigFailed(i32),
    LedcInitFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AdcInitFailed(rc) => write!(f, "ADC1 init failed (rc={})", rc),
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::LedcInitFailed(rc) => write!(f, "LEDC timer/channel config failed (rc={})", rc),
        }
    }
}

#[cfg(target_os = "espidf")]
pub fn init_peripherals(config: &DockConfig) -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the control loop; single-threaded.
    unsafe {
        init_button(config.pins.button_gpio)?;
        match config.dock_sensing {
            DockSensing::StatusLed { .. } => init_digital_input(config.pins.dock_status_gpio)?,
            DockSensing::AnalogMillivolts { .. } | DockSensing::AnalogRaw { .. } => {
                init_adc(config.pins.dock_adc_channel)?;
            }
        }
        if let Some(led) = config.pins.status_led_gpio {
            init_ledc(led)?;
        }
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals(config: &DockConfig) -> Result<(), HwInitError> {
    log::info!(
        "hw_init(sim): peripheral init skipped (sensing={:?})",
        config.dock_sensing
    );
    Ok(())
}

// ── Button pad ────────────────────────────────────────────────

/// Boot state of the pad: output, driven low (not pressed).
#[cfg(target_os = "espidf")]
unsafe fn init_button(pin: i32) -> Result<(), HwInitError> {
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pin,
        mode: gpio_mode_t_GPIO_MODE_OUTPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    // SAFETY: cfg is a fully initialised config that outlives the call.
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::GpioConfigFailed(ret));
    }
    // SAFETY: the pin was configured as an output just above.
    unsafe { gpio_set_level(pin, 0) };
    info!("hw_init: button pad GPIO{} output/low", pin);
    Ok(())
}

#[cfg(target_os = "espidf")]
unsafe fn init_digital_input(pin: i32) -> Result<(), HwInitError> {
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pin,
        mode: gpio_mode_t_GPIO_MODE_INPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    // SAFETY: cfg is a fully initialised config that outlives the call.
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::GpioConfigFailed(ret));
    }
    info!("hw_init: dock LED tap GPIO{} input", pin);
    Ok(())
}

/// Switch `pin` to input with the internal pull-up.
#[cfg(target_os = "espidf")]
pub fn gpio_set_input_pullup(pin: i32) {
    // SAFETY: direction/pull registers of a pin configured in init_button();
    // main-loop only.
    unsafe {
        gpio_set_direction(pin, gpio_mode_t_GPIO_MODE_INPUT);
        gpio_set_pull_mode(pin, gpio_pull_mode_t_GPIO_PULLUP_ONLY);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_set_input_pullup(_pin: i32) {}

/// Switch `pin` back to a push-pull output.
#[cfg(target_os = "espidf")]
pub fn gpio_set_output(pin: i32) {
    // SAFETY: see gpio_set_input_pullup().
    unsafe {
        gpio_set_pull_mode(pin, gpio_pull_mode_t_GPIO_FLOATING);
        gpio_set_direction(pin, gpio_mode_t_GPIO_MODE_OUTPUT);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_set_output(_pin: i32) {}

#[cfg(target_os = "espidf")]
pub fn gpio_read(pin: i32) -> bool {
    // SAFETY: gpio_get_level is a read-only register access on an
    // already-configured input pin; safe to call from main context.
    (unsafe { gpio_get_level(pin) }) != 0
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_read(_pin: i32) -> bool {
    true
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: gpio_set_level writes to an already-configured output pin.
    unsafe {
        gpio_set_level(pin, u32::from(high));
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(_pin: i32, _high: bool) {}

// ── ADC (oneshot + calibration) ───────────────────────────────

#[cfg(target_os = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

#[cfg(target_os = "espidf")]
static mut ADC1_CALI: adc_cali_handle_t = core::ptr::null_mut();

/// Full-scale voltage assumed when no calibration scheme is available.
#[cfg(target_os = "espidf")]
const ADC_UNCALIBRATED_FULL_SCALE_MV: u32 = 3100;

/// SAFETY: Must be called only from the single-threaded init path or the
/// main-loop ADC read path.
#[cfg(target_os = "espidf")]
unsafe fn adc1_handle() -> adc_oneshot_unit_handle_t {
    unsafe { ADC1_HANDLE }
}

#[cfg(target_os = "espidf")]
unsafe fn init_adc(channel: u32) -> Result<(), HwInitError> {
    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: ADC1_HANDLE is only written here, once at boot.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::AdcInitFailed(ret));
    }

    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_DEFAULT,
    };
    // SAFETY: the unit handle was created just above.
    let ret = unsafe { adc_oneshot_config_channel(adc1_handle(), channel, &chan_cfg) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::AdcInitFailed(ret));
    }

    // Calibration is best-effort; without it readings fall back to a
    // linear full-scale estimate.
    // SAFETY: boot-time call, before any reader touches ADC1_CALI.
    let ret = unsafe { init_adc_cali() };
    if ret != ESP_OK as i32 {
        warn!("hw_init: ADC calibration unavailable (rc={}), using linear estimate", ret);
    }

    info!("hw_init: ADC1 CH{} configured (dock status)", channel);
    Ok(())
}

#[cfg(all(target_os = "espidf", any(esp32, esp32s2)))]
unsafe fn init_adc_cali() -> esp_err_t {
    let cfg = adc_cali_line_fitting_config_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_DEFAULT,
        ..Default::default()
    };
    // SAFETY: ADC1_CALI is only written here, once at boot.
    unsafe { adc_cali_create_scheme_line_fitting(&cfg, &raw mut ADC1_CALI) }
}

#[cfg(all(target_os = "espidf", not(any(esp32, esp32s2))))]
unsafe fn init_adc_cali() -> esp_err_t {
    let cfg = adc_cali_curve_fitting_config_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_DEFAULT,
        ..Default::default()
    };
    // SAFETY: ADC1_CALI is only written here, once at boot.
    unsafe { adc_cali_create_scheme_curve_fitting(&cfg, &raw mut ADC1_CALI) }
}

/// Raw oneshot conversion; `0` on a failed read.
#[cfg(target_os = "espidf")]
pub fn adc1_read_raw(channel: u32) -> u16 {
    let mut raw: i32 = 0;
    // SAFETY: adc1_handle() contract: single-threaded main-loop access only.
    let ret = unsafe { adc_oneshot_read(adc1_handle(), channel, &mut raw) };
    if ret != ESP_OK as i32 {
        return 0;
    }
    raw.max(0) as u16
}

#[cfg(not(target_os = "espidf"))]
pub fn adc1_read_raw(_channel: u32) -> u16 {
    0
}

/// Pin voltage in millivolts.
#[cfg(target_os = "espidf")]
pub fn adc1_read_mv(channel: u32) -> u16 {
    let raw = adc1_read_raw(channel);
    // SAFETY: ADC1_CALI is written once during init_adc() and only read here.
    let cali = unsafe { ADC1_CALI };
    if !cali.is_null() {
        let mut mv: i32 = 0;
        let ret = unsafe { adc_cali_raw_to_voltage(cali, i32::from(raw), &mut mv) };
        if ret == ESP_OK as i32 {
            return mv.max(0) as u16;
        }
    }
    let full_scale = (1u32 << SOC_ADC_RTC_MAX_BITWIDTH) - 1;
    (u32::from(raw) * ADC_UNCALIBRATED_FULL_SCALE_MV / full_scale) as u16
}

#[cfg(not(target_os = "espidf"))]
pub fn adc1_read_mv(_channel: u32) -> u16 {
    0
}

// ── LEDC PWM (status LED) ─────────────────────────────────────

pub const LEDC_CH_STATUS: u32 = 0;

#[cfg(target_os = "espidf")]
unsafe fn init_ledc(gpio: i32) -> Result<(), HwInitError> {
    use crate::pins;

    let timer = ledc_timer_config_t {
        speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
        timer_num: ledc_timer_t_LEDC_TIMER_0,
        // ledc_timer_bit_t values equal their bit count.
        duty_resolution: pins::PWM_RESOLUTION_BITS,
        freq_hz: pins::LED_PWM_FREQ_HZ,
        clk_cfg: soc_periph_ledc_clk_src_legacy_t_LEDC_AUTO_CLK,
        ..Default::default()
    };
    // SAFETY: both LEDC configs are fully initialised and outlive the calls.
    let ret = unsafe { ledc_timer_config(&timer) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::LedcInitFailed(ret));
    }

    let ret = unsafe {
        ledc_channel_config(&ledc_channel_config_t {
            speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
            channel: LEDC_CH_STATUS,
            timer_sel: ledc_timer_t_LEDC_TIMER_0,
            gpio_num: gpio,
            duty: 0,
            hpoint: 0,
            ..Default::default()
        })
    };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::LedcInitFailed(ret));
    }

    info!("hw_init: LEDC configured (status LED GPIO{} on CH{})", gpio, LEDC_CH_STATUS);
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn ledc_set(channel: u32, duty: u8) {
    // SAFETY: the LEDC channel was configured in init_ledc(); duty register
    // writes are race-free since only the main loop calls this function.
    unsafe {
        ledc_set_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, channel, u32::from(duty));
        ledc_update_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, channel);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn ledc_set(_channel: u32, _duty: u8) {}

// ── Restart ───────────────────────────────────────────────────

/// Software reset.  Used after a failed Wi-Fi association and to boot a
/// freshly written firmware image.
#[cfg(target_os = "espidf")]
pub fn restart() -> ! {
    esp_idf_svc::hal::reset::restart()
}

#[cfg(not(target_os = "espidf"))]
pub fn restart() -> ! {
    panic!("restart requested (simulation has no hardware reset)");
}
