//! Dockclean Firmware: Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter        LogEventSink      Esp32TimeAdapter     │
//! │  (Button+Dock+LED)      (EventSink)       (Clock)              │
//! │  WifiAdapter  MdnsAdapter  TcpUpdateTransport                  │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            DockController (pure logic)                 │    │
//! │  │  acquisition · confidence · clean scheduler · presses  │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  UpdateService (authenticated OTA, polled each iteration)      │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use embedded_hal::delay::DelayNs;
use log::{error, info, warn};

use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{BlockingWifi, EspWifi};

use dockclean::adapters::hardware::HardwareAdapter;
use dockclean::adapters::log_sink::LogEventSink;
use dockclean::adapters::mdns::MdnsAdapter;
use dockclean::adapters::ota_tcp::TcpUpdateTransport;
use dockclean::adapters::time::Esp32TimeAdapter;
use dockclean::adapters::wifi::{ConnectivityPort, WifiAdapter};
use dockclean::app::service::DockController;
use dockclean::config::DockConfig;
use dockclean::drivers::hw_init;
use dockclean::error::Error;
use dockclean::ota::{self, PollOutcome, UpdateService};

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("Booting dockclean v{}", env!("CARGO_PKG_VERSION"));
    ota::manager::check_rollback();

    // ── 2. Configuration ──────────────────────────────────────
    let config = DockConfig::default();
    config.validate().map_err(Error::from)?;
    info!("Config: {}", config.to_redacted_json());
    if config.ota_password.is_empty() {
        warn!("OTA password is empty; any client on the network can flash firmware");
    }

    // ── 3. Hardware ───────────────────────────────────────────
    hw_init::init_peripherals(&config).map_err(Error::from)?;
    let mut hw = HardwareAdapter::from_config(&config);
    let mut clock = Esp32TimeAdapter::new();
    let mut sink = LogEventSink::new();

    // ── 4. Network ────────────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;
    let esp_wifi = EspWifi::new(peripherals.modem, sysloop.clone(), Some(nvs))?;
    let mut wifi = WifiAdapter::new(BlockingWifi::wrap(esp_wifi, sysloop)?, config.hostname.clone());

    let connected = wifi
        .set_credentials(&config.wifi_ssid, &config.wifi_password)
        .and_then(|()| wifi.connect());
    if let Err(e) = connected {
        error!("Connection Failed! Rebooting... ({})", e);
        clock.delay_ms(config.restart_delay_ms);
        hw_init::restart();
    }

    let mut mdns = MdnsAdapter::new(config.hostname.clone(), config.ota_port);
    mdns.start();

    let mut transport = TcpUpdateTransport::bind(config.ota_port).map_err(Error::from)?;
    let mut updates = UpdateService::new(&config.ota_password);

    // ── 5. Control loop ───────────────────────────────────────
    let mut controller = DockController::new(&config);
    controller.start(&mut sink);

    loop {
        controller.run_iteration(&mut hw, &mut clock, &mut sink);

        if updates.poll(&mut transport, &mut sink) == PollOutcome::RestartRequested {
            mdns.stop();
            wifi.disconnect();
            hw_init::restart();
        }
    }
}
