//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::ota::UpdateEvent;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Status(s) => {
                info!(
                    "STATUS | t={}ms | button={} | dock_raw={} docked={} conf={} | \
                     last_clean={}ms due={}ms last_press={}ms",
                    s.now_ms,
                    u8::from(s.button_pressed),
                    u8::from(s.dock_raw),
                    u8::from(s.docked),
                    s.confidence,
                    s.last_cleaned_ms,
                    s.clean_due_ms,
                    s.last_pressed_ms,
                );
            }
            AppEvent::PressIssued {
                cause,
                at_ms,
                docked,
            } => {
                info!(
                    "PRESS | cause={:?} at={}ms | {}",
                    cause,
                    at_ms,
                    if *docked { "docked, clean recorded" } else { "undocked" }
                );
            }
            AppEvent::Started { confidence } => {
                info!("START | confidence={}", confidence);
            }
            AppEvent::Update(u) => match u {
                UpdateEvent::Started { image_size } => {
                    info!("OTA | start ({} bytes)", image_size);
                }
                UpdateEvent::Progress { written, total } => {
                    let pct = u64::from(*written) * 100 / u64::from((*total).max(1));
                    info!("OTA | progress {}% ({}/{})", pct, written, total);
                }
                UpdateEvent::Error(kind) => {
                    warn!("OTA | error: {:?}", kind);
                }
                UpdateEvent::Completed => {
                    info!("OTA | end, restarting");
                }
            },
        }
    }
}
