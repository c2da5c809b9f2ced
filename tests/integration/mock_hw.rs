//! Mock hardware and a fake clock for integration tests.
//!
//! The clock only moves when the code under test sleeps, and the mock
//! stamps every line operation with the clock's current time, so tests can
//! assert on exact pulse lengths and ordering.

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

use dockclean::app::events::{AppEvent, PressCause};
use dockclean::app::ports::{ButtonLine, Clock, DockSensor, EventSink, StatusIndicator};
use embedded_hal::delay::DelayNs;

// ── FakeClock ─────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct FakeClock {
    now_us: Rc<Cell<u64>>,
}

#[allow(dead_code)]
impl FakeClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_ms(&self, ms: u64) {
        self.now_us.set(ms * 1_000);
    }
}

impl DelayNs for FakeClock {
    fn delay_ns(&mut self, ns: u32) {
        self.now_us.set(self.now_us.get() + u64::from(ns.div_ceil(1_000)));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.now_us.set(self.now_us.get() + u64::from(ms) * 1_000);
    }
}

impl Clock for FakeClock {
    fn now_ms(&self) -> u64 {
        self.now_us.get() / 1_000
    }
}

// ── Line call record ──────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineCall {
    InputPullup,
    Read { high: bool },
    Drive { high: bool },
    LedOff,
    LedIdle,
}

/// One emulated press seen on the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pulse {
    pub start_ms: u64,
    pub width_ms: u64,
}

// ── MockHw ────────────────────────────────────────────────────

pub struct MockHw {
    clock: FakeClock,
    pub calls: Vec<(u64, LineCall)>,
    /// Scripted dock readings, consumed one per iteration.
    dock_script: VecDeque<bool>,
    /// Reading once the script runs out.
    pub dock_default: bool,
    /// Number of upcoming button reads that see the switch held.
    pub held_reads: u32,
}

#[allow(dead_code)]
impl MockHw {
    pub fn new(clock: &FakeClock) -> Self {
        Self {
            clock: clock.clone(),
            calls: Vec::new(),
            dock_script: VecDeque::new(),
            dock_default: false,
            held_reads: 0,
        }
    }

    pub fn script_dock(&mut self, readings: impl IntoIterator<Item = bool>) {
        self.dock_script.extend(readings);
    }

    fn record(&mut self, call: LineCall) {
        self.calls.push((self.clock.now_ms(), call));
    }

    /// High pulses on the line, paired high/low drives.
    pub fn pulses(&self) -> Vec<Pulse> {
        let mut out = Vec::new();
        let mut rising = None;
        for &(t, call) in &self.calls {
            match call {
                LineCall::Drive { high: true } => rising = Some(t),
                LineCall::Drive { high: false } => {
                    if let Some(start) = rising.take() {
                        out.push(Pulse {
                            start_ms: start,
                            width_ms: t - start,
                        });
                    }
                }
                _ => {}
            }
        }
        out
    }
}

impl ButtonLine for MockHw {
    fn enter_input_pullup(&mut self) {
        self.record(LineCall::InputPullup);
    }

    fn is_high(&mut self) -> bool {
        let high = if self.held_reads > 0 {
            self.held_reads -= 1;
            false
        } else {
            true
        };
        self.record(LineCall::Read { high });
        high
    }

    fn drive(&mut self, high: bool) {
        self.record(LineCall::Drive { high });
    }
}

impl DockSensor for MockHw {
    fn read_raw(&mut self) -> bool {
        self.dock_script.pop_front().unwrap_or(self.dock_default)
    }
}

impl StatusIndicator for MockHw {
    fn suppress(&mut self) {
        self.record(LineCall::LedOff);
    }

    fn restore(&mut self) {
        self.record(LineCall::LedIdle);
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn presses(&self) -> Vec<(PressCause, u64, bool)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::PressIssued {
                    cause,
                    at_ms,
                    docked,
                } => Some((*cause, *at_ms, *docked)),
                _ => None,
            })
            .collect()
    }

    pub fn status_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, AppEvent::Status(_)))
            .count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
