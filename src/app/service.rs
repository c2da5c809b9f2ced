//! Application service: the hexagonal core.
//!
//! [`DockController`] owns the [`DockState`] record and the four loop
//! stages.  All I/O flows through port traits injected at call sites,
//! making one control iteration fully testable with mock adapters and a
//! fake clock.
//!
//! ```text
//!  DockSensor ──▶ ┌──────────────────────────────────────┐ ──▶ EventSink
//!  ButtonLine ◀─▶ │            DockController             │
//!       Clock ◀── │ acquire · filter · schedule · press   │
//!   Indicator ◀── └──────────────────────────────────────┘
//! ```

use log::info;

use crate::config::DockConfig;
use crate::scheduler::{CleanScheduler, DebugPressLoop};

use super::acquisition::SignalAcquisition;
use super::actuator::ButtonActuator;
use super::events::{AppEvent, PressCause, StatusReport};
use super::ports::{ButtonLine, Clock, DockSensor, EventSink, StatusIndicator};
use super::state::DockState;

// ───────────────────────────────────────────────────────────────
// DockController
// ───────────────────────────────────────────────────────────────

/// The dock controller orchestrates one polling iteration at a time.
pub struct DockController {
    state: DockState,
    acquisition: SignalAcquisition,
    scheduler: CleanScheduler,
    actuator: ButtonActuator,
    debug_loop: Option<DebugPressLoop>,
    loop_period_ms: u32,
    iterations: u64,
}

impl DockController {
    /// Construct the controller from configuration.
    pub fn new(config: &DockConfig) -> Self {
        Self {
            state: DockState::new(),
            acquisition: SignalAcquisition::new(config.button_settle_ms),
            scheduler: CleanScheduler::new(config),
            actuator: ButtonActuator::new(config.press_duration_ms),
            debug_loop: config
                .debug_loop
                .then(|| DebugPressLoop::new(config.debug_loop_period_ms)),
            loop_period_ms: config.loop_period_ms,
            iterations: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, sink: &mut impl EventSink) {
        let confidence = self.state.confidence.value();
        sink.emit(&AppEvent::Started { confidence });
        info!(
            "DockController started (confidence={}, debug_loop={})",
            confidence,
            self.debug_loop.is_some()
        );
    }

    // ── Per-iteration orchestration ───────────────────────────

    /// Run one iteration: acquire → filter → schedule → press → report.
    ///
    /// `now` is taken once at the top; stage decisions use that value
    /// even though acquisition and presses consume time.  Does not sleep
    /// for the loop period, see [`run_iteration`](Self::run_iteration).
    pub fn tick(
        &mut self,
        hw: &mut (impl ButtonLine + DockSensor + StatusIndicator),
        clock: &mut impl Clock,
        sink: &mut impl EventSink,
    ) {
        self.iterations += 1;
        let now = clock.now_ms();

        // 1. Acquisition
        let sample = self.acquisition.sample(hw, clock);
        self.state.button_is_pressed = sample.button_pressed;
        self.state.dock_raw = sample.dock_raw;

        // 2. Filter
        self.state.is_docked = self.state.confidence.update(sample.dock_raw);

        // 3. Scheduler
        if self.scheduler.tick(&mut self.state, now) {
            info!("CLEANING DUE, pressing now");
            self.press(PressCause::CleanDue, hw, clock, sink);
        }

        // 4. Bench loop
        if self.debug_loop.as_mut().is_some_and(|l| l.poll(now)) {
            info!("Debug loop enabled, pressing the button");
            self.press(PressCause::DebugLoop, hw, clock, sink);
        }

        // 5. Manual pass-through
        if self.state.button_is_pressed {
            info!("Passing through manual button press");
            self.press(PressCause::ManualPassThrough, hw, clock, sink);
        }

        // 6. Report
        sink.emit(&AppEvent::Status(self.status(now)));
    }

    /// [`tick`](Self::tick) followed by the loop-period sleep.
    pub fn run_iteration(
        &mut self,
        hw: &mut (impl ButtonLine + DockSensor + StatusIndicator),
        clock: &mut impl Clock,
        sink: &mut impl EventSink,
    ) {
        self.tick(hw, clock, sink);
        clock.delay_ms(self.loop_period_ms);
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> &DockState {
        &self.state
    }

    /// Iterations executed since startup.
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn status(&self, now_ms: u64) -> StatusReport {
        StatusReport {
            now_ms,
            button_pressed: self.state.button_is_pressed,
            dock_raw: self.state.dock_raw,
            docked: self.state.is_docked,
            confidence: self.state.confidence.value(),
            last_cleaned_ms: self.state.last_cleaned_at,
            clean_due_ms: self.state.clean_due_ms(),
            last_pressed_ms: self.state.last_pressed_at,
        }
    }

    // ── Internal ──────────────────────────────────────────────

    fn press(
        &mut self,
        cause: PressCause,
        hw: &mut (impl ButtonLine + StatusIndicator),
        clock: &mut impl Clock,
        sink: &mut impl EventSink,
    ) {
        let docked = self.state.is_docked;
        let at_ms = self.actuator.press(&mut self.state, hw, clock);
        sink.emit(&AppEvent::PressIssued {
            cause,
            at_ms,
            docked,
        });
    }
}
