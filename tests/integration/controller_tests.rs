//! Integration tests for the DockController loop against mock hardware.
//!
//! Every iteration costs `button_settle_ms + loop_period_ms` = 30 ms of
//! fake time, plus 800 ms for each press.

use crate::mock_hw::{FakeClock, LineCall, MockHw, Pulse, RecordingSink};

use dockclean::app::events::PressCause;
use dockclean::app::ports::Clock;
use dockclean::app::service::DockController;
use dockclean::config::DockConfig;

const HOUR: u64 = 60 * 60 * 1000;

struct Rig {
    ctrl: DockController,
    hw: MockHw,
    clock: FakeClock,
    sink: RecordingSink,
}

impl Rig {
    fn new(config: &DockConfig) -> Self {
        let clock = FakeClock::new();
        let mut sink = RecordingSink::new();
        let mut ctrl = DockController::new(config);
        ctrl.start(&mut sink);
        Self {
            ctrl,
            hw: MockHw::new(&clock),
            clock,
            sink,
        }
    }

    fn run(&mut self, iterations: usize) {
        for _ in 0..iterations {
            self.ctrl
                .run_iteration(&mut self.hw, &mut self.clock, &mut self.sink);
        }
    }

    fn run_until(&mut self, ms: u64) {
        while self.clock.now_ms() < ms {
            self.run(1);
        }
    }
}

// ── Docked-state filter ───────────────────────────────────────

#[test]
fn steady_dock_never_presses() {
    let mut rig = Rig::new(&DockConfig::default());
    rig.hw.dock_default = true;

    rig.run(11);

    assert!(rig.ctrl.state().is_docked);
    assert_eq!(rig.ctrl.state().confidence.value(), 20);
    assert!(rig.hw.pulses().is_empty());
    assert_eq!(rig.sink.status_count(), 11);
    assert_eq!(rig.ctrl.iterations(), 11);
}

#[test]
fn ten_absent_readings_undock_from_saturation() {
    let mut rig = Rig::new(&DockConfig::default());
    rig.hw.script_dock(std::iter::repeat_n(true, 15));
    rig.hw.script_dock(std::iter::repeat_n(false, 9));
    rig.run(24);
    assert!(rig.ctrl.state().is_docked, "nine misses keep it docked");

    rig.run(1);
    assert!(!rig.ctrl.state().is_docked);
}

// ── Clean scheduling ──────────────────────────────────────────

#[test]
fn undocked_then_docked_yields_exactly_one_clean() {
    let mut rig = Rig::new(&DockConfig::default());
    rig.hw.script_dock(std::iter::repeat_n(false, 100));
    rig.hw.dock_default = true;

    rig.run(100);
    assert!(rig.hw.pulses().is_empty(), "never fires while undocked");
    assert_eq!(rig.ctrl.state().confidence.value(), -5);

    rig.run(2_000);

    assert_eq!(rig.hw.pulses().len(), 1);
    assert_eq!(rig.hw.pulses()[0].width_ms, 800);

    let presses = rig.sink.presses();
    assert_eq!(presses.len(), 1);
    let (cause, at, docked) = presses[0];
    assert_eq!(cause, PressCause::CleanDue);
    assert!(docked);
    assert_eq!(rig.ctrl.state().last_cleaned_at, at);
    assert_eq!(rig.ctrl.state().last_pressed_at, at);
    assert_eq!(rig.ctrl.state().clean_due_at, None);
}

#[test]
fn deadline_is_thirty_seconds_after_last_undocked_iteration() {
    let mut rig = Rig::new(&DockConfig::default());
    // Boot midpoint 10, five misses → 5, six hits → 11 (docked).
    rig.hw.script_dock(std::iter::repeat_n(false, 5));
    rig.hw.dock_default = true;

    rig.run(10);
    let last_undocked_at = rig.clock.now_ms() - 30;
    rig.run(1);
    assert!(rig.ctrl.state().is_docked);
    assert_eq!(
        rig.ctrl.state().clean_due_at,
        Some(last_undocked_at + 30_000),
        "re-docking keeps the deadline armed"
    );

    rig.run_until(last_undocked_at + 30_000);
    assert!(rig.hw.pulses().is_empty(), "fires strictly after the deadline");

    rig.run(2);
    let pulses = rig.hw.pulses();
    assert_eq!(pulses.len(), 1);
    assert!(pulses[0].start_ms > last_undocked_at + 30_000);
}

#[test]
fn recent_clean_suppresses_rearm_after_boot_window() {
    let mut rig = Rig::new(&DockConfig::default());
    rig.clock.set_ms(2 * HOUR);

    // Shaver lifted for a while, then returned: owed clean runs once.
    rig.hw.script_dock(std::iter::repeat_n(false, 20));
    rig.hw.dock_default = true;
    rig.run_until(2 * HOUR + 60_000);
    assert_eq!(rig.sink.presses().len(), 1);
    let cleaned_at = rig.ctrl.state().last_cleaned_at;
    assert!(cleaned_at > 2 * HOUR);

    // Lifted again ten minutes later: clean is recent, nothing owed.
    rig.hw.dock_default = false;
    rig.run_until(2 * HOUR + 10 * 60_000);
    rig.hw.dock_default = true;
    rig.run_until(2 * HOUR + 12 * 60_000);

    assert_eq!(rig.sink.presses().len(), 1);
    assert_eq!(rig.ctrl.state().clean_due_at, None);
    assert_eq!(rig.ctrl.state().last_cleaned_at, cleaned_at);
}

// ── Manual pass-through ───────────────────────────────────────

#[test]
fn manual_press_while_docked_counts_as_clean() {
    let mut rig = Rig::new(&DockConfig::default());
    rig.hw.dock_default = true;
    rig.run(20);

    rig.hw.held_reads = 1;
    rig.run(1);

    let presses = rig.sink.presses();
    assert_eq!(presses.len(), 1);
    let (cause, at, docked) = presses[0];
    assert_eq!(cause, PressCause::ManualPassThrough);
    assert!(docked);
    assert_eq!(rig.ctrl.state().last_cleaned_at, at);
    assert_eq!(rig.hw.pulses(), vec![Pulse { start_ms: at, width_ms: 800 }]);
}

#[test]
fn manual_press_while_undocked_is_not_a_clean() {
    let config = DockConfig {
        // Keep the clean scheduler out of the way.
        boot_window_ms: 0,
        ..DockConfig::default()
    };
    let mut rig = Rig::new(&config);
    rig.clock.set_ms(1_000);
    rig.run(20);

    rig.hw.held_reads = 1;
    rig.run(1);

    let presses = rig.sink.presses();
    assert_eq!(presses.len(), 1);
    assert_eq!(presses[0].0, PressCause::ManualPassThrough);
    assert!(!presses[0].2);
    assert_eq!(rig.ctrl.state().last_cleaned_at, 0);
    assert_eq!(rig.ctrl.state().last_pressed_at, presses[0].1);
}

// ── Line protocol ─────────────────────────────────────────────

#[test]
fn button_probe_settles_then_returns_to_low_output() {
    let mut rig = Rig::new(&DockConfig::default());
    rig.run(1);

    assert_eq!(
        rig.hw.calls,
        vec![
            (0, LineCall::InputPullup),
            (5, LineCall::Read { high: true }),
            (5, LineCall::Drive { high: false }),
        ]
    );
}

#[test]
fn indicator_is_dark_for_the_whole_pulse() {
    let mut rig = Rig::new(&DockConfig::default());
    rig.hw.dock_default = true;
    rig.run(3);
    rig.hw.held_reads = 1;
    rig.run(1);

    let tail: Vec<LineCall> = rig.hw.calls.iter().rev().take(4).rev().map(|c| c.1).collect();
    assert_eq!(
        tail,
        vec![
            LineCall::LedOff,
            LineCall::Drive { high: true },
            LineCall::Drive { high: false },
            LineCall::LedIdle,
        ]
    );
}

// ── Debug loop ────────────────────────────────────────────────

#[test]
fn debug_loop_presses_every_period() {
    let config = DockConfig {
        debug_loop: true,
        ..DockConfig::default()
    };
    let mut rig = Rig::new(&config);
    rig.hw.dock_default = true;

    rig.run_until(25_000);

    let presses = rig.sink.presses();
    assert_eq!(presses.len(), 3);
    assert!(presses.iter().all(|p| p.0 == PressCause::DebugLoop));
    assert!(presses[1].1 > 10_000 && presses[1].1 < 11_000);
    assert!(presses[2].1 > 20_000 && presses[2].1 < 21_000);
}
