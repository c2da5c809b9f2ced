//! Outbound application events.
//!
//! The [`DockController`](super::service::DockController) and the update
//! service emit these through the [`EventSink`](super::ports::EventSink)
//! port.  Adapters on the other side decide what to do with them.

use crate::ota::UpdateEvent;

/// Why a button press was emulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressCause {
    /// The clean deadline elapsed.
    CleanDue,
    /// Bench loop pressing at a fixed period.
    DebugLoop,
    /// A manual press on the dock button, passed through.
    ManualPassThrough,
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Per-iteration status line.
    Status(StatusReport),

    /// A press pulse was issued.
    PressIssued {
        cause: PressCause,
        at_ms: u64,
        docked: bool,
    },

    /// The controller has started (carries boot confidence).
    Started { confidence: i8 },

    /// Firmware update progress or failure.
    Update(UpdateEvent),
}

/// A point-in-time view of the controller, one per loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusReport {
    pub now_ms: u64,
    pub button_pressed: bool,
    pub dock_raw: bool,
    pub docked: bool,
    pub confidence: i8,
    pub last_cleaned_ms: u64,
    /// `0` while no clean is scheduled.
    pub clean_due_ms: u64,
    pub last_pressed_ms: u64,
}
