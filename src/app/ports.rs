//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ DockController (domain)
//! ```
//!
//! Driven adapters (button line, dock sensor, status LED, clock, event
//! sinks) implement these traits.  The
//! [`DockController`](super::service::DockController) consumes them via
//! generics, so the domain core never touches hardware directly.

use embedded_hal::delay::DelayNs;

// ───────────────────────────────────────────────────────────────
// Clock port (time source + blocking sleep)
// ───────────────────────────────────────────────────────────────

/// Monotonic time source with a blocking delay.
///
/// The control loop is synchronous: every wait (button settle, press pulse,
/// loop period) is a blocking [`DelayNs`] call on the same clock that
/// [`now_ms`](Clock::now_ms) reads, so a fake clock that advances on delay
/// gives fully deterministic tests.
pub trait Clock: DelayNs {
    /// Milliseconds since boot.
    fn now_ms(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Button line port (bidirectional GPIO)
// ───────────────────────────────────────────────────────────────

/// The dock's button pad: sensed as a pulled-up input, driven as an output.
pub trait ButtonLine {
    /// Reconfigure the pad as an input with the internal pull-up enabled.
    fn enter_input_pullup(&mut self);

    /// Read the pad level while in input mode (`true` = high).
    fn is_high(&mut self) -> bool;

    /// Reconfigure the pad as a push-pull output driving `high`.
    fn drive(&mut self, high: bool);
}

// ───────────────────────────────────────────────────────────────
// Dock sensor port
// ───────────────────────────────────────────────────────────────

/// Produces the instantaneous, unfiltered "shaver seated" signal.
///
/// Implementations differ per hardware revision (analog dock pad, centre
/// LED tap); the filter and scheduler never see which one is in use.
pub trait DockSensor {
    fn read_raw(&mut self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Status indicator port
// ───────────────────────────────────────────────────────────────

/// Optional controller LED, dark while a press is being emulated.
pub trait StatusIndicator {
    /// Switch the indicator off.
    fn suppress(&mut self);

    /// Return the indicator to its idle level.
    fn restore(&mut self);
}

/// Indicator for boards without a status LED.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoIndicator;

impl StatusIndicator for NoIndicator {
    fn suppress(&mut self) {}
    fn restore(&mut self) {}
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go (serial log today).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
