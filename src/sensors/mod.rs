//! Sensor subsystem.
//!
//! The dock controller only needs one sensor: the raw "shaver on the dock"
//! contact.  Depending on the board revision that contact is either an
//! analog tap on the charge path or the dock's own status LED line, so the
//! variants are unified behind [`dock::DockProbe`].

pub mod dock;

pub use dock::DockProbe;
