//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the rules of the dock controller: signal
//! acquisition, the docked-confidence filter, clean scheduling and press
//! emulation.  All interaction with hardware happens through **port traits**
//! defined in [`ports`], keeping this layer fully testable without real
//! peripherals.

pub mod acquisition;
pub mod actuator;
pub mod events;
pub mod ports;
pub mod service;
pub mod state;
