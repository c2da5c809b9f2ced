//! Signal conditioning for the dock contact.

pub mod confidence;
