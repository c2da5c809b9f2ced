//! Dock-presence debounce filter.
//!
//! Integrates the raw dock reading into a saturating counter and derives
//! the stable "docked" flag from it.
//!
//! ```text
//!   -5 ........ 0 ........ 10 | 11 ........ 20
//!   └──────── undocked ───────┘└─── docked ───┘
//! ```
//!
//! The range is lopsided around the threshold: from full saturation it
//! takes exactly ten consecutive "absent" readings to declare the shaver
//! undocked, while a single "present" reading from the boot midpoint is
//! enough to declare it docked.

/// Lower saturation bound.
pub const CONFIDENCE_MIN: i8 = -5;
/// Upper saturation bound.
pub const CONFIDENCE_MAX: i8 = 20;
/// Docked iff the counter is strictly above this.
pub const DOCKED_THRESHOLD: i8 = 10;
/// Boot value.
pub const CONFIDENCE_INITIAL: i8 = 10;

/// Saturating up/down counter for dock presence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DockConfidence {
    value: i8,
}

impl DockConfidence {
    pub const fn new() -> Self {
        Self {
            value: CONFIDENCE_INITIAL,
        }
    }

    /// Fold one raw reading into the counter and return the docked flag.
    pub fn update(&mut self, raw_present: bool) -> bool {
        if raw_present {
            if self.value < CONFIDENCE_MAX {
                self.value += 1;
            }
        } else if self.value > CONFIDENCE_MIN {
            self.value -= 1;
        }
        self.is_docked()
    }

    pub fn is_docked(&self) -> bool {
        self.value > DOCKED_THRESHOLD
    }

    pub fn value(&self) -> i8 {
        self.value
    }
}

impl Default for DockConfidence {
    fn default() -> Self {
        Self::new()
    }
}
