//! Pump allowances

use rustc_hash::FxHashMap;

use crate::labels::fold;

/// Included flavor pumps per size label.
///
/// Labels are matched case-insensitively; sizes without an entry include no pumps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PumpAllowance {
    included: FxHashMap<String, u32>,
}

impl PumpAllowance {
    /// Create an empty table where every size includes zero pumps.
    pub fn empty() -> Self {
        Self {
            included: FxHashMap::default(),
        }
    }

    /// Set the included pumps for a size.
    pub fn set(&mut self, size: &str, pumps: u32) {
        self.included.insert(fold(size), pumps);
    }

    /// Builder-style [`PumpAllowance::set`].
    #[must_use]
    pub fn with(mut self, size: &str, pumps: u32) -> Self {
        self.set(size, pumps);
        self
    }

    /// Included pumps for a size, `0` when the size is unknown.
    pub fn included(&self, size: &str) -> u32 {
        self.included
            .get(&fold(size))
            .copied()
            .unwrap_or_default()
    }
}

impl Default for PumpAllowance {
    fn default() -> Self {
        Self::empty()
            .with("Medium", 4)
            .with("Large", 6)
            .with("Gallon", 12)
    }
}

impl<S: AsRef<str>> FromIterator<(S, u32)> for PumpAllowance {
    fn from_iter<I: IntoIterator<Item = (S, u32)>>(iter: I) -> Self {
        let mut allowance = Self::empty();

        for (size, pumps) in iter {
            allowance.set(size.as_ref(), pumps);
        }

        allowance
    }
}
