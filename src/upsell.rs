//! Size upsells

use std::fmt;

use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;

use crate::{
    catalog::{Catalog, Variant},
    labels::same,
};

/// Ascending size labels for a product type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeOrder {
    sizes: SmallVec<[String; 4]>,
}

impl SizeOrder {
    /// Create a size order from smallest to largest.
    pub fn new(sizes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            sizes: sizes.into_iter().map(Into::into).collect(),
        }
    }

    /// Position of a label, compared case-insensitively.
    pub fn position(&self, size: &str) -> Option<usize> {
        self.sizes
            .iter()
            .position(|label| same(label, size))
    }

    /// The size after `size`, if `size` is known and not the largest.
    pub fn next_after(&self, size: &str) -> Option<&str> {
        let position = self.position(size)?;

        self.sizes.get(position + 1).map(String::as_str)
    }

    /// The largest size.
    pub fn largest(&self) -> Option<&str> {
        self.sizes.last().map(String::as_str)
    }

    /// Labels, smallest first.
    pub fn sizes(&self) -> &[String] {
        &self.sizes
    }
}

impl Default for SizeOrder {
    fn default() -> Self {
        Self::new(["Small", "Medium", "Large", "Gallon"])
    }
}

/// Suggestion to move up one size.
#[derive(Debug, Clone, PartialEq)]
pub struct Upsell {
    /// Size label the shopper has chosen
    pub from: String,

    /// Size label being suggested
    pub to: String,

    /// Title of the suggested variant
    pub title: String,

    /// How much more the suggested variant costs
    pub difference: Money<'static, Currency>,
}

impl Upsell {
    /// Suggest moving from `current` (sized `from`) to `next` (sized `to`).
    ///
    /// Returns `None` unless `next` costs more than `current`.
    pub fn between(from: &str, to: &str, current: &Variant, next: &Variant) -> Option<Self> {
        let difference = next.price.sub(current.price).ok()?;

        if difference.to_minor_units() <= 0 {
            return None;
        }

        Some(Self {
            from: from.to_string(),
            to: to.to_string(),
            title: next.title.clone(),
            difference,
        })
    }
}

impl fmt::Display for Upsell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Upgrade to {} for {} more", self.title, self.difference)
    }
}

/// Suggest the next size up when it costs more than the current one.
///
/// Returns `None` when the current size is the largest, is not in `size_order`, either size has no
/// variant in the catalog, or the next size is not more expensive.
pub fn compute_upsell(current_size: &str, catalog: &Catalog, size_order: &SizeOrder) -> Option<Upsell> {
    let next_size = size_order.next_after(current_size)?;

    let current = catalog.variant_for_size(current_size)?;
    let next = catalog.variant_for_size(next_size)?;

    Upsell::between(current_size, next_size, current, next)
}
