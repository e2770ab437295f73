//! Picker visibility by product category

use std::{fmt, str::FromStr};

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use thiserror::Error;

use crate::labels;

/// Staff note shown (and submitted) when flavors are chosen in person.
pub const STAFF_NOTE: &str = "Discuss flavor preferences with staff";

/// Unrecognised product category tag.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown product category: {0}")]
pub struct UnknownCategory(pub String);

/// Product category tag configured on the product.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ProductCategory {
    /// Kratom teas
    Kratom,

    /// Kava drinks
    Kava,

    /// Delta-9 THC drinks, the regulated category that carries a potency choice
    Delta9,

    /// Everything else
    #[default]
    Standard,
}

impl ProductCategory {
    /// Guess the category from a product handle and title.
    pub fn detect(handle: &str, title: &str) -> Self {
        let handle = labels::fold(handle);
        let title = labels::fold(title);

        if handle.contains("thc") || title.contains("delta") {
            ProductCategory::Delta9
        } else if handle.contains("kratom") || title.contains("kratom") {
            ProductCategory::Kratom
        } else if handle.contains("kava") || title.contains("kava") {
            ProductCategory::Kava
        } else {
            ProductCategory::Standard
        }
    }

    /// Whether this is the regulated category.
    pub fn is_regulated(self) -> bool {
        self == ProductCategory::Delta9
    }
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProductCategory::Kratom => "kratom",
            ProductCategory::Kava => "kava",
            ProductCategory::Delta9 => "delta9",
            ProductCategory::Standard => "standard",
        })
    }
}

impl FromStr for ProductCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match labels::fold(s.trim()).as_str() {
            "kratom" => Ok(ProductCategory::Kratom),
            "kava" => Ok(ProductCategory::Kava),
            "delta9" | "delta-9" | "d9" | "thc" => Ok(ProductCategory::Delta9),
            "standard" | "default" => Ok(ProductCategory::Standard),
            _ => Err(UnknownCategory(s.to_string())),
        }
    }
}

/// Which pickers the widget shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityDecision {
    /// Flavor picker
    pub show_flavor_picker: bool,

    /// Potency (THC concentration) picker
    pub show_potency_picker: bool,

    /// "Discuss with staff" note
    pub show_staff_note: bool,
}

/// Category rules, parameterised by the label of the bulk size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilityRules {
    bulk_size: String,
}

impl VisibilityRules {
    /// Rules treating `bulk_size` as the bulk tier.
    pub fn new(bulk_size: impl Into<String>) -> Self {
        Self {
            bulk_size: bulk_size.into(),
        }
    }

    /// The bulk tier label.
    pub fn bulk_size(&self) -> &str {
        &self.bulk_size
    }

    /// Whether `size` is the bulk tier.
    pub fn is_bulk(&self, size: &str) -> bool {
        labels::same(size, &self.bulk_size)
    }

    /// Decide picker visibility.
    ///
    /// At bulk size only the regulated category keeps self-service flavors (and must offer
    /// potency); every other category hands flavors over to staff. Below bulk size flavors are
    /// always shown and potency only for the regulated category.
    pub fn apply(&self, category: ProductCategory, size: &str) -> VisibilityDecision {
        let regulated = category.is_regulated();

        if self.is_bulk(size) {
            VisibilityDecision {
                show_flavor_picker: regulated,
                show_potency_picker: regulated,
                show_staff_note: !regulated,
            }
        } else {
            VisibilityDecision {
                show_flavor_picker: true,
                show_potency_picker: regulated,
                show_staff_note: false,
            }
        }
    }
}

impl Default for VisibilityRules {
    fn default() -> Self {
        Self::new("Gallon")
    }
}

/// Boosters withheld at particular sizes.
///
/// A booster hidden at a size is neither offered nor kept in the selection while that size is
/// chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoosterRestrictions {
    hidden: FxHashMap<String, SmallVec<[String; 2]>>,
}

impl BoosterRestrictions {
    /// No booster is hidden at any size.
    pub fn none() -> Self {
        Self {
            hidden: FxHashMap::default(),
        }
    }

    /// Hide `booster` at `size`.
    pub fn hide(&mut self, size: &str, booster: impl Into<String>) {
        let booster = booster.into();
        let hidden = self.hidden.entry(labels::fold(size)).or_default();

        if !hidden.iter().any(|name| labels::same(name, &booster)) {
            hidden.push(booster);
        }
    }

    /// Builder-style [`BoosterRestrictions::hide`] for several boosters.
    #[must_use]
    pub fn with(
        mut self,
        size: &str,
        boosters: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        for booster in boosters {
            self.hide(size, booster);
        }

        self
    }

    /// Boosters hidden at `size`.
    pub fn hidden_at(&self, size: &str) -> &[String] {
        self.hidden
            .get(&labels::fold(size))
            .map(|hidden| hidden.as_slice())
            .unwrap_or_default()
    }

    /// Whether `booster` is offered at `size`.
    pub fn is_offered(&self, booster: &str, size: &str) -> bool {
        !self
            .hidden_at(size)
            .iter()
            .any(|name| labels::same(name, booster))
    }
}

impl Default for BoosterRestrictions {
    fn default() -> Self {
        Self::none().with("Small", ["Protein Shot", "CBD Calm"])
    }
}

/// Decide picker visibility with "Gallon" as the bulk tier.
pub fn apply_category_visibility_rules(
    category: ProductCategory,
    size: &str,
) -> VisibilityDecision {
    VisibilityRules::default().apply(category, size)
}
