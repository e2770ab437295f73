//! Selection
//!
//! The in-progress choices of one drink-builder widget. Each widget owns its own [`Selection`];
//! nothing here is shared between instances.

use std::{fmt, str::FromStr};

use smallvec::SmallVec;
use thiserror::Error;
use tracing::debug;

use crate::{
    catalog::SIZE_OPTION,
    labels::{fold, same},
};

/// Largest quantity a single cart line accepts from the widget.
pub const MAX_QUANTITY: u32 = 99;

/// Errors raised when a selection change is refused.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    /// A multi-select group already holds its maximum number of entries.
    #[error("Maximum {max} {group} allowed")]
    LimitReached {
        /// Group name, e.g. "flavors"
        group: &'static str,
        /// Configured limit
        max: usize,
    },

    /// An add-on is withheld at the chosen size.
    #[error("{item} is not available in {size}")]
    NotOffered {
        /// Add-on name
        item: String,
        /// Size label it is withheld at
        size: String,
    },

    /// An unrecognised flavor category label.
    #[error("Unknown flavor category: {0}")]
    UnknownFlavorCategory(String),
}

/// Syrup family a flavor is poured from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FlavorCategory {
    /// Regular syrups
    #[default]
    Regular,

    /// Sugar-free syrups
    SugarFree,
}

impl fmt::Display for FlavorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlavorCategory::Regular => f.write_str("regular"),
            FlavorCategory::SugarFree => f.write_str("sugar-free"),
        }
    }
}

impl FromStr for FlavorCategory {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match fold(s.trim()).as_str() {
            "regular" => Ok(FlavorCategory::Regular),
            "sugar-free" | "sugar free" | "sugarfree" => Ok(FlavorCategory::SugarFree),
            _ => Err(SelectionError::UnknownFlavorCategory(s.to_string())),
        }
    }
}

/// A chosen flavor and how many pumps of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlavorPour {
    /// Flavor name
    pub name: String,

    /// Requested pumps, always at least one while the pour is part of a selection
    pub pumps: u32,

    /// Category active when the flavor was added
    pub category: FlavorCategory,
}

impl FlavorPour {
    /// Render as `"<name> (<n> pump[s])"`.
    pub fn label(&self) -> String {
        let unit = if self.pumps == 1 { "pump" } else { "pumps" };

        format!("{} ({} {unit})", self.name, self.pumps)
    }
}

/// Read a pump count typed by the shopper.
///
/// Negative or non-numeric input counts as zero pumps.
pub fn parse_pump_count(raw: &str) -> u32 {
    match raw.trim().parse::<i64>() {
        Ok(value) => u32::try_from(value.max(0)).unwrap_or(u32::MAX),
        Err(err) => {
            debug!(raw, %err, "invalid pump count, treating as zero");
            0
        }
    }
}

/// One widget's selection state.
#[derive(Debug, Clone)]
pub struct Selection {
    /// Single-select choices as (option name, value), in the order first chosen
    options: SmallVec<[(String, String); 4]>,

    strains: SmallVec<[String; 2]>,
    flavor_category: FlavorCategory,
    flavors: Vec<FlavorPour>,
    boosters: SmallVec<[String; 4]>,
    creamers: SmallVec<[String; 4]>,
    sweeteners: SmallVec<[String; 4]>,
    potency: Option<String>,
    comments: String,
    quantity: u32,

    max_flavors: Option<usize>,
    max_boosters: Option<usize>,
}

impl Default for Selection {
    fn default() -> Self {
        Self::new()
    }
}

impl Selection {
    /// Create an empty selection with quantity one and no limits.
    pub fn new() -> Self {
        Self {
            options: SmallVec::new(),
            strains: SmallVec::new(),
            flavor_category: FlavorCategory::default(),
            flavors: Vec::new(),
            boosters: SmallVec::new(),
            creamers: SmallVec::new(),
            sweeteners: SmallVec::new(),
            potency: None,
            comments: String::new(),
            quantity: 1,
            max_flavors: None,
            max_boosters: None,
        }
    }

    /// Limit the number of distinct flavors.
    #[must_use]
    pub fn with_max_flavors(mut self, max: usize) -> Self {
        self.max_flavors = Some(max);
        self
    }

    /// Limit the number of boosters.
    #[must_use]
    pub fn with_max_boosters(mut self, max: usize) -> Self {
        self.max_boosters = Some(max);
        self
    }

    /// Choose a value for a single-select option.
    ///
    /// Re-choosing an option keeps the name it was first chosen under.
    pub fn set_option(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();

        match self.options.iter_mut().find(|(option, _)| same(option, name)) {
            Some((_, chosen)) => *chosen = value,
            None => self.options.push((name.to_string(), value)),
        }
    }

    /// Forget the value chosen for an option.
    pub fn clear_option(&mut self, name: &str) {
        self.options.retain(|(option, _)| !same(option, name));
    }

    /// The value chosen for an option, matched case-insensitively by name.
    pub fn option(&self, name: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|(option, _)| same(option, name))
            .map(|(_, value)| value.as_str())
    }

    /// Every single-select choice as `(name, value)`, in the order first chosen.
    pub fn options(&self) -> impl Iterator<Item = (&str, &str)> {
        self.options
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Choose a size.
    pub fn set_size(&mut self, size: impl Into<String>) {
        self.set_option(SIZE_OPTION, size);
    }

    /// The chosen size.
    pub fn size(&self) -> Option<&str> {
        self.option(SIZE_OPTION)
    }

    /// Add a strain if not already chosen.
    pub fn add_strain(&mut self, strain: &str) {
        if !contains_ignore_case(&self.strains, strain) {
            self.strains.push(strain.to_string());
        }
    }

    /// Remove a strain.
    pub fn remove_strain(&mut self, strain: &str) {
        self.strains.retain(|s| !same(s, strain));
    }

    /// Chosen strains, in the order they were picked.
    pub fn strains(&self) -> &[String] {
        &self.strains
    }

    /// Switch the category applied to flavors added from now on.
    pub fn set_flavor_category(&mut self, category: FlavorCategory) {
        self.flavor_category = category;
    }

    /// The active flavor category.
    pub fn flavor_category(&self) -> FlavorCategory {
        self.flavor_category
    }

    /// Chosen flavors, in the order they were picked.
    pub fn flavors(&self) -> &[FlavorPour] {
        &self.flavors
    }

    /// Sum of requested pumps across all flavors.
    pub fn total_pumps(&self) -> u32 {
        self.flavors
            .iter()
            .fold(0_u32, |total, pour| total.saturating_add(pour.pumps))
    }

    /// Set the pumps for a flavor. Zero removes the flavor.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::LimitReached`] when adding a new flavor would exceed the flavor
    /// limit.
    pub fn set_pumps(&mut self, flavor: &str, pumps: u32) -> Result<(), SelectionError> {
        if pumps == 0 {
            self.remove_flavor(flavor);
            return Ok(());
        }

        if let Some(pour) = self.pour_mut(flavor) {
            pour.pumps = pumps;
            return Ok(());
        }

        if let Some(max) = self.max_flavors
            && self.flavors.len() >= max
        {
            return Err(SelectionError::LimitReached {
                group: "flavors",
                max,
            });
        }

        self.flavors.push(FlavorPour {
            name: flavor.to_string(),
            pumps,
            category: self.flavor_category,
        });

        Ok(())
    }

    /// Set the pumps for a flavor from raw shopper input.
    ///
    /// # Errors
    ///
    /// See [`Selection::set_pumps`].
    pub fn set_pumps_input(&mut self, flavor: &str, raw: &str) -> Result<(), SelectionError> {
        self.set_pumps(flavor, parse_pump_count(raw))
    }

    /// Add one pump of a flavor.
    ///
    /// # Errors
    ///
    /// See [`Selection::set_pumps`].
    pub fn increment_pumps(&mut self, flavor: &str) -> Result<(), SelectionError> {
        let current = self.pumps_of(flavor);

        self.set_pumps(flavor, current.saturating_add(1))
    }

    /// Remove one pump of a flavor, dropping the flavor at zero.
    pub fn decrement_pumps(&mut self, flavor: &str) {
        let current = self.pumps_of(flavor);

        if current <= 1 {
            self.remove_flavor(flavor);
        } else if let Some(pour) = self.pour_mut(flavor) {
            pour.pumps = current - 1;
        }
    }

    /// Toggle a flavor chip: remove it when chosen, otherwise add it with one pump.
    ///
    /// Returns whether the flavor is chosen afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::LimitReached`] when the flavor limit is already met.
    pub fn toggle_flavor(&mut self, flavor: &str) -> Result<bool, SelectionError> {
        if self.pumps_of(flavor) > 0 {
            self.remove_flavor(flavor);
            return Ok(false);
        }

        self.set_pumps(flavor, 1)?;

        Ok(true)
    }

    /// Remove a flavor.
    pub fn remove_flavor(&mut self, flavor: &str) {
        self.flavors.retain(|pour| !same(&pour.name, flavor));
    }

    /// Remove every flavor.
    pub fn clear_flavors(&mut self) {
        self.flavors.clear();
    }

    /// Toggle a booster. Returns whether it is chosen afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::LimitReached`] when the booster limit is already met.
    pub fn toggle_booster(&mut self, booster: &str) -> Result<bool, SelectionError> {
        toggle(&mut self.boosters, booster, self.max_boosters, "boosters")
    }

    /// Remove a booster if chosen.
    pub fn remove_booster(&mut self, booster: &str) {
        self.boosters.retain(|b| !same(b, booster));
    }

    /// Chosen boosters.
    pub fn boosters(&self) -> &[String] {
        &self.boosters
    }

    /// Toggle a creamer. Returns whether it is chosen afterwards.
    pub fn toggle_creamer(&mut self, creamer: &str) -> bool {
        toggle(&mut self.creamers, creamer, None, "creamers").unwrap_or_default()
    }

    /// Chosen creamers.
    pub fn creamers(&self) -> &[String] {
        &self.creamers
    }

    /// Toggle a sweetener. Returns whether it is chosen afterwards.
    pub fn toggle_sweetener(&mut self, sweetener: &str) -> bool {
        toggle(&mut self.sweeteners, sweetener, None, "sweeteners").unwrap_or_default()
    }

    /// Chosen sweeteners.
    pub fn sweeteners(&self) -> &[String] {
        &self.sweeteners
    }

    /// Choose (or clear) a potency level.
    pub fn set_potency(&mut self, potency: Option<String>) {
        self.potency = potency;
    }

    /// The chosen potency level.
    pub fn potency(&self) -> Option<&str> {
        self.potency.as_deref()
    }

    /// Set special instructions.
    pub fn set_comments(&mut self, comments: impl Into<String>) {
        self.comments = comments.into();
    }

    /// Special instructions.
    pub fn comments(&self) -> &str {
        &self.comments
    }

    /// Set the quantity, clamped to `1..=MAX_QUANTITY`.
    pub fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity.clamp(1, MAX_QUANTITY);
    }

    /// Set the quantity from raw shopper input; anything unreadable becomes one.
    pub fn set_quantity_input(&mut self, raw: &str) {
        let quantity = raw
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(|value| u32::try_from(value).ok())
            .unwrap_or(1);

        self.set_quantity(quantity);
    }

    /// Line quantity.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Clear the customisation after a successful cart submission.
    ///
    /// Option choices (size, strain option, ...) and the flavor category are kept so the shopper
    /// can add another of the same drink.
    pub fn reset_after_submit(&mut self) {
        self.flavors.clear();
        self.boosters.clear();
        self.creamers.clear();
        self.sweeteners.clear();
        self.comments.clear();
        self.quantity = 1;
    }

    /// Clear everything except the configured limits.
    pub fn reset(&mut self) {
        *self = Self {
            max_flavors: self.max_flavors,
            max_boosters: self.max_boosters,
            ..Self::new()
        };
    }

    fn pumps_of(&self, flavor: &str) -> u32 {
        self.flavors
            .iter()
            .find(|pour| same(&pour.name, flavor))
            .map_or(0, |pour| pour.pumps)
    }

    fn pour_mut(&mut self, flavor: &str) -> Option<&mut FlavorPour> {
        self.flavors
            .iter_mut()
            .find(|pour| same(&pour.name, flavor))
    }
}

fn contains_ignore_case(values: &[String], value: &str) -> bool {
    values.iter().any(|v| same(v, value))
}

fn toggle(
    values: &mut SmallVec<[String; 4]>,
    value: &str,
    max: Option<usize>,
    group: &'static str,
) -> Result<bool, SelectionError> {
    if contains_ignore_case(values, value) {
        values.retain(|v| !same(v, value));
        return Ok(false);
    }

    if let Some(max) = max
        && values.len() >= max
    {
        return Err(SelectionError::LimitReached { group, max });
    }

    values.push(value.to_string());

    Ok(true)
}
