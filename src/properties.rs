//! Cart line-item properties

use serde::{Serialize, Serializer, ser::SerializeMap};
use smallvec::SmallVec;

use crate::{
    labels::same,
    pricing::PumpUsage,
    selection::{FlavorCategory, Selection},
    visibility::{STAFF_NOTE, VisibilityDecision},
};

/// Property names submitted with the cart line.
pub mod names {
    /// Chosen size
    pub const SIZE: &str = "Size";
    /// Chosen strain(s)
    pub const STRAIN: &str = "Strain";
    /// Flavor category of the chosen flavors
    pub const FLAVOR_CATEGORY: &str = "Flavor Category";
    /// Flavors with pump counts
    pub const FLAVORS: &str = "Flavors";
    /// Pump usage summary
    pub const PUMP_USAGE: &str = "Pump Usage";
    /// Chosen boosters
    pub const BOOSTERS: &str = "Boosters";
    /// Chosen creamers
    pub const CREAMERS: &str = "Creamers";
    /// Chosen sweeteners
    pub const SWEETENERS: &str = "Sweeteners";
    /// Chosen potency
    pub const POTENCY: &str = "THC Concentration";
    /// Staff consultation note
    pub const GALLON_NOTE: &str = "Gallon Note";
    /// Special instructions
    pub const COMMENTS: &str = "Comments";
    /// Single-select ice level
    pub const ICE: &str = "Ice";
    /// Single-select sweetness level
    pub const SWEETNESS: &str = "Sweetness";
}

/// Ordered name/value pairs submitted as `properties[<Name>]`.
///
/// Blank values are never stored, so the storefront does not show empty customisation lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartProperties {
    entries: SmallVec<[(String, String); 12]>,
}

impl CartProperties {
    /// Create an empty property set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a property. Blank values remove the property instead.
    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        let trimmed = value.trim();

        if trimmed.is_empty() {
            self.remove(name);
            return;
        }

        if let Some(entry) = self.entries.iter_mut().find(|(key, _)| key == name) {
            entry.1 = trimmed.to_string();
        } else {
            self.entries.push((name.to_string(), trimmed.to_string()));
        }
    }

    /// Remove a property.
    pub fn remove(&mut self, name: &str) {
        self.entries.retain(|(key, _)| key != name);
    }

    /// Value of a property.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Whether a property is present.
    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Properties in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no properties.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Form field pairs, `("properties[Size]", "Medium")`.
    pub fn form_fields(&self) -> impl Iterator<Item = (String, &str)> {
        self.iter()
            .map(|(key, value)| (format!("properties[{key}]"), value))
    }
}

impl Serialize for CartProperties {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;

        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }

        map.end()
    }
}

/// Flatten a selection into cart properties.
///
/// `size` is the size label in effect, which may come from the resolved variant when the
/// selection has none. Flavor lines, the flavor category and the pump summary are only present
/// when flavors are chosen and the flavor picker is visible; potency only when the potency picker
/// is visible. Every other single-select choice (ice, sweetness, a catalog option) is submitted
/// under its own option name.
pub fn build_cart_properties(
    selection: &Selection,
    size: &str,
    usage: &PumpUsage,
    visibility: VisibilityDecision,
) -> CartProperties {
    let mut properties = CartProperties::new();

    properties.insert(names::SIZE, size);

    let strains = if selection.strains().is_empty() {
        selection.option(names::STRAIN).unwrap_or_default().to_string()
    } else {
        selection.strains().join(", ")
    };
    properties.insert(names::STRAIN, strains);

    if visibility.show_flavor_picker && !selection.flavors().is_empty() {
        let mut categories: SmallVec<[FlavorCategory; 2]> = SmallVec::new();

        for pour in selection.flavors() {
            if !categories.contains(&pour.category) {
                categories.push(pour.category);
            }
        }

        properties.insert(names::FLAVOR_CATEGORY, join(categories.iter()));
        properties.insert(
            names::FLAVORS,
            join(selection.flavors().iter().map(|pour| pour.label())),
        );
        properties.insert(names::PUMP_USAGE, usage.summary());
    }

    for (name, value) in selection.options() {
        if !same(name, names::SIZE) && !same(name, names::STRAIN) {
            properties.insert(name, value);
        }
    }

    properties.insert(names::BOOSTERS, selection.boosters().join(", "));
    properties.insert(names::CREAMERS, selection.creamers().join(", "));
    properties.insert(names::SWEETENERS, selection.sweeteners().join(", "));

    if visibility.show_potency_picker {
        properties.insert(names::POTENCY, selection.potency().unwrap_or_default());
    }

    if visibility.show_staff_note {
        properties.insert(names::GALLON_NOTE, STAFF_NOTE);
    }

    properties.insert(names::COMMENTS, selection.comments());

    properties
}

fn join(values: impl Iterator<Item = impl ToString>) -> String {
    values
        .map(|value| value.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
