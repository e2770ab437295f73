//! Storefront product payloads
//!
//! Models the JSON a product page embeds (or `/products/<handle>.js` returns) and turns it into a
//! [`Catalog`].

use rust_decimal::{
    Decimal,
    prelude::{FromPrimitive, ToPrimitive},
};
use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    catalog::{Catalog, CatalogError, Variant, VariantId},
    visibility::ProductCategory,
};

/// Product payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductJson {
    /// Product handle, e.g. `kratom-tea`
    #[serde(default)]
    pub handle: String,

    /// Product title
    #[serde(default)]
    pub title: String,

    /// Declared options
    #[serde(default)]
    pub options: Vec<OptionJson>,

    /// Variants in storefront order
    #[serde(default)]
    pub variants: Vec<VariantJson>,

    /// Optional size label -> variant id pins
    #[serde(default)]
    pub variant_map: FxHashMap<String, VariantId>,
}

/// A declared option: either a bare name (`.js` endpoint) or a full object (`.json` endpoint).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum OptionJson {
    /// `"Size"`
    Name(String),

    /// `{"name": "Size", "position": 1, "values": [...]}`
    Detailed {
        /// Option name
        name: String,
    },
}

impl OptionJson {
    /// The option name.
    pub fn name(&self) -> &str {
        match self {
            OptionJson::Name(name) | OptionJson::Detailed { name } => name,
        }
    }
}

/// Variant payload.
#[derive(Debug, Deserialize)]
pub struct VariantJson {
    /// Variant id
    pub id: VariantId,

    /// Variant title
    #[serde(default)]
    pub title: String,

    /// Variant price
    pub price: PriceJson,

    /// First option value
    #[serde(default)]
    pub option1: Option<String>,

    /// Second option value
    #[serde(default)]
    pub option2: Option<String>,

    /// Third option value
    #[serde(default)]
    pub option3: Option<String>,

    /// Availability; missing means available
    #[serde(default)]
    pub available: Option<bool>,
}

/// A price as it appears in product JSON.
///
/// Integers are minor units (the storefront's cents convention). Decimal numbers and strings are
/// major units.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PriceJson {
    /// `900`
    Minor(i64),

    /// `9.5`
    Major(f64),

    /// `"9.50"`
    Text(String),
}

impl PriceJson {
    /// Converts to minor units, rounding to whole cents.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidPrice`] if the value is not a finite amount.
    pub fn to_minor_units(&self) -> Result<i64, CatalogError> {
        let major = match self {
            PriceJson::Minor(minor) => return Ok(*minor),
            PriceJson::Major(value) => Decimal::from_f64(*value),
            PriceJson::Text(text) => text.trim().parse::<Decimal>().ok(),
        };

        major
            .and_then(|value| value.checked_mul(Decimal::new(100, 0)))
            .and_then(|value| value.round_dp(0).to_i64())
            .ok_or_else(|| CatalogError::InvalidPrice(format!("{self:?}")))
    }
}

impl ProductJson {
    /// Parse a product payload.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Json`] if the payload is not valid product JSON.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Infer the product category from the handle and title.
    pub fn category(&self) -> ProductCategory {
        ProductCategory::detect(&self.handle, &self.title)
    }

    /// Build a catalog priced in `currency`.
    ///
    /// Option values beyond the declared option count are ignored. A variant whose price cannot
    /// be read, or that does not fit the declared options, is left out with a warning so the rest
    /// of the product stays purchasable. Size pins that point at unknown variants are skipped.
    pub fn into_catalog(self, currency: &'static Currency) -> Catalog {
        let option_names: Vec<String> = self
            .options
            .iter()
            .map(|option| option.name().to_string())
            .collect();
        let option_count = option_names.len();

        let mut catalog = Catalog::new(option_names, currency);

        for variant in self.variants {
            let minor_units = match variant.price.to_minor_units() {
                Ok(minor_units) => minor_units,
                Err(err) => {
                    warn!(id = %variant.id, %err, "skipping variant with unreadable price");
                    continue;
                }
            };
            let id = variant.id;
            let options = [variant.option1, variant.option2, variant.option3]
                .into_iter()
                .take(option_count)
                .map(Option::unwrap_or_default);

            let mut built = Variant::new(
                id,
                variant.title,
                Money::from_minor(minor_units, currency),
                options,
            );
            built.available = variant.available.unwrap_or(true);

            if let Err(err) = catalog.push(built) {
                warn!(%id, %err, "skipping variant that does not fit the product");
            }
        }

        for (size, id) in self.variant_map {
            if let Err(err) = catalog.map_size(&size, id) {
                debug!(%size, %id, %err, "ignoring size pin");
            }
        }

        catalog
    }
}
