//! Catalog Fixtures

use rustc_hash::FxHashMap;
use rusty_money::{Findable, iso::Currency};
use serde::Deserialize;

use crate::{
    catalog::{Catalog, Variant, VariantId},
    fixtures::{FixtureError, parse_price},
    visibility::ProductCategory,
};

/// Catalog fixture from YAML
#[derive(Debug, Deserialize)]
pub struct CatalogFixture {
    /// Product handle, used for category detection
    #[serde(default)]
    pub handle: String,

    /// Product title, used for category detection
    #[serde(default)]
    pub title: String,

    /// Explicit category tag, overriding detection
    #[serde(default)]
    pub category: Option<String>,

    /// Currency code, required only when there are no variants
    #[serde(default)]
    pub currency: Option<String>,

    /// Option names in position order
    pub options: Vec<String>,

    /// Variants in catalog order
    #[serde(default)]
    pub variants: Vec<VariantFixture>,

    /// Size label -> variant id pins
    #[serde(default)]
    pub sizes: FxHashMap<String, u64>,
}

/// Variant fixture from YAML
#[derive(Debug, Deserialize)]
pub struct VariantFixture {
    /// Storefront variant id
    pub id: u64,

    /// Display title
    pub title: String,

    /// Price, e.g. `"9.00 USD"`
    pub price: String,

    /// Option values in position order
    pub options: Vec<String>,

    /// Whether the variant is in stock
    #[serde(default = "in_stock")]
    pub available: bool,
}

fn in_stock() -> bool {
    true
}

impl CatalogFixture {
    /// The tagged category, or one detected from the handle and title
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::UnknownCategory`] if the tag is not recognised.
    pub fn category(&self) -> Result<ProductCategory, FixtureError> {
        match &self.category {
            Some(tag) => Ok(tag.parse()?),
            None => Ok(ProductCategory::detect(&self.handle, &self.title)),
        }
    }

    /// Convert to a [`Catalog`]
    ///
    /// # Errors
    ///
    /// Returns an error if a price is malformed, if prices disagree on currency, or if the
    /// variants do not form a valid catalog.
    pub fn try_into_catalog(self) -> Result<Catalog, FixtureError> {
        let mut declared = match &self.currency {
            Some(code) => Some(
                Currency::find(code).ok_or_else(|| FixtureError::UnknownCurrency(code.clone()))?,
            ),
            None => None,
        };

        let mut variants = Vec::with_capacity(self.variants.len());

        for variant_fixture in self.variants {
            let price = parse_price(&variant_fixture.price)?;
            let currency = price.currency();

            if let Some(existing) = declared {
                if existing != currency {
                    return Err(FixtureError::CurrencyMismatch(
                        existing.iso_alpha_code.to_string(),
                        currency.iso_alpha_code.to_string(),
                    ));
                }
            } else {
                declared = Some(currency);
            }

            let variant = Variant::new(
                VariantId::new(variant_fixture.id),
                variant_fixture.title,
                price,
                variant_fixture.options,
            );

            variants.push(if variant_fixture.available {
                variant
            } else {
                variant.unavailable()
            });
        }

        let currency = declared.ok_or(FixtureError::NoCurrency)?;
        let mut catalog = Catalog::with_variants(self.options, variants, currency)?;

        for (size, id) in self.sizes {
            catalog.map_size(&size, VariantId::new(id))?;
        }

        Ok(catalog)
    }
}
