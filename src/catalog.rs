//! Catalog

use std::fmt;

use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::labels::{fold, mentions, same};

pub mod product_json;

/// Name of the product option that carries the drink size.
pub const SIZE_OPTION: &str = "Size";

/// Errors raised while assembling a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A variant's currency differs from the catalog currency (index, variant currency, catalog currency).
    #[error("Variant {0} has currency {1}, but catalog has currency {2}")]
    CurrencyMismatch(usize, &'static str, &'static str),

    /// A variant carries a different number of option values than the product declares.
    #[error("Variant {index} has {found} option values, expected {expected}")]
    OptionCountMismatch {
        /// Position of the offending variant
        index: usize,
        /// Number of declared option names
        expected: usize,
        /// Number of option values on the variant
        found: usize,
    },

    /// Two variants share the same identifier.
    #[error("Duplicate variant id {0}")]
    DuplicateVariant(VariantId),

    /// A size mapping points at a variant that is not in the catalog.
    #[error("Unknown variant id {0}")]
    UnknownVariant(VariantId),

    /// A price could not be read.
    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    /// Product JSON could not be parsed.
    #[error("Failed to parse product JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Opaque storefront variant identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariantId(u64);

impl VariantId {
    /// Wraps a raw storefront identifier.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw identifier.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for VariantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A purchasable combination of option values.
#[derive(Debug, Clone, PartialEq)]
pub struct Variant {
    /// Variant identifier
    pub id: VariantId,

    /// Display title, e.g. "Large" or "Large / Green Maeng Da"
    pub title: String,

    /// Base price
    pub price: Money<'static, Currency>,

    /// Option values, positionally aligned with [`Catalog::option_names`]
    pub options: SmallVec<[String; 3]>,

    /// Whether the storefront reports the variant as purchasable
    pub available: bool,
}

impl Variant {
    /// Creates an available variant.
    pub fn new(
        id: VariantId,
        title: impl Into<String>,
        price: Money<'static, Currency>,
        options: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            price,
            options: options.into_iter().map(Into::into).collect(),
            available: true,
        }
    }

    /// Marks the variant as sold out.
    #[must_use]
    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    /// Returns the option value at `position`, if the variant has one.
    pub fn option(&self, position: usize) -> Option<&str> {
        self.options.get(position).map(String::as_str)
    }
}

/// Read-only product catalog: declared option names plus the variants that realise them.
#[derive(Debug, Clone)]
pub struct Catalog {
    option_names: SmallVec<[String; 3]>,
    variants: Vec<Variant>,
    currency: &'static Currency,

    /// Lower-cased size label -> variant, consulted before option matching
    size_variants: FxHashMap<String, VariantId>,
}

impl Catalog {
    /// Create an empty catalog with the given option names.
    pub fn new(
        option_names: impl IntoIterator<Item = impl Into<String>>,
        currency: &'static Currency,
    ) -> Self {
        Catalog {
            option_names: option_names.into_iter().map(Into::into).collect(),
            variants: Vec::new(),
            currency,
            size_variants: FxHashMap::default(),
        }
    }

    /// Create a catalog with the given variants.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if a variant's currency or option count does not fit the
    /// catalog, or if two variants share an id.
    pub fn with_variants(
        option_names: impl IntoIterator<Item = impl Into<String>>,
        variants: impl Into<Vec<Variant>>,
        currency: &'static Currency,
    ) -> Result<Self, CatalogError> {
        let mut catalog = Self::new(option_names, currency);

        variants
            .into()
            .into_iter()
            .try_for_each(|variant| catalog.push(variant))?;

        Ok(catalog)
    }

    /// Append a variant, keeping catalog order.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the variant does not fit the catalog.
    pub fn push(&mut self, variant: Variant) -> Result<(), CatalogError> {
        let index = self.variants.len();
        let variant_currency = variant.price.currency();

        if variant_currency != self.currency {
            return Err(CatalogError::CurrencyMismatch(
                index,
                variant_currency.iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        if variant.options.len() != self.option_names.len() {
            return Err(CatalogError::OptionCountMismatch {
                index,
                expected: self.option_names.len(),
                found: variant.options.len(),
            });
        }

        if self.variant(variant.id).is_some() {
            return Err(CatalogError::DuplicateVariant(variant.id));
        }

        self.variants.push(variant);

        Ok(())
    }

    /// Pin a size label to a specific variant.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownVariant`] if the id is not in the catalog.
    pub fn map_size(&mut self, size: &str, id: VariantId) -> Result<(), CatalogError> {
        if self.variant(id).is_none() {
            return Err(CatalogError::UnknownVariant(id));
        }

        self.size_variants.insert(fold(size), id);

        Ok(())
    }

    /// Declared option names, in position order.
    pub fn option_names(&self) -> &[String] {
        &self.option_names
    }

    /// Position of an option name, compared case-insensitively.
    pub fn option_position(&self, name: &str) -> Option<usize> {
        self.option_names
            .iter()
            .position(|option| same(option, name))
    }

    /// All variants, in catalog order.
    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    /// The first variant, used as the fallback for unresolvable selections.
    pub fn first(&self) -> Option<&Variant> {
        self.variants.first()
    }

    /// Look up a variant by id.
    pub fn variant(&self, id: VariantId) -> Option<&Variant> {
        self.variants.iter().find(|variant| variant.id == id)
    }

    /// Find the variant that represents a size label.
    ///
    /// Checks pinned size mappings first, then a variant whose `Size` option equals the label,
    /// then a variant whose title mentions the label. All comparisons ignore case.
    pub fn variant_for_size(&self, size: &str) -> Option<&Variant> {
        let key = fold(size);

        if let Some(variant) = self
            .size_variants
            .get(&key)
            .and_then(|id| self.variant(*id))
        {
            return Some(variant);
        }

        if let Some(position) = self.option_position(SIZE_OPTION) {
            let by_option = self.variants.iter().find(|variant| {
                variant
                    .option(position)
                    .is_some_and(|value| same(value, size))
            });

            if by_option.is_some() {
                return by_option;
            }
        }

        self.variants
            .iter()
            .find(|variant| mentions(&variant.title, size))
    }

    /// Get the number of variants.
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    /// Check if the catalog has no variants.
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Get the catalog currency.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}
