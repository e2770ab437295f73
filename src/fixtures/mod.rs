//! Fixtures

use std::{fs, path::PathBuf};

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::{Findable, Money, iso::Currency};
use thiserror::Error;

use crate::{
    catalog::{Catalog, CatalogError},
    fixtures::{catalogs::CatalogFixture, pricing::PricingFixture},
    resolver::{ResolverConfig, VariantPricingResolver},
    visibility::{ProductCategory, UnknownCategory},
};

pub mod catalogs;
pub mod pricing;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Currency mismatch between prices
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// Catalog fixture declares no currency and has no variants to take one from
    #[error("Catalog fixture has no currency")]
    NoCurrency,

    /// Unrecognised category tag
    #[error(transparent)]
    UnknownCategory(#[from] UnknownCategory),

    /// Catalog assembly error
    #[error("Invalid catalog: {0}")]
    Catalog(#[from] CatalogError),

    /// No catalog loaded yet
    #[error("No catalog loaded")]
    NoCatalog,
}

/// Parse a fixture price such as `"9.00 USD"`.
///
/// # Errors
///
/// Returns [`FixtureError::InvalidPrice`] if the text is not an amount followed by a currency
/// code, or [`FixtureError::UnknownCurrency`] if the code is not an ISO currency.
pub fn parse_price(raw: &str) -> Result<Money<'static, Currency>, FixtureError> {
    let mut parts = raw.split_whitespace();

    let (Some(amount), Some(code), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(FixtureError::InvalidPrice(raw.to_string()));
    };

    let currency =
        Currency::find(code).ok_or_else(|| FixtureError::UnknownCurrency(code.to_string()))?;

    let minor_units = amount
        .parse::<Decimal>()
        .ok()
        .and_then(|amount| amount.checked_mul(Decimal::from(10_i64.pow(currency.exponent))))
        .and_then(|minor| minor.round_dp(0).to_i64())
        .ok_or_else(|| FixtureError::InvalidPrice(raw.to_string()))?;

    Ok(Money::from_minor(minor_units, currency))
}

/// Catalog and pricing configuration loaded from YAML.
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    catalog: Option<Catalog>,
    category: ProductCategory,
    config: Option<ResolverConfig>,
}

impl Fixture {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            catalog: None,
            category: ProductCategory::default(),
            config: None,
        }
    }

    /// Load a catalog from `catalogs/<name>.yml`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the variants do not form a
    /// valid catalog.
    pub fn load_catalog(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("catalogs").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: CatalogFixture = serde_norway::from_str(&contents)?;

        self.category = fixture.category()?;
        self.catalog = Some(fixture.try_into_catalog()?);

        Ok(self)
    }

    /// Load pricing configuration from `pricing/<name>.yml`
    ///
    /// # Errors
    ///
    /// Returns an error if no catalog is loaded, if the file cannot be read or parsed, or if a
    /// price is not in the catalog currency.
    pub fn load_pricing(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let currency = self.catalog()?.currency();

        let file_path = self.base_path.join("pricing").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: PricingFixture = serde_norway::from_str(&contents)?;

        let config = fixture.try_into_config(currency)?;

        self.config = Some(config.with_category(self.category));

        Ok(self)
    }

    /// Load a complete fixture set (catalog and pricing with the same name)
    ///
    /// # Errors
    ///
    /// Returns an error if either fixture file cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture.load_catalog(name)?.load_pricing(name)?;

        Ok(fixture)
    }

    /// The loaded catalog
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::NoCatalog`] if no catalog is loaded.
    pub fn catalog(&self) -> Result<&Catalog, FixtureError> {
        self.catalog.as_ref().ok_or(FixtureError::NoCatalog)
    }

    /// Product category declared by (or detected from) the catalog fixture
    pub fn category(&self) -> ProductCategory {
        self.category
    }

    /// Pricing configuration, falling back to the defaults for the catalog currency when no
    /// pricing fixture was loaded
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::NoCatalog`] if no catalog is loaded.
    pub fn config(&self) -> Result<ResolverConfig, FixtureError> {
        if let Some(config) = &self.config {
            return Ok(config.clone());
        }

        let currency = self.catalog()?.currency();

        Ok(ResolverConfig::new(currency).with_category(self.category))
    }

    /// A fresh widget resolver over the loaded catalog
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::NoCatalog`] if no catalog is loaded.
    pub fn resolver(&self) -> Result<VariantPricingResolver<'_>, FixtureError> {
        Ok(VariantPricingResolver::new(self.catalog()?, self.config()?))
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use rusty_money::iso::{GBP, USD};
    use tempfile::tempdir;
    use testresult::TestResult;

    use super::*;
    use crate::catalog::VariantId;

    fn write_fixture(base: &Path, category: &str, name: &str, contents: &str) -> TestResult {
        let dir = base.join(category);

        fs::create_dir_all(&dir)?;
        fs::write(dir.join(format!("{name}.yml")), contents)?;

        Ok(())
    }

    #[test]
    fn parse_price_reads_amount_and_currency() -> TestResult {
        assert_eq!(parse_price("9.00 USD")?, Money::from_minor(900, USD));
        assert_eq!(parse_price("0.5 USD")?, Money::from_minor(50, USD));
        assert_eq!(parse_price("  13 GBP ")?, Money::from_minor(1300, GBP));

        Ok(())
    }

    #[test]
    fn parse_price_rejects_malformed_input() {
        assert!(matches!(
            parse_price("9.00"),
            Err(FixtureError::InvalidPrice(_))
        ));
        assert!(matches!(
            parse_price("nine USD"),
            Err(FixtureError::InvalidPrice(_))
        ));
        assert!(matches!(
            parse_price("9.00 USD extra"),
            Err(FixtureError::InvalidPrice(_))
        ));
        assert!(matches!(
            parse_price("9.00 XYZ"),
            Err(FixtureError::UnknownCurrency(code)) if code == "XYZ"
        ));
    }

    #[test]
    fn fixture_from_set_loads_catalog_and_pricing() -> TestResult {
        let fixture = Fixture::from_set("kratom")?;
        let catalog = fixture.catalog()?;

        assert_eq!(catalog.currency(), USD);
        assert_eq!(fixture.category(), ProductCategory::Kratom);

        let medium = catalog.variant_for_size("Medium").ok_or("no medium")?;

        assert_eq!(medium.price, Money::from_minor(900, USD));

        let config = fixture.config()?;

        assert_eq!(config.allowance.included("Large"), 6);
        assert_eq!(config.extra_pump_price, Money::from_minor(50, USD));
        assert_eq!(config.category, ProductCategory::Kratom);

        Ok(())
    }

    #[test]
    fn config_defaults_without_pricing_fixture() -> TestResult {
        let mut fixture = Fixture::new();

        fixture.load_catalog("delta9")?;

        let config = fixture.config()?;

        assert_eq!(config.category, ProductCategory::Delta9);
        assert_eq!(config.allowance.included("Gallon"), 12);

        Ok(())
    }

    #[test]
    fn pricing_requires_a_catalog() {
        let mut fixture = Fixture::new();

        assert!(matches!(
            fixture.load_pricing("kratom"),
            Err(FixtureError::NoCatalog)
        ));
        assert!(matches!(fixture.resolver(), Err(FixtureError::NoCatalog)));
    }

    #[test]
    fn catalog_takes_currency_from_variants_and_rejects_mixed() -> TestResult {
        let dir = tempdir()?;

        write_fixture(
            dir.path(),
            "catalogs",
            "mixed",
            "options: [Size]\nvariants:\n  - id: 1\n    title: Medium\n    price: 9.00 USD\n    options: [Medium]\n  - id: 2\n    title: Large\n    price: 13.00 GBP\n    options: [Large]\n",
        )?;

        let mut fixture = Fixture::with_base_path(dir.path());
        let result = fixture.load_catalog("mixed");

        assert!(matches!(
            result,
            Err(FixtureError::CurrencyMismatch(expected, found)) if expected == "USD" && found == "GBP"
        ));

        Ok(())
    }

    #[test]
    fn catalog_honours_size_pins_and_category_tag() -> TestResult {
        let dir = tempdir()?;

        write_fixture(
            dir.path(),
            "catalogs",
            "pinned",
            "title: House Tea\ncategory: kava\noptions: [Size]\nvariants:\n  - id: 10\n    title: Cup\n    price: 5.00 USD\n    options: [Cup]\n  - id: 11\n    title: Jug\n    price: 30.00 USD\n    options: [Jug]\n    available: false\nsizes:\n  Gallon: 11\n",
        )?;

        let mut fixture = Fixture::with_base_path(dir.path());
        fixture.load_catalog("pinned")?;

        let catalog = fixture.catalog()?;
        let gallon = catalog.variant_for_size("Gallon").ok_or("no gallon")?;

        assert_eq!(gallon.id, VariantId::new(11));
        assert!(!gallon.available);
        assert_eq!(fixture.category(), ProductCategory::Kava);

        Ok(())
    }

    #[test]
    fn empty_catalog_needs_declared_currency() -> TestResult {
        let dir = tempdir()?;

        write_fixture(dir.path(), "catalogs", "bare", "options: [Size]\n")?;
        write_fixture(
            dir.path(),
            "catalogs",
            "declared",
            "currency: USD\noptions: [Size]\n",
        )?;

        let mut fixture = Fixture::with_base_path(dir.path());

        assert!(matches!(
            fixture.load_catalog("bare"),
            Err(FixtureError::NoCurrency)
        ));

        fixture.load_catalog("declared")?;

        assert!(fixture.catalog()?.is_empty());
        assert_eq!(fixture.resolver()?.formatted_price(), "Unavailable");

        Ok(())
    }

    #[test]
    fn pricing_rejects_foreign_currency() -> TestResult {
        let dir = tempdir()?;

        write_fixture(dir.path(), "catalogs", "shop", "currency: USD\noptions: [Size]\n")?;
        write_fixture(dir.path(), "pricing", "shop", "extra_pump_price: 0.50 GBP\n")?;

        let mut fixture = Fixture::with_base_path(dir.path());
        fixture.load_catalog("shop")?;

        assert!(matches!(
            fixture.load_pricing("shop"),
            Err(FixtureError::CurrencyMismatch(_, _))
        ));

        Ok(())
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let mut fixture = Fixture::new();

        assert!(matches!(
            fixture.load_catalog("nonexistent"),
            Err(FixtureError::Io(_))
        ));
    }
}
