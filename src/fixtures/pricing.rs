//! Pricing Fixtures

use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use serde::Deserialize;

use crate::{
    allowance::PumpAllowance,
    fixtures::{FixtureError, parse_price},
    pricing::BoosterBundle,
    resolver::ResolverConfig,
    upsell::SizeOrder,
    visibility::{BoosterRestrictions, VisibilityRules},
};

/// Pricing configuration from YAML. Absent fields keep the [`ResolverConfig`] defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PricingFixture {
    /// Price of each pump beyond the allowance, e.g. `"0.50 USD"`
    pub extra_pump_price: Option<String>,

    /// Included pumps per size label
    pub pump_allowance: Option<FxHashMap<String, u32>>,

    /// Size labels, smallest first
    pub size_order: Option<Vec<String>>,

    /// Label of the bulk size
    pub bulk_size: Option<String>,

    /// Maximum number of distinct flavors
    pub max_flavors: Option<usize>,

    /// Maximum number of boosters
    pub max_boosters: Option<usize>,

    /// Whether a strain must be chosen
    pub require_strain: bool,

    /// Whether a flavor must be chosen below the bulk size
    pub require_flavor: bool,

    /// Modifier name -> surcharge
    pub modifiers: FxHashMap<String, String>,

    /// Booster bundle discount, replacing the default three-for-15%
    pub booster_bundle: Option<BundleFixture>,

    /// Size label -> boosters withheld at that size, replacing the default Small rule
    pub restricted_boosters: Option<FxHashMap<String, Vec<String>>>,
}

/// A booster bundle in a pricing fixture.
#[derive(Debug, Deserialize)]
pub struct BundleFixture {
    /// Boosters that form the bundle
    pub count: usize,

    /// Percent taken off the booster surcharges, `0` to disable
    pub percent_off: u32,
}

impl PricingFixture {
    /// Convert to a [`ResolverConfig`] for a catalog priced in `currency`
    ///
    /// # Errors
    ///
    /// Returns an error if a price is malformed or not in `currency`.
    pub fn try_into_config(
        self,
        currency: &'static Currency,
    ) -> Result<ResolverConfig, FixtureError> {
        let mut config = ResolverConfig::new(currency);

        if let Some(raw) = &self.extra_pump_price {
            config.extra_pump_price = price_in(raw, currency)?;
        }

        if let Some(allowance) = self.pump_allowance {
            config.allowance = allowance.into_iter().collect::<PumpAllowance>();
        }

        if let Some(sizes) = self.size_order {
            config.size_order = SizeOrder::new(sizes);
        }

        if let Some(bulk_size) = self.bulk_size {
            config.visibility = VisibilityRules::new(bulk_size);
        }

        if self.max_flavors.is_some() {
            config.max_flavors = self.max_flavors;
        }

        if self.max_boosters.is_some() {
            config.max_boosters = self.max_boosters;
        }

        config.require_strain = self.require_strain;
        config.require_flavor = self.require_flavor;

        for (name, raw) in &self.modifiers {
            config.modifier_prices.set(name, price_in(raw, currency)?);
        }

        if let Some(bundle) = self.booster_bundle {
            let bundle = (bundle.percent_off > 0)
                .then(|| BoosterBundle::new(bundle.count, bundle.percent_off));

            config.modifier_prices.set_bundle(bundle);
        }

        if let Some(restricted) = self.restricted_boosters {
            config.booster_restrictions = restricted.into_iter().fold(
                BoosterRestrictions::none(),
                |restrictions, (size, boosters)| restrictions.with(&size, boosters),
            );
        }

        Ok(config)
    }
}

fn price_in(
    raw: &str,
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, FixtureError> {
    let price = parse_price(raw)?;

    if price.currency() != currency {
        return Err(FixtureError::CurrencyMismatch(
            currency.iso_alpha_code.to_string(),
            price.currency().iso_alpha_code.to_string(),
        ));
    }

    Ok(price)
}
