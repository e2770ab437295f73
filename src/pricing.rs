//! Pricing

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rustc_hash::FxHashMap;
use rusty_money::{Money, MoneyError, iso::Currency};
use tracing::warn;

use crate::{
    allowance::PumpAllowance,
    catalog::Variant,
    labels::fold,
    selection::{FlavorPour, Selection},
};

/// Breakdown of requested pumps against a size's allowance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PumpUsage {
    /// Pumps requested across all flavors
    pub total: u32,

    /// Pumps included with the size
    pub included: u32,

    /// Pumps charged for
    pub extra: u32,

    /// Price of one extra pump
    pub unit_price: Money<'static, Currency>,
}

impl PumpUsage {
    /// Meter `pours` against the allowance for `size`.
    pub fn new(
        pours: &[FlavorPour],
        size: &str,
        allowance: &PumpAllowance,
        unit_price: Money<'static, Currency>,
    ) -> Self {
        let total = pours
            .iter()
            .fold(0_u32, |total, pour| total.saturating_add(pour.pumps));
        let included = allowance.included(size);

        Self {
            total,
            included,
            extra: total.saturating_sub(included),
            unit_price,
        }
    }

    /// Cost of the extra pumps.
    pub fn extra_charge(&self) -> Money<'static, Currency> {
        times(self.unit_price, self.extra)
    }

    /// Human readable summary for the cart line.
    pub fn summary(&self) -> String {
        format!(
            "Total pumps: {} (Included {}, Extra {} @ {} each)",
            self.total, self.included, self.extra, self.unit_price
        )
    }
}

/// Price a variant with metered flavor pumps.
///
/// The result is the variant price plus one `extra_pump_price` for every pump beyond what `size`
/// includes. Amounts are kept in minor units, so no rounding is needed. If the extra-pump price is
/// in another currency the bare variant price is returned.
pub fn compute_price(
    variant: &Variant,
    size: &str,
    pours: &[FlavorPour],
    allowance: &PumpAllowance,
    extra_pump_price: Money<'static, Currency>,
) -> Money<'static, Currency> {
    let usage = PumpUsage::new(pours, size, allowance, extra_pump_price);

    match variant.price.add(usage.extra_charge()) {
        Ok(price) => price,
        Err(err) => {
            warn!(variant = %variant.id, %err, "extra pump price not applied");
            variant.price
        }
    }
}

/// Fraction taken off the booster surcharges when exactly `count` boosters are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoosterBundle {
    /// Number of boosters that forms a bundle
    pub count: usize,

    /// Fraction of the booster surcharges taken off, e.g. `0.15`
    pub percent_off: Decimal,
}

impl BoosterBundle {
    /// A bundle of `count` boosters with `percent_points` percent off.
    pub fn new(count: usize, percent_points: u32) -> Self {
        Self {
            count,
            percent_off: Decimal::new(i64::from(percent_points), 2),
        }
    }

    /// Whether `boosters` chosen boosters form the bundle.
    pub fn applies_to(&self, boosters: usize) -> bool {
        boosters == self.count
    }

    /// The amount taken off `booster_total`, rounded half away from zero to a minor unit.
    pub fn discount_on(&self, booster_total: Money<'static, Currency>) -> Money<'static, Currency> {
        let minor = Decimal::from(booster_total.to_minor_units())
            .checked_mul(self.percent_off)
            .map(|applied| {
                applied.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            })
            .and_then(|rounded| rounded.to_i64());

        let Some(minor) = minor else {
            warn!(
                total = %booster_total,
                percent_off = %self.percent_off,
                "bundle discount overflowed"
            );
            return Money::from_minor(0, booster_total.currency());
        };

        Money::from_minor(minor, booster_total.currency())
    }
}

impl Default for BoosterBundle {
    fn default() -> Self {
        Self::new(3, 15)
    }
}

/// Surcharges for priced add-ons, keyed case-insensitively.
///
/// Boosters, creamers, sweeteners and the values of single-select options (an "Ice" choice of
/// "Premium Ice", say) are all looked up by name.
#[derive(Debug, Clone, Default)]
pub struct ModifierPrices {
    prices: FxHashMap<String, Money<'static, Currency>>,
    bundle: Option<BoosterBundle>,
}

impl ModifierPrices {
    /// Set the surcharge for a modifier.
    pub fn set(&mut self, name: &str, price: Money<'static, Currency>) {
        self.prices.insert(fold(name), price);
    }

    /// Builder-style [`ModifierPrices::set`].
    #[must_use]
    pub fn with(mut self, name: &str, price: Money<'static, Currency>) -> Self {
        self.set(name, price);
        self
    }

    /// Surcharge for a modifier, if it is priced.
    pub fn price_of(&self, name: &str) -> Option<Money<'static, Currency>> {
        self.prices.get(&fold(name)).copied()
    }

    /// Check if no modifier is priced.
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Offer a booster bundle discount.
    #[must_use]
    pub fn with_bundle(mut self, bundle: BoosterBundle) -> Self {
        self.bundle = Some(bundle);
        self
    }

    /// Replace (or remove) the booster bundle.
    pub fn set_bundle(&mut self, bundle: Option<BoosterBundle>) {
        self.bundle = bundle;
    }

    /// The booster bundle on offer.
    pub fn bundle(&self) -> Option<BoosterBundle> {
        self.bundle
    }

    /// Sum of surcharges for every chosen booster, creamer, sweetener and single-select value.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if a surcharge is not in `currency`.
    pub fn surcharge(
        &self,
        selection: &Selection,
        currency: &'static Currency,
    ) -> Result<Money<'static, Currency>, MoneyError> {
        let multi = selection
            .boosters()
            .iter()
            .chain(selection.creamers())
            .chain(selection.sweeteners())
            .map(String::as_str);
        let single = selection.options().map(|(_, value)| value);

        self.sum(multi.chain(single), currency)
    }

    /// Amount taken off when the chosen boosters form the bundle, otherwise zero.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if a booster surcharge is not in `currency`.
    pub fn bundle_discount(
        &self,
        selection: &Selection,
        currency: &'static Currency,
    ) -> Result<Money<'static, Currency>, MoneyError> {
        let Some(bundle) = self
            .bundle
            .filter(|bundle| bundle.applies_to(selection.boosters().len()))
        else {
            return Ok(Money::from_minor(0, currency));
        };

        let boosters = self.sum(selection.boosters().iter().map(String::as_str), currency)?;

        Ok(bundle.discount_on(boosters))
    }

    fn sum<'n>(
        &self,
        names: impl Iterator<Item = &'n str>,
        currency: &'static Currency,
    ) -> Result<Money<'static, Currency>, MoneyError> {
        names
            .filter_map(|name| self.price_of(name))
            .try_fold(Money::from_minor(0, currency), |acc, price| acc.add(price))
    }
}

/// Multiply a unit price by a quantity.
pub fn times(unit: Money<'static, Currency>, quantity: u32) -> Money<'static, Currency> {
    let minor = unit
        .to_minor_units()
        .saturating_mul(i64::from(quantity));

    Money::from_minor(minor, unit.currency())
}
