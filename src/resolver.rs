//! Variant pricing resolver
//!
//! [`VariantPricingResolver`] is the state owner for one drink-builder widget: it borrows the
//! immutable [`Catalog`] and owns its [`Selection`], so several widgets on one page can share a
//! catalog without sharing any mutable state.

use rusty_money::{Money, iso::Currency};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    allowance::PumpAllowance,
    cart::CartAddRequest,
    catalog::{Catalog, SIZE_OPTION, Variant, VariantId},
    labels::same,
    pricing::{BoosterBundle, ModifierPrices, PumpUsage, compute_price, times},
    properties::{CartProperties, build_cart_properties},
    quote::Quote,
    selection::{Selection, SelectionError},
    upsell::{SizeOrder, Upsell, compute_upsell},
    visibility::{BoosterRestrictions, ProductCategory, VisibilityDecision, VisibilityRules},
};

/// Shown in place of a price when the catalog has no variants.
pub const PRICE_PLACEHOLDER: &str = "Unavailable";

/// Reasons a selection is not ready to be added to the cart.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReadinessError {
    /// The product requires a strain and none is chosen.
    #[error("Please select a strain")]
    MissingStrain,

    /// The product requires at least one flavor at this size.
    #[error("Please select at least one flavor")]
    MissingFlavor,

    /// No variant could be resolved.
    #[error("Product configuration error")]
    NoVariant,
}

/// Per-product pricing configuration.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Included pumps per size
    pub allowance: PumpAllowance,

    /// Price of each pump beyond the allowance
    pub extra_pump_price: Money<'static, Currency>,

    /// Ascending size labels, used for upsells
    pub size_order: SizeOrder,

    /// Bulk-size picker rules
    pub visibility: VisibilityRules,

    /// Product category
    pub category: ProductCategory,

    /// Surcharges for priced add-ons, and the booster bundle discount
    pub modifier_prices: ModifierPrices,

    /// Boosters withheld at particular sizes
    pub booster_restrictions: BoosterRestrictions,

    /// Maximum number of distinct flavors
    pub max_flavors: Option<usize>,

    /// Maximum number of boosters
    pub max_boosters: Option<usize>,

    /// Whether a strain must be chosen before submission
    pub require_strain: bool,

    /// Whether a flavor must be chosen before submission below the bulk size
    pub require_flavor: bool,
}

impl ResolverConfig {
    /// Defaults for a catalog in `currency`: 4/6/12 included pumps, 0.50 per extra pump, Small to
    /// Gallon size order, four flavors and three boosters at most, 15% off a bundle of three
    /// boosters, and no protein or CBD boosters in a Small.
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            allowance: PumpAllowance::default(),
            extra_pump_price: Money::from_minor(50, currency),
            size_order: SizeOrder::default(),
            visibility: VisibilityRules::default(),
            category: ProductCategory::default(),
            modifier_prices: ModifierPrices::default().with_bundle(BoosterBundle::default()),
            booster_restrictions: BoosterRestrictions::default(),
            max_flavors: Some(4),
            max_boosters: Some(3),
            require_strain: false,
            require_flavor: false,
        }
    }

    /// Set the product category.
    #[must_use]
    pub fn with_category(mut self, category: ProductCategory) -> Self {
        self.category = category;
        self
    }
}

/// Resolve a selection to a catalog variant.
///
/// Option values are compared positionally and case-insensitively; options the selection leaves
/// unset match anything. Among matches an available variant wins, otherwise the first match in
/// catalog order. When nothing matches the first catalog variant is returned, and `None` only
/// when the catalog is empty.
pub fn resolve_variant<'c>(selection: &Selection, catalog: &'c Catalog) -> Option<&'c Variant> {
    let picked: Vec<Option<&str>> = catalog
        .option_names()
        .iter()
        .map(|name| selection.option(name))
        .collect();

    let mut first_match = None;

    for variant in catalog.variants() {
        let matches = picked.iter().enumerate().all(|(position, wanted)| match wanted {
            None => true,
            Some(wanted) => variant
                .option(position)
                .is_some_and(|value| same(value, wanted)),
        });

        if !matches {
            continue;
        }

        if variant.available {
            return Some(variant);
        }

        if first_match.is_none() {
            first_match = Some(variant);
        }
    }

    if first_match.is_none() {
        if catalog.is_empty() {
            warn!("catalog has no variants");
        } else {
            debug!(?picked, "no variant matches selection, using first variant");
        }
    }

    first_match.or_else(|| catalog.first())
}

/// State owner for one widget instance.
#[derive(Debug)]
pub struct VariantPricingResolver<'c> {
    catalog: &'c Catalog,
    config: ResolverConfig,
    selection: Selection,
}

impl<'c> VariantPricingResolver<'c> {
    /// Create a resolver with a fresh selection.
    pub fn new(catalog: &'c Catalog, config: ResolverConfig) -> Self {
        let mut selection = Selection::new();

        if let Some(max) = config.max_flavors {
            selection = selection.with_max_flavors(max);
        }

        if let Some(max) = config.max_boosters {
            selection = selection.with_max_boosters(max);
        }

        Self {
            catalog,
            config,
            selection,
        }
    }

    /// The catalog being priced.
    pub fn catalog(&self) -> &'c Catalog {
        self.catalog
    }

    /// The pricing configuration.
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// The current selection.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Change the selection, then enforce the visibility rules for the (possibly new) size.
    ///
    /// Anything the rules hide is cleared, not just hidden, so stale flavors, potency or boosters
    /// withheld at the size never reach the cart.
    pub fn update<R>(&mut self, change: impl FnOnce(&mut Selection) -> R) -> R {
        let result = change(&mut self.selection);
        let visibility = self.visibility();

        if !visibility.show_flavor_picker && !self.selection.flavors().is_empty() {
            debug!(size = self.size(), "clearing flavors hidden by category rules");
            self.selection.clear_flavors();
        }

        if !visibility.show_potency_picker && self.selection.potency().is_some() {
            self.selection.set_potency(None);
        }

        let size = self.size().to_string();
        let withheld: Vec<String> = self
            .selection
            .boosters()
            .iter()
            .filter(|booster| !self.config.booster_restrictions.is_offered(booster, &size))
            .cloned()
            .collect();

        for booster in &withheld {
            debug!(%size, %booster, "removing booster withheld at this size");
            self.selection.remove_booster(booster);
        }

        result
    }

    /// Choose a size.
    pub fn select_size(&mut self, size: &str) {
        self.update(|selection| selection.set_size(size));
    }

    /// Whether `booster` is offered at the current size.
    pub fn offers_booster(&self, booster: &str) -> bool {
        self.config
            .booster_restrictions
            .is_offered(booster, self.size())
    }

    /// Toggle a booster, refusing ones withheld at the current size.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::NotOffered`] for a withheld booster, or
    /// [`SelectionError::LimitReached`] when the booster limit is already met.
    pub fn toggle_booster(&mut self, booster: &str) -> Result<bool, SelectionError> {
        if !self.offers_booster(booster) {
            return Err(SelectionError::NotOffered {
                item: booster.to_string(),
                size: self.size().to_string(),
            });
        }

        self.update(|selection| selection.toggle_booster(booster))
    }

    /// The size label in effect: the chosen size, else the resolved variant's size option.
    pub fn size(&self) -> &str {
        if let Some(size) = self.selection.size() {
            return size;
        }

        let position = self.catalog.option_position(SIZE_OPTION);

        self.variant()
            .and_then(|variant| position.and_then(|position| variant.option(position)))
            .unwrap_or_default()
    }

    /// The resolved variant.
    pub fn variant(&self) -> Option<&'c Variant> {
        resolve_variant(&self.selection, self.catalog)
    }

    /// Id to place in the hidden variant field.
    pub fn variant_id(&self) -> Option<VariantId> {
        self.variant().map(|variant| variant.id)
    }

    /// Pump usage against the current size's allowance.
    pub fn pump_usage(&self) -> PumpUsage {
        PumpUsage::new(
            self.selection.flavors(),
            self.size(),
            &self.config.allowance,
            self.config.extra_pump_price,
        )
    }

    /// Variant price plus extra pumps, `None` when the catalog is empty.
    pub fn price(&self) -> Option<Money<'static, Currency>> {
        let variant = self.variant()?;

        Some(compute_price(
            variant,
            self.size(),
            self.selection.flavors(),
            &self.config.allowance,
            self.config.extra_pump_price,
        ))
    }

    /// Displayed price: the quote total, or [`PRICE_PLACEHOLDER`].
    pub fn formatted_price(&self) -> String {
        self.quote()
            .map_or_else(|| PRICE_PLACEHOLDER.to_string(), |quote| quote.total.to_string())
    }

    /// Next-size suggestion, recomputed from the current selection.
    ///
    /// The suggested variant keeps every other option the shopper chose, so a Medium / Red
    /// drink is offered Large / Red. Catalogs without a `Size` option fall back to the size
    /// lookups of [`compute_upsell`].
    pub fn upsell(&self) -> Option<Upsell> {
        let current_size = self.size();

        let Some(position) = self.catalog.option_position(SIZE_OPTION) else {
            return compute_upsell(current_size, self.catalog, &self.config.size_order);
        };

        let next_size = self.config.size_order.next_after(current_size)?;
        let current = self.variant()?;

        let mut next_selection = self.selection.clone();
        next_selection.set_size(next_size);

        let next = resolve_variant(&next_selection, self.catalog).filter(|variant| {
            variant
                .option(position)
                .is_some_and(|value| same(value, next_size))
        })?;

        Upsell::between(current_size, next_size, current, next)
    }

    /// Upsell text, empty when there is nothing to suggest.
    pub fn upsell_message(&self) -> String {
        self.upsell()
            .map(|upsell| upsell.to_string())
            .unwrap_or_default()
    }

    /// Picker visibility for the current size.
    pub fn visibility(&self) -> VisibilityDecision {
        self.config.visibility.apply(self.config.category, self.size())
    }

    /// Properties to submit with the cart line.
    pub fn cart_properties(&self) -> CartProperties {
        build_cart_properties(
            &self.selection,
            self.size(),
            &self.pump_usage(),
            self.visibility(),
        )
    }

    /// Price breakdown, `None` when the catalog is empty.
    pub fn quote(&self) -> Option<Quote> {
        let variant = self.variant()?;
        let price = self.price()?;
        let usage = self.pump_usage();
        let currency = self.catalog.currency();

        let prices = &self.config.modifier_prices;
        let zero = Money::from_minor(0, currency);

        let modifiers = prices
            .surcharge(&self.selection, currency)
            .unwrap_or_else(|err| {
                warn!(%err, "modifier surcharges not applied");
                zero
            });

        let bundle_discount = prices
            .bundle_discount(&self.selection, currency)
            .unwrap_or_else(|err| {
                warn!(%err, "booster bundle discount not applied");
                zero
            });

        let unit_price = price
            .add(modifiers)
            .and_then(|price| price.sub(bundle_discount))
            .unwrap_or(price);
        let quantity = self.selection.quantity();

        Some(Quote {
            title: variant.title.clone(),
            base: variant.price,
            usage,
            modifiers,
            bundle_discount,
            unit_price,
            quantity,
            total: times(unit_price, quantity),
            upsell: self.upsell(),
        })
    }

    /// Check the selection can be submitted.
    ///
    /// A required flavor is only enforced below the bulk size, whether or not the category keeps
    /// the flavor picker there.
    ///
    /// # Errors
    ///
    /// Returns the first [`ReadinessError`] that applies.
    pub fn check_ready(&self) -> Result<(), ReadinessError> {
        if self.variant().is_none() {
            return Err(ReadinessError::NoVariant);
        }

        if self.config.require_strain
            && self.selection.strains().is_empty()
            && self.selection.option("Strain").is_none()
        {
            return Err(ReadinessError::MissingStrain);
        }

        if self.config.require_flavor
            && !self.config.visibility.is_bulk(self.size())
            && self.selection.flavors().is_empty()
        {
            return Err(ReadinessError::MissingFlavor);
        }

        Ok(())
    }

    /// Build the cart-add request for the current selection.
    ///
    /// # Errors
    ///
    /// Returns a [`ReadinessError`] if the selection cannot be submitted yet.
    pub fn cart_request(&self) -> Result<CartAddRequest, ReadinessError> {
        self.check_ready()?;

        let id = self.variant_id().ok_or(ReadinessError::NoVariant)?;

        Ok(CartAddRequest {
            id,
            quantity: self.selection.quantity(),
            properties: self.cart_properties(),
        })
    }

    /// Reset the customisation after the cart accepted the line.
    pub fn submitted(&mut self) {
        self.selection.reset_after_submit();
    }

    /// Discard the whole selection.
    pub fn reset(&mut self) {
        self.selection.reset();
    }
}
