//! Barista prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    allowance::PumpAllowance,
    cart::{CartAddRequest, CartError, CartSummary, SubmitControl, SubmitGuard},
    catalog::{Catalog, CatalogError, Variant, VariantId, product_json::ProductJson},
    fixtures::{Fixture, FixtureError},
    pricing::{BoosterBundle, ModifierPrices, PumpUsage, compute_price},
    properties::{CartProperties, build_cart_properties},
    quote::{Quote, QuoteError},
    resolver::{
        PRICE_PLACEHOLDER, ReadinessError, ResolverConfig, VariantPricingResolver,
        resolve_variant,
    },
    selection::{FlavorCategory, FlavorPour, Selection, SelectionError},
    upsell::{SizeOrder, Upsell, compute_upsell},
    visibility::{
        BoosterRestrictions, ProductCategory, VisibilityDecision, VisibilityRules,
        apply_category_visibility_rules,
    },
};
