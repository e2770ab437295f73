//! Integration tests for the storefront boundary: product JSON in, cart request out.

use rusty_money::iso::USD;
use testresult::TestResult;

use barista::{
    cart::{CartError, CartSummary, SubmitControl},
    catalog::{VariantId, product_json::ProductJson},
    properties::names,
    resolver::{ResolverConfig, VariantPricingResolver},
    visibility::{ProductCategory, STAFF_NOTE},
};

const KAVA_SHELL: &str = r#"{
    "id": 7001,
    "handle": "kava-shell",
    "title": "Kava Shell",
    "options": [
        {"name": "Size", "position": 1, "values": ["Medium", "Large", "Gallon"]}
    ],
    "variants": [
        {"id": 501, "title": "Medium", "price": 800, "option1": "Medium", "option2": null, "option3": null, "available": true},
        {"id": 502, "title": "Large", "price": "12.00", "option1": "Large", "option2": null, "option3": null},
        {"id": 503, "title": "Gallon", "price": 35.5, "option1": "Gallon", "option2": null, "option3": null, "available": false}
    ],
    "variantMap": {"Jug": 503}
}"#;

#[test]
fn product_payload_drives_a_widget() -> TestResult {
    let product = ProductJson::from_json(KAVA_SHELL)?;
    let category = product.category();

    assert_eq!(category, ProductCategory::Kava);

    let catalog = product.into_catalog(USD);
    let mut resolver =
        VariantPricingResolver::new(&catalog, ResolverConfig::new(USD).with_category(category));

    resolver.select_size("large");
    resolver.update(|selection| -> TestResult {
        selection.set_pumps("Coconut", 7)?;
        selection.toggle_creamer("Oat Milk");

        Ok(())
    })?;

    assert_eq!(resolver.variant_id(), Some(VariantId::new(502)));
    assert_eq!(resolver.formatted_price(), "$12.50");
    assert_eq!(resolver.upsell_message(), "Upgrade to Gallon for $23.50 more");

    let request = resolver.cart_request()?;
    let json: serde_json::Value = serde_json::from_str(&request.to_json()?)?;

    assert_eq!(json["id"], 502);
    assert_eq!(json["properties"][names::CREAMERS], "Oat Milk");
    assert_eq!(json["properties"][names::FLAVORS], "Coconut (7 pumps)");
    assert!(json["properties"].get(names::STRAIN).is_none());
    assert!(json["properties"].get(names::POTENCY).is_none());

    Ok(())
}

#[test]
fn sold_out_bulk_size_still_resolves() -> TestResult {
    let product = ProductJson::from_json(KAVA_SHELL)?;
    let category = product.category();
    let catalog = product.into_catalog(USD);
    let mut resolver =
        VariantPricingResolver::new(&catalog, ResolverConfig::new(USD).with_category(category));

    resolver.select_size("Gallon");

    assert_eq!(resolver.variant_id(), Some(VariantId::new(503)));
    assert_eq!(resolver.formatted_price(), "$35.50");
    assert!(resolver.upsell().is_none());

    let request = resolver.cart_request()?;

    assert_eq!(request.properties.get(names::GALLON_NOTE), Some(STAFF_NOTE));
    assert_eq!(
        catalog.variant_for_size("jug").map(|variant| variant.id),
        Some(VariantId::new(503))
    );

    Ok(())
}

#[test]
fn rejected_submission_offers_retry_and_keeps_selection() -> TestResult {
    let catalog = ProductJson::from_json(KAVA_SHELL)?.into_catalog(USD);
    let mut resolver = VariantPricingResolver::new(&catalog, ResolverConfig::new(USD));
    let control = SubmitControl::new("Add to cart");

    resolver.select_size("Medium");
    resolver.update(|selection| selection.set_pumps("Vanilla", 2))?;

    let guard = control.begin()?;
    let request = resolver.cart_request()?;

    assert_eq!(request.id, VariantId::new(501));

    let error = CartError::from_response(
        422,
        r#"{"status": 422, "description": "The product 'Kava Shell' is already sold out."}"#,
    );

    guard.fail();

    assert_eq!(
        error.to_string(),
        "The product 'Kava Shell' is already sold out."
    );
    assert_eq!(control.label(), "Try again");
    assert!(!control.is_busy());
    assert_eq!(resolver.selection().total_pumps(), 2);

    Ok(())
}

#[test]
fn accepted_submission_resets_and_updates_badge() -> TestResult {
    let catalog = ProductJson::from_json(KAVA_SHELL)?.into_catalog(USD);
    let mut resolver = VariantPricingResolver::new(&catalog, ResolverConfig::new(USD));
    let control = SubmitControl::new("Add to cart");

    resolver.select_size("Medium");
    resolver.update(|selection| -> TestResult {
        selection.set_pumps("Vanilla", 2)?;
        selection.set_quantity(2);

        Ok(())
    })?;

    {
        let _guard = control.begin()?;

        resolver.cart_request()?;
        resolver.submitted();
    }

    let summary = CartSummary::from_json(r#"{"item_count": 2, "total_price": 1600}"#)?;

    assert_eq!(summary.badge().as_deref(), Some("2"));
    assert_eq!(control.label(), "Add to cart");
    assert_eq!(resolver.selection().total_pumps(), 0);
    assert_eq!(resolver.selection().quantity(), 1);
    assert_eq!(resolver.size(), "Medium");

    Ok(())
}
