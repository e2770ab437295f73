//! Integration tests driving the resolver from the fixture sets.
//!
//! The `kratom` set prices Small at $7.00, Medium at $9.00, Large at $13.00 and Gallon at
//! $40.00, with 4/6/12 included pumps at Medium/Large/Gallon and $0.50 per extra pump. Strains
//! are a line property rather than a variant option; the set requires one and prices the
//! "Energy Shot" booster at $2.50. It also prices the Energy Boost, Focus Blend and Immunity
//! Support boosters at $2.00, $2.50 and $3.00 and "Premium Ice" at $0.50, takes 15% off a bundle
//! of three boosters, and withholds Protein Shot and CBD Calm from a Small.
//!
//! The `delta9` set (Medium $11.00, Large $15.00, Gallon $55.00) requires a flavor.

use rusty_money::{Money, iso::USD};
use testresult::TestResult;

use barista::{
    catalog::VariantId,
    fixtures::Fixture,
    pricing::compute_price,
    properties::names,
    resolver::{ReadinessError, resolve_variant},
    selection::{FlavorCategory, FlavorPour, Selection},
    visibility::STAFF_NOTE,
};

#[test]
fn medium_with_six_pumps_costs_ten_dollars_and_upsells_large() -> TestResult {
    let fixture = Fixture::from_set("kratom")?;
    let mut resolver = fixture.resolver()?;

    resolver.select_size("Medium");
    resolver.update(|selection| -> TestResult {
        selection.add_strain("Green Maeng Da");
        selection.set_pumps("Vanilla", 3)?;
        selection.set_pumps("Caramel", 3)?;

        Ok(())
    })?;

    assert_eq!(resolver.variant_id(), Some(VariantId::new(41002)));
    assert_eq!(resolver.price(), Some(Money::from_minor(1000, USD)));
    assert_eq!(resolver.formatted_price(), "$10.00");
    assert_eq!(resolver.upsell_message(), "Upgrade to Large for $4.00 more");

    let usage = resolver.pump_usage();

    assert_eq!((usage.total, usage.included, usage.extra), (6, 4, 2));

    let request = resolver.cart_request()?;

    assert_eq!(request.id, VariantId::new(41002));
    assert_eq!(request.quantity, 1);
    assert_eq!(request.properties.get(names::SIZE), Some("Medium"));
    assert_eq!(request.properties.get(names::STRAIN), Some("Green Maeng Da"));
    assert_eq!(
        request.properties.get(names::FLAVORS),
        Some("Vanilla (3 pumps), Caramel (3 pumps)")
    );
    assert_eq!(
        request.properties.get(names::PUMP_USAGE),
        Some("Total pumps: 6 (Included 4, Extra 2 @ $0.50 each)")
    );
    assert!(!request.properties.contains_key(names::GALLON_NOTE));

    Ok(())
}

#[test]
fn every_variant_is_reachable_by_its_options() -> TestResult {
    let fixture = Fixture::from_set("kratom")?;
    let catalog = fixture.catalog()?;

    for variant in catalog.variants() {
        let mut selection = Selection::new();

        for (name, value) in catalog.option_names().iter().zip(&variant.options) {
            selection.set_option(name, value.as_str());
        }

        let resolved = resolve_variant(&selection, catalog).ok_or("no variant resolved")?;

        assert_eq!(resolved.options, variant.options, "{}", variant.title);
    }

    Ok(())
}

#[test]
fn unset_selection_resolves_first_variant() -> TestResult {
    let fixture = Fixture::from_set("kratom")?;
    let resolver = fixture.resolver()?;

    assert_eq!(resolver.variant_id(), Some(VariantId::new(41001)));
    assert_eq!(resolver.size(), "Small");
    assert_eq!(resolver.upsell_message(), "Upgrade to Medium for $2.00 more");

    Ok(())
}

#[test]
fn price_never_drops_as_pumps_increase() -> TestResult {
    let fixture = Fixture::from_set("kratom")?;
    let catalog = fixture.catalog()?;
    let config = fixture.config()?;
    let large = catalog.variant_for_size("Large").ok_or("no large")?;

    let mut previous = large.price;

    for pumps in 0..=20 {
        let pours = [FlavorPour {
            name: "Vanilla".to_string(),
            pumps,
            category: FlavorCategory::Regular,
        }];

        let price = compute_price(
            large,
            "Large",
            &pours,
            &config.allowance,
            config.extra_pump_price,
        );

        if pumps <= 6 {
            assert_eq!(price, large.price, "{pumps} pumps");
        }

        assert!(price.to_minor_units() >= previous.to_minor_units(), "{pumps} pumps");

        previous = price;
    }

    Ok(())
}

#[test]
fn largest_size_has_no_upsell() -> TestResult {
    let fixture = Fixture::from_set("kratom")?;
    let mut resolver = fixture.resolver()?;

    resolver.select_size("Gallon");

    assert!(resolver.upsell().is_none());
    assert_eq!(resolver.upsell_message(), "");

    Ok(())
}

#[test]
fn kratom_gallon_hands_flavors_to_staff() -> TestResult {
    let fixture = Fixture::from_set("kratom")?;
    let mut resolver = fixture.resolver()?;

    resolver.select_size("Medium");
    resolver.update(|selection| selection.set_pumps("Vanilla", 8))?;
    resolver.select_size("Gallon");

    let visibility = resolver.visibility();

    assert!(!visibility.show_flavor_picker);
    assert!(!visibility.show_potency_picker);
    assert!(visibility.show_staff_note);
    assert_eq!(resolver.selection().total_pumps(), 0);
    assert_eq!(resolver.formatted_price(), "$40.00");

    assert_eq!(resolver.check_ready(), Err(ReadinessError::MissingStrain));

    resolver.update(|selection| selection.add_strain("Red Bali"));

    let request = resolver.cart_request()?;

    assert_eq!(request.id, VariantId::new(41004));
    assert_eq!(request.properties.get(names::STRAIN), Some("Red Bali"));
    assert_eq!(request.properties.get(names::GALLON_NOTE), Some(STAFF_NOTE));
    assert!(!request.properties.contains_key(names::FLAVORS));
    assert!(!request.properties.contains_key(names::PUMP_USAGE));

    Ok(())
}

#[test]
fn delta9_gallon_keeps_flavors_and_potency() -> TestResult {
    let fixture = Fixture::from_set("delta9")?;
    let mut resolver = fixture.resolver()?;

    resolver.select_size("Medium");

    assert_eq!(resolver.check_ready(), Err(ReadinessError::MissingFlavor));

    resolver.select_size("Gallon");

    assert!(resolver.visibility().show_flavor_picker);
    assert_eq!(resolver.check_ready(), Ok(()));

    resolver.update(|selection| -> TestResult {
        selection.set_pumps("Mango", 10)?;
        selection.set_pumps("Lime", 4)?;
        selection.set_potency(Some("10mg".to_string()));

        Ok(())
    })?;

    let visibility = resolver.visibility();

    assert!(visibility.show_flavor_picker);
    assert!(visibility.show_potency_picker);
    assert!(!visibility.show_staff_note);
    assert_eq!(resolver.formatted_price(), "$56.00");

    let request = resolver.cart_request()?;

    assert_eq!(request.properties.get(names::POTENCY), Some("10mg"));
    assert_eq!(
        request.properties.get(names::FLAVORS),
        Some("Mango (10 pumps), Lime (4 pumps)")
    );
    assert!(!request.properties.contains_key(names::STRAIN));

    Ok(())
}

#[test]
fn size_pins_are_used_for_size_lookups() -> TestResult {
    let fixture = Fixture::from_set("delta9")?;
    let catalog = fixture.catalog()?;

    assert_eq!(
        catalog.variant_for_size("growler").map(|variant| variant.id),
        Some(VariantId::new(9103))
    );

    Ok(())
}

#[test]
fn priced_boosters_and_quantity_flow_into_the_total() -> TestResult {
    let fixture = Fixture::from_set("kratom")?;
    let mut resolver = fixture.resolver()?;

    resolver.select_size("Medium");
    resolver.update(|selection| -> TestResult {
        selection.add_strain("Red Bali");
        selection.set_pumps("Vanilla", 6)?;
        selection.toggle_booster("Energy Shot")?;
        selection.set_quantity_input("2");
        selection.set_comments("Light ice");

        Ok(())
    })?;

    let quote = resolver.quote().ok_or("no quote")?;

    assert_eq!(quote.base, Money::from_minor(900, USD));
    assert_eq!(quote.modifiers, Money::from_minor(250, USD));
    assert_eq!(quote.unit_price, Money::from_minor(1250, USD));
    assert_eq!(quote.total, Money::from_minor(2500, USD));

    let request = resolver.cart_request()?;

    assert_eq!(request.quantity, 2);
    assert_eq!(request.properties.get(names::BOOSTERS), Some("Energy Shot"));
    assert_eq!(request.properties.get(names::COMMENTS), Some("Light ice"));

    let body = request.to_form_urlencoded();

    assert!(body.starts_with("id=41002&quantity=2&"), "{body}");
    assert!(body.contains("properties%5BComments%5D=Light%20ice"), "{body}");

    Ok(())
}

#[test]
fn widgets_sharing_a_catalog_keep_separate_selections() -> TestResult {
    let fixture = Fixture::from_set("kratom")?;
    let mut first = fixture.resolver()?;
    let mut second = fixture.resolver()?;

    first.select_size("Large");
    second.select_size("Small");
    second.update(|selection| selection.set_pumps("Hazelnut", 2))?;

    assert_eq!(first.formatted_price(), "$13.00");
    assert_eq!(first.selection().total_pumps(), 0);
    assert_eq!(second.formatted_price(), "$8.00");

    Ok(())
}

#[test]
fn submission_resets_customisation_but_keeps_size() -> TestResult {
    let fixture = Fixture::from_set("kratom")?;
    let mut resolver = fixture.resolver()?;

    resolver.select_size("Large");
    resolver.update(|selection| -> TestResult {
        selection.add_strain("Green Maeng Da");
        selection.set_pumps("Vanilla", 9)?;
        selection.toggle_booster("Energy Shot")?;
        selection.set_quantity(3);

        Ok(())
    })?;

    assert_eq!(resolver.formatted_price(), "$51.00");

    resolver.submitted();

    assert_eq!(resolver.size(), "Large");
    assert_eq!(resolver.selection().quantity(), 1);
    assert!(resolver.selection().boosters().is_empty());
    assert_eq!(resolver.formatted_price(), "$13.00");

    Ok(())
}

#[test]
fn small_kratom_with_premium_ice_and_a_booster_bundle() -> TestResult {
    let fixture = Fixture::from_set("kratom")?;
    let mut resolver = fixture.resolver()?;

    resolver.select_size("Medium");
    resolver.toggle_booster("CBD Calm")?;
    resolver.update(|selection| {
        selection.add_strain("White Borneo");
        selection.set_option(names::ICE, "Premium Ice");
        selection.set_option(names::SWEETNESS, "Light");
    });
    resolver.select_size("Small");

    assert!(resolver.selection().boosters().is_empty());
    assert!(resolver.toggle_booster("Protein Shot").is_err());

    for booster in ["Energy Boost", "Focus Blend", "Immunity Support"] {
        resolver.toggle_booster(booster)?;
    }

    let quote = resolver.quote().ok_or("no quote")?;

    assert_eq!(quote.base, Money::from_minor(700, USD));
    assert_eq!(quote.modifiers, Money::from_minor(800, USD));
    assert_eq!(quote.bundle_discount, Money::from_minor(113, USD));
    assert_eq!(resolver.formatted_price(), "$13.87");

    let request = resolver.cart_request()?;

    assert_eq!(request.id, VariantId::new(41001));
    assert_eq!(request.properties.get(names::SIZE), Some("Small"));
    assert_eq!(request.properties.get(names::ICE), Some("Premium Ice"));
    assert_eq!(request.properties.get(names::SWEETNESS), Some("Light"));
    assert_eq!(
        request.properties.get(names::BOOSTERS),
        Some("Energy Boost, Focus Blend, Immunity Support")
    );

    Ok(())
}
