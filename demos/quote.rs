//! Quote Example
//!
//! This example prices a drink from a fixture set and prints the breakdown.
//!
//! Use `-f` to load a fixture set by name
//! Use `-s` to pick a size and `--flavor NAME=PUMPS` (repeatable) to add flavor pours
//! Use `-b` to add a booster, `--ice` to choose an ice level and `-q` to set the quantity

use std::io;

use anyhow::Result;

use barista::{
    fixtures::Fixture,
    properties::names,
    utils::{ExampleQuoteArgs, init_tracing},
};
use clap::Parser;

/// Quote Example
#[expect(clippy::print_stdout, reason = "Example code")]
pub fn main() -> Result<()> {
    let args = ExampleQuoteArgs::parse();

    init_tracing(&args.log_level)?;

    let fixture = Fixture::from_set(&args.fixture)?;
    let mut resolver = fixture.resolver()?;

    if let Some(size) = &args.size {
        resolver.select_size(size);
    }

    resolver.update(|selection| -> Result<()> {
        if let Some(strain) = &args.strain {
            selection.add_strain(strain);
        }

        for (flavor, pumps) in &args.flavors {
            selection.set_pumps(flavor, *pumps)?;
        }

        if let Some(ice) = &args.ice {
            selection.set_option(names::ICE, ice.as_str());
        }

        selection.set_quantity(args.quantity);

        Ok(())
    })?;

    for booster in &args.boosters {
        resolver.toggle_booster(booster)?;
    }

    let Some(quote) = resolver.quote() else {
        println!("{}", resolver.formatted_price());
        return Ok(());
    };

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    quote.write_to(&mut handle)?;

    match resolver.cart_request() {
        Ok(request) => println!("\nCart request: {}", request.to_json()?),
        Err(err) => println!("\nNot ready: {err}"),
    }

    Ok(())
}
