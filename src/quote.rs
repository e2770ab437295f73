//! Quote

use std::io;

use rusty_money::{Money, iso::Currency};
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{pricing::PumpUsage, upsell::Upsell};

/// Errors that can occur when writing a quote.
#[derive(Debug, Error)]
pub enum QuoteError {
    /// Output could not be written
    #[error("Failed to write quote: {0}")]
    Io(#[from] io::Error),
}

/// Price breakdown for the current selection.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    /// Resolved variant title
    pub title: String,

    /// Variant price
    pub base: Money<'static, Currency>,

    /// Pump usage against the allowance
    pub usage: PumpUsage,

    /// Surcharges for priced add-ons
    pub modifiers: Money<'static, Currency>,

    /// Taken off the booster surcharges for a booster bundle
    pub bundle_discount: Money<'static, Currency>,

    /// Price of one drink
    pub unit_price: Money<'static, Currency>,

    /// Number of drinks
    pub quantity: u32,

    /// Line total
    pub total: Money<'static, Currency>,

    /// Next-size suggestion
    pub upsell: Option<Upsell>,
}

impl Quote {
    /// Write the breakdown as a table, followed by the upsell if there is one.
    ///
    /// # Errors
    ///
    /// Returns a [`QuoteError`] if writing to `out` fails.
    pub fn write_to(&self, out: &mut impl io::Write) -> Result<(), QuoteError> {
        let mut builder = Builder::default();

        builder.push_record(["", "Detail", "Amount"]);
        builder.push_record([
            "Base".to_string(),
            self.title.clone(),
            format!("{}", self.base),
        ]);

        builder.push_record([
            "Pumps".to_string(),
            format!(
                "{} of {} included, {} extra @ {}",
                self.usage.total, self.usage.included, self.usage.extra, self.usage.unit_price
            ),
            format!("{}", self.usage.extra_charge()),
        ]);

        if self.modifiers.to_minor_units() != 0 {
            builder.push_record([
                "Add-ons".to_string(),
                String::new(),
                format!("{}", self.modifiers),
            ]);
        }

        if self.bundle_discount.to_minor_units() != 0 {
            builder.push_record([
                "Bundle".to_string(),
                "Booster bundle discount".to_string(),
                format!("-{}", self.bundle_discount),
            ]);
        }

        if self.quantity > 1 {
            builder.push_record([
                "Quantity".to_string(),
                format!("{} × {}", self.quantity, self.unit_price),
                String::new(),
            ]);
        }

        builder.push_record(["Total".to_string(), String::new(), format!("{}", self.total)]);

        let mut table = builder.build();

        table.with(Style::modern_rounded());
        table.modify(Rows::first(), Color::BOLD);
        table.modify(Rows::last(), Color::BOLD);
        table.modify(Columns::new(2..3), Alignment::right());

        writeln!(out, "\n{table}")?;

        if let Some(upsell) = &self.upsell {
            writeln!(out, "{upsell}")?;
        }

        Ok(())
    }
}
