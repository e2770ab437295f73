//! Barista
//!
//! Barista is the pricing core of a drink-builder product widget: it resolves a shopper's
//! size/strain/flavor selection to a catalog variant, prices metered flavor pumps, suggests the
//! next size up, decides which pickers a product category shows, and flattens the selection into
//! cart line-item properties.

pub mod allowance;
pub mod cart;
pub mod catalog;
pub mod fixtures;
pub mod labels;
pub mod prelude;
pub mod pricing;
pub mod properties;
pub mod quote;
pub mod resolver;
pub mod selection;
pub mod upsell;
pub mod utils;
pub mod visibility;
