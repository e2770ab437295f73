//! Cart submission contract
//!
//! Request and response shapes for the storefront cart endpoints, plus the guard that keeps the
//! add-to-cart control disabled while a request is in flight. Performing the HTTP calls is up to
//! the host.

use std::cell::{Cell, RefCell};

use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::{catalog::VariantId, properties::CartProperties};

/// Endpoint accepting new cart lines.
pub const CART_ADD_PATH: &str = "/cart/add.js";

/// Endpoint returning the cart summary.
pub const CART_PATH: &str = "/cart.js";

/// Message shown when a failed response carries no description.
pub const GENERIC_FAILURE: &str = "Add to cart failed";

/// Label on the control while a request is in flight.
pub const BUSY_LABEL: &str = "Adding…";

/// Label on the control after a failed request.
pub const RETRY_LABEL: &str = "Try again";

/// Errors from cart submission.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// The storefront refused the line.
    #[error("{message}")]
    Rejected {
        /// HTTP status
        status: u16,
        /// Shopper-facing description
        message: String,
    },

    /// A submission is already in flight.
    #[error("A cart submission is already in progress")]
    InFlight,
}

impl CartError {
    /// Interpret a non-success response body.
    ///
    /// Uses the `description` field, then `message`, then a generic text when the body is not
    /// readable JSON.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|body| body.description.or(body.message))
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| GENERIC_FAILURE.to_string());

        warn!(status, %message, "cart add rejected");

        CartError::Rejected { status, message }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    description: Option<String>,
    message: Option<String>,
}

/// Body of a cart-add request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartAddRequest {
    /// Variant to add
    pub id: VariantId,

    /// Number of drinks
    pub quantity: u32,

    /// Customisation properties
    pub properties: CartProperties,
}

impl CartAddRequest {
    /// JSON body.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if serialisation fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Form field pairs: `id`, `quantity`, then `properties[<Name>]` per property.
    pub fn form_fields(&self) -> Vec<(String, String)> {
        let mut fields = vec![
            ("id".to_string(), self.id.to_string()),
            ("quantity".to_string(), self.quantity.to_string()),
        ];

        fields.extend(
            self.properties
                .form_fields()
                .map(|(name, value)| (name, value.to_string())),
        );

        fields
    }

    /// `application/x-www-form-urlencoded` body.
    pub fn to_form_urlencoded(&self) -> String {
        self.form_fields()
            .iter()
            .map(|(name, value)| {
                format!(
                    "{}={}",
                    utf8_percent_encode(name, NON_ALPHANUMERIC),
                    utf8_percent_encode(value, NON_ALPHANUMERIC)
                )
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// The subset of the cart summary the widget needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CartSummary {
    /// Number of items in the cart
    pub item_count: u32,

    /// Cart total in minor units
    #[serde(default)]
    pub total_price: i64,
}

impl CartSummary {
    /// Parse a cart summary response.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if the body is not a cart summary.
    pub fn from_json(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body)
    }

    /// Text for the cart-count badge, `None` when the badge should be hidden.
    pub fn badge(&self) -> Option<String> {
        (self.item_count > 0).then(|| self.item_count.to_string())
    }
}

/// State of the add-to-cart control.
///
/// [`SubmitControl::begin`] disables the control and hands out a [`SubmitGuard`]; the control is
/// enabled again when the guard is dropped, whatever the outcome.
#[derive(Debug)]
pub struct SubmitControl {
    busy: Cell<bool>,
    idle_label: String,
    label: RefCell<String>,
}

impl SubmitControl {
    /// Create an enabled control.
    pub fn new(idle_label: impl Into<String>) -> Self {
        let idle_label = idle_label.into();

        Self {
            busy: Cell::new(false),
            label: RefCell::new(idle_label.clone()),
            idle_label,
        }
    }

    /// Whether the control is disabled.
    pub fn is_busy(&self) -> bool {
        self.busy.get()
    }

    /// Current label.
    pub fn label(&self) -> String {
        self.label.borrow().clone()
    }

    /// Disable the control for a submission.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InFlight`] if a submission is already running.
    pub fn begin(&self) -> Result<SubmitGuard<'_>, CartError> {
        if self.busy.replace(true) {
            return Err(CartError::InFlight);
        }

        *self.label.borrow_mut() = BUSY_LABEL.to_string();

        Ok(SubmitGuard {
            control: self,
            failed: false,
        })
    }
}

/// Keeps a [`SubmitControl`] disabled until dropped.
#[derive(Debug)]
pub struct SubmitGuard<'a> {
    control: &'a SubmitControl,
    failed: bool,
}

impl SubmitGuard<'_> {
    /// Record a failed submission; the control will offer a retry.
    pub fn fail(mut self) {
        self.failed = true;
    }
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        let label = if self.failed {
            RETRY_LABEL.to_string()
        } else {
            self.control.idle_label.clone()
        };

        *self.control.label.borrow_mut() = label;
        self.control.busy.set(false);
    }
}
