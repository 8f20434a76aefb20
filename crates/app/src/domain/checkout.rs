//! Checkout
//!
//! Joins the cart and the order pipeline: validate the cart, submit it as an
//! order, and only then retire it.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::Arc,
};

use jiff::Timestamp;
use serde::Deserialize;

use crate::domain::{
    carts::{CartService, CartStore, models::Cart, validation::ValidationReport},
    orders::{
        OrdersService, OrdersServiceError, SubmissionConfig, SubmissionOutcome,
        SubmissionRejection,
        models::{Order, OrderLineInput, OrderPriority, OrderSubmissionInput},
    },
    pricing::OrderTotals,
    profiles::models::RestaurantUuid,
};

/// Delivery details supplied at checkout; the lines come from the cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutDetails {
    #[serde(rename = "restaurantId", default)]
    pub restaurant_uuid: Option<RestaurantUuid>,
    #[serde(default)]
    pub delivery_address: Option<String>,
    #[serde(default)]
    pub contact_phone: String,
    #[serde(default)]
    pub special_instructions: Option<String>,
    #[serde(default)]
    pub priority: OrderPriority,
    #[serde(default)]
    pub requested_delivery_time: Option<Timestamp>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    Submitted { order: Order, quote: OrderTotals },
    Invalid(ValidationReport),
    Rejected(SubmissionRejection),
}

/// Lines priced at the snapshot taken when each item was added.
#[must_use]
pub fn submission_from_cart(cart: &Cart, details: CheckoutDetails) -> OrderSubmissionInput {
    OrderSubmissionInput {
        restaurant_uuid: details.restaurant_uuid,
        items: cart
            .items()
            .iter()
            .map(|item| OrderLineInput {
                product_uuid: item.product_uuid,
                quantity: i64::from(item.quantity),
                unit_price: Some(item.unit_price),
            })
            .collect(),
        delivery_address: details.delivery_address,
        contact_phone: details.contact_phone,
        special_instructions: details.special_instructions,
        priority: details.priority,
        requested_delivery_time: details.requested_delivery_time,
    }
}

pub struct CheckoutService {
    carts: Arc<CartService>,
    orders: Arc<dyn OrdersService>,
}

impl Debug for CheckoutService {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("CheckoutService")
            .field("carts", &self.carts)
            .finish_non_exhaustive()
    }
}

impl CheckoutService {
    #[must_use]
    pub fn new(carts: Arc<CartService>, orders: Arc<dyn OrdersService>) -> Self {
        Self { carts, orders }
    }

    /// Anything short of a submitted order leaves the cart untouched.
    pub async fn checkout(
        &self,
        store: &mut CartStore,
        config: SubmissionConfig,
        details: CheckoutDetails,
    ) -> Result<CheckoutOutcome, OrdersServiceError> {
        let report = self.carts.validate_cart_for_checkout(store.cart());

        if !report.is_valid() {
            return Ok(CheckoutOutcome::Invalid(report));
        }

        let input = submission_from_cart(store.cart(), details);

        match self.orders.submit_order(config, input).await? {
            SubmissionOutcome::Submitted { order, quote } => {
                store.mark_submitted().await;
                self.carts.clear_mirror(store.owner()).await;

                Ok(CheckoutOutcome::Submitted { order, quote })
            }
            SubmissionOutcome::Rejected(rejection) => Ok(CheckoutOutcome::Rejected(rejection)),
        }
    }
}
