//! Add Cart Item Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use larder_app::domain::carts::{CartUpdate, validation::CartItemInput};

use crate::{
    carts::{errors::into_status_error, open_cart, responses::CartEnvelope},
    extensions::*,
    state::State,
};

/// Add Cart Item Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AddCartItemRequest {
    /// Product UUID; validated rather than parsed so the error is reported per field
    pub product_id: String,

    /// Between 1 and 1000
    pub quantity: i64,

    /// Up to 500 characters
    #[serde(default)]
    pub notes: Option<String>,
}

impl From<AddCartItemRequest> for CartItemInput {
    fn from(request: AddCartItemRequest) -> Self {
        CartItemInput {
            product_id: request.product_id,
            quantity: request.quantity,
            notes: request.notes,
        }
    }
}

/// Add Cart Item Handler
///
/// Adds a product to the cart, merging with an existing line for the same
/// product.
#[endpoint(
    tags("carts"),
    summary = "Add Item to Cart",
    responses(
        (status_code = StatusCode::OK, description = "Updated cart"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid item or missing session"),
        (status_code = StatusCode::NOT_FOUND, description = "Product not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<AddCartItemRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<CartEnvelope>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let mut store = open_cart(state, depot).await?;

    let update = state
        .app
        .carts
        .add_item_to_cart(&mut store, json.into_inner().into())
        .await
        .map_err(into_status_error)?;

    match update {
        CartUpdate::Applied { warnings } => {
            let totals = state.app.carts.cart_totals(store.cart());

            Ok(Json(CartEnvelope::cart(store.cart(), totals, &warnings)))
        }
        CartUpdate::Rejected(report) => {
            res.status_code(StatusCode::BAD_REQUEST);

            Ok(Json(CartEnvelope::invalid("Invalid cart item", &report)))
        }
    }
}
