//! Remove Cart Item Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    carts::{errors::into_status_error, open_cart, responses::CartEnvelope},
    extensions::*,
    state::State,
};

/// Remove Cart Item Handler
///
/// Removing an item that is not in the cart leaves the cart unchanged.
#[endpoint(
    tags("carts"),
    summary = "Remove Cart Item",
    responses(
        (status_code = StatusCode::OK, description = "Updated cart"),
        (status_code = StatusCode::BAD_REQUEST, description = "Malformed product id or missing session"),
    ),
)]
pub(crate) async fn handler(
    product: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<CartEnvelope>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let mut store = open_cart(state, depot).await?;

    state
        .app
        .carts
        .remove_item_from_cart(&mut store, product.into_inner().into())
        .await
        .map_err(into_status_error)?;

    let totals = state.app.carts.cart_totals(store.cart());

    Ok(Json(CartEnvelope::cart(store.cart(), totals, &[])))
}
