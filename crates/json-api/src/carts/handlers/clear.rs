//! Clear Cart Handler

use std::sync::Arc;

use salvo::prelude::*;
use tracing::info;

use crate::{
    carts::{open_cart, responses::CartEnvelope},
    extensions::*,
    state::State,
};

/// Clear Cart Handler
///
/// Empties the session's cart.
#[endpoint(
    tags("carts"),
    summary = "Clear Cart",
    responses(
        (status_code = StatusCode::OK, description = "Empty cart"),
        (status_code = StatusCode::BAD_REQUEST, description = "Missing session"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<CartEnvelope>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let mut store = open_cart(state, depot).await?;

    state.app.carts.clear_cart(&mut store).await;

    info!(cart.key = %store.key(), "cleared cart");

    let totals = state.app.carts.cart_totals(store.cart());

    Ok(Json(CartEnvelope::cart(store.cart(), totals, &[])))
}
