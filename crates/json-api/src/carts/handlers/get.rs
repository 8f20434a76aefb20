//! Get Cart Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    carts::{open_cart, responses::CartEnvelope},
    extensions::*,
    state::State,
};

/// Get Cart Handler
///
/// Returns the session's cart. Expired carts come back empty.
#[endpoint(
    tags("carts"),
    summary = "Get Cart",
    responses(
        (status_code = StatusCode::OK, description = "Current cart"),
        (status_code = StatusCode::BAD_REQUEST, description = "Missing session"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<CartEnvelope>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let store = open_cart(state, depot).await?;

    let totals = state.app.carts.cart_totals(store.cart());

    Ok(Json(CartEnvelope::cart(store.cart(), totals, &[])))
}
