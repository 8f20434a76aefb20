//! Order Statistics Handler

use std::sync::Arc;

use salvo::prelude::*;
use uuid::Uuid;

use crate::{
    extensions::*,
    orders::{errors::into_status_error, responses::OrderStatsEnvelope},
    state::State,
};

/// Order Statistics Handler
///
/// Counts a restaurant's orders per status. Pass `restaurantId` as a query
/// parameter.
#[endpoint(
    tags("orders"),
    summary = "Order Statistics",
    responses(
        (status_code = StatusCode::OK, description = "Statistics"),
        (status_code = StatusCode::BAD_REQUEST, description = "Missing or malformed restaurantId"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<OrderStatsEnvelope>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let restaurant = req
        .query::<String>("restaurantId")
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| StatusError::bad_request().brief("restaurantId is required"))?
        .parse::<Uuid>()
        .map_err(|_ignored| StatusError::bad_request().brief("restaurantId must be a UUID"))?;

    let stats = state
        .app
        .orders
        .order_stats(restaurant.into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(OrderStatsEnvelope {
        success: true,
        data: stats.into(),
    }))
}
