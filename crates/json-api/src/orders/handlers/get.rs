//! Get Order Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use tracing::error;
use uuid::Uuid;

use crate::{
    extensions::*,
    orders::{errors::into_status_error, responses::OrderTrackingEnvelope},
    state::State,
};

/// Get Order Handler
///
/// Returns the order, its lines and the delivery estimate.
#[endpoint(
    tags("orders"),
    summary = "Track Order",
    responses(
        (status_code = StatusCode::OK, description = "Order tracking view"),
        (status_code = StatusCode::BAD_REQUEST, description = "Malformed order id"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<OrderTrackingEnvelope>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let order = order.into_inner().into();

    state
        .app
        .orders
        .find_order_restaurant(order)
        .await
        .map_err(into_status_error)?
        .ok_or_else(|| StatusError::not_found().brief("Order not found"))?;

    let Some(tracking) = state
        .app
        .orders
        .track_order(order)
        .await
        .map_err(into_status_error)?
    else {
        error!(order_uuid = %order, "order has no presentable state");

        return Err(StatusError::internal_server_error());
    };

    Ok(Json(OrderTrackingEnvelope {
        success: true,
        data: tracking.into(),
    }))
}
