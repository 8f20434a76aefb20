//! Cancel Order Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use larder_app::domain::orders::CancellationOutcome;

use crate::{
    extensions::*,
    orders::{errors::into_status_error, responses::CancelOrderResponse},
    state::State,
};

/// Cancel Order Request
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub(crate) struct CancelOrderRequest {
    /// Why the order is being cancelled
    #[serde(default)]
    pub reason: Option<String>,
}

/// Cancel Order Handler
///
/// Cancels a pending or confirmed order. The JSON body `{"reason": ...}` is
/// optional.
#[endpoint(
    tags("orders"),
    summary = "Cancel Order",
    responses(
        (status_code = StatusCode::OK, description = "Order cancelled"),
        (status_code = StatusCode::BAD_REQUEST, description = "Order can no longer be cancelled"),
        (status_code = StatusCode::UNAUTHORIZED, description = "No signed-in user"),
        (status_code = StatusCode::FORBIDDEN, description = "Order belongs to another restaurant"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "orders.cancel",
    skip(order, req, depot, res),
    fields(order_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<CancelOrderResponse>, StatusError> {
    let order = order.into_inner();

    tracing::Span::current().record("order_uuid", tracing::field::display(order));

    let request = match req.parse_json::<CancelOrderRequest>().await {
        Ok(request) => request,
        Err(source) => {
            debug!("cancelling without a reason: {source}");

            CancelOrderRequest::default()
        }
    };

    let state = depot.obtain_or_500::<Arc<State>>()?;

    let outcome = state
        .app
        .orders
        .cancel_order(
            state.submission_config(depot.user_uuid()),
            order.into(),
            request.reason,
        )
        .await
        .map_err(into_status_error)?;

    match outcome {
        CancellationOutcome::Cancelled(order) => {
            info!(order_uuid = %order.uuid, "order cancelled");

            Ok(Json(CancelOrderResponse {
                success: true,
                data: Some(order.into()),
                message: None,
            }))
        }
        CancellationOutcome::Rejected(rejection) => {
            res.status_code(StatusCode::BAD_REQUEST);

            Ok(Json(CancelOrderResponse {
                success: false,
                data: None,
                message: Some(rejection.to_string()),
            }))
        }
    }
}
