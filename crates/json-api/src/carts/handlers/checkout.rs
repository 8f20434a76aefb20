//! Checkout Cart Handler

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use larder_app::domain::{
    checkout::{CheckoutDetails, CheckoutOutcome},
    orders::models::OrderPriority,
};

use crate::{
    carts::{open_cart, responses::CheckoutResponse},
    extensions::*,
    observability::{SubmissionResult, record_submission},
    orders::errors::{into_status_error, record_failure},
    responses::issues,
    state::State,
};

const CHANNEL: &str = "checkout";

/// Checkout Request
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CheckoutRequest {
    #[serde(default)]
    pub restaurant_id: Option<Uuid>,

    #[serde(default)]
    pub delivery_address: Option<String>,

    #[serde(default)]
    pub contact_phone: String,

    #[serde(default)]
    pub special_instructions: Option<String>,

    /// `normal` (default) or `urgent`
    #[serde(default)]
    #[salvo(schema(value_type = Option<String>))]
    pub priority: OrderPriority,

    /// RFC 3339 timestamp; must be in the future
    #[serde(default)]
    #[salvo(schema(value_type = Option<String>))]
    pub requested_delivery_time: Option<Timestamp>,
}

impl From<CheckoutRequest> for CheckoutDetails {
    fn from(request: CheckoutRequest) -> Self {
        CheckoutDetails {
            restaurant_uuid: request.restaurant_id.map(Into::into),
            delivery_address: request.delivery_address,
            contact_phone: request.contact_phone,
            special_instructions: request.special_instructions,
            priority: request.priority,
            requested_delivery_time: request.requested_delivery_time,
        }
    }
}

/// Checkout Cart Handler
///
/// Submits the session's cart as an order. The cart is only retired once the
/// order exists.
#[endpoint(
    tags("carts"),
    summary = "Checkout Cart",
    responses(
        (status_code = StatusCode::OK, description = "Order created from cart"),
        (status_code = StatusCode::BAD_REQUEST, description = "Cart invalid or order rejected"),
        (status_code = StatusCode::UNAUTHORIZED, description = "No signed-in user"),
        (status_code = StatusCode::FORBIDDEN, description = "Role may not order for this restaurant"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(name = "carts.checkout", skip_all, err)]
pub(crate) async fn handler(
    json: JsonBody<CheckoutRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<CheckoutResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let mut store = open_cart(state, depot).await?;

    let outcome = state
        .app
        .checkout
        .checkout(
            &mut store,
            state.submission_config(depot.user_uuid()),
            json.into_inner().into(),
        )
        .await
        .map_err(|error| {
            record_failure(CHANNEL, &error);

            into_status_error(error)
        })?;

    match outcome {
        CheckoutOutcome::Submitted { order, quote } => {
            record_submission(CHANNEL, SubmissionResult::Submitted);
            info!(order_uuid = %order.uuid, cart.key = %store.key(), "cart checked out");

            Ok(Json(CheckoutResponse::submitted(order, quote)))
        }
        CheckoutOutcome::Invalid(report) => {
            record_submission(CHANNEL, SubmissionResult::Rejected);
            res.status_code(StatusCode::BAD_REQUEST);

            Ok(Json(CheckoutResponse::failed(
                "Cart is not ready for checkout".to_owned(),
                issues(&report.errors),
            )))
        }
        CheckoutOutcome::Rejected(rejection) => {
            record_submission(CHANNEL, SubmissionResult::Rejected);
            res.status_code(StatusCode::BAD_REQUEST);

            Ok(Json(CheckoutResponse::failed(rejection.to_string(), Vec::new())))
        }
    }
}
