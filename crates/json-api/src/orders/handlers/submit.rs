//! Submit Order Handler

use std::sync::Arc;

use jiff::Timestamp;
use rust_decimal::Decimal;
use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use larder_app::domain::orders::{
    SubmissionOutcome,
    models::{OrderLineInput, OrderPriority, OrderSubmissionInput},
};

use crate::{
    extensions::*,
    observability::{SubmissionResult, record_submission},
    orders::{
        errors::{into_status_error, record_failure},
        responses::SubmitOrderResponse,
    },
    state::State,
};

pub(crate) const CHANNEL: &str = "direct";

/// Order line request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderLineRequest {
    pub product_id: Uuid,
    pub quantity: i64,

    /// Agreed unit price; the catalog price is used when omitted
    #[serde(default)]
    #[salvo(schema(value_type = Option<String>))]
    pub unit_price: Option<Decimal>,
}

/// Submit Order Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubmitOrderRequest {
    #[serde(default)]
    pub restaurant_id: Option<Uuid>,

    #[serde(default)]
    pub items: Vec<OrderLineRequest>,

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

impl From<SubmitOrderRequest> for OrderSubmissionInput {
    fn from(request: SubmitOrderRequest) -> Self {
        OrderSubmissionInput {
            restaurant_uuid: request.restaurant_id.map(Into::into),
            items: request
                .items
                .into_iter()
                .map(|line| OrderLineInput {
                    product_uuid: line.product_id.into(),
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                })
                .collect(),
            delivery_address: request.delivery_address,
            contact_phone: request.contact_phone,
            special_instructions: request.special_instructions,
            priority: request.priority,
            requested_delivery_time: request.requested_delivery_time,
        }
    }
}

/// Submit Order Handler
///
/// Admits the order against the ordering policy and creates it.
#[endpoint(
    tags("orders"),
    summary = "Submit Order",
    responses(
        (status_code = StatusCode::OK, description = "Order created"),
        (status_code = StatusCode::BAD_REQUEST, description = "Rejected by validation or policy"),
        (status_code = StatusCode::UNAUTHORIZED, description = "No signed-in user"),
        (status_code = StatusCode::FORBIDDEN, description = "Role may not order for this restaurant"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "orders.submit",
    skip(json, depot, res),
    fields(user_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<SubmitOrderRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<SubmitOrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_uuid();

    if let Some(user) = user {
        tracing::Span::current().record("user_uuid", tracing::field::display(user));
    }

    let outcome = state
        .app
        .orders
        .submit_order(state.submission_config(user), json.into_inner().into())
        .await
        .map_err(|error| {
            record_failure(CHANNEL, &error);

            into_status_error(error)
        })?;

    match outcome {
        SubmissionOutcome::Submitted { order, quote } => {
            record_submission(CHANNEL, SubmissionResult::Submitted);
            info!(order_uuid = %order.uuid, status = %order.status, "order submitted");

            Ok(Json(SubmitOrderResponse::submitted(order, quote)))
        }
        SubmissionOutcome::Rejected(rejection) => {
            record_submission(CHANNEL, SubmissionResult::Rejected);
            info!(%rejection, "order submission rejected");

            res.status_code(StatusCode::BAD_REQUEST);

            Ok(Json(SubmitOrderResponse::rejected(rejection.to_string())))
        }
    }
}
