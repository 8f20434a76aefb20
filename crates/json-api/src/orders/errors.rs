//! Errors

use salvo::http::StatusError;
use tracing::error;

use larder_app::domain::orders::{AuthorizationError, OrderCreationError, OrdersServiceError};

use crate::observability::{
    CompensationEvent, SubmissionResult, record_compensation, record_submission,
};

pub(crate) fn into_status_error(error: OrdersServiceError) -> StatusError {
    match error {
        OrdersServiceError::NotFound => StatusError::not_found().brief("Order not found"),
        OrdersServiceError::InvalidReference => {
            StatusError::bad_request().brief("Unknown restaurant or product")
        }
        OrdersServiceError::InvalidData => StatusError::bad_request().brief("Invalid order data"),
        OrdersServiceError::Creation(error) => creation_status_error(error),
        OrdersServiceError::Sql(source) => {
            error!("order storage failure: {source}");

            StatusError::internal_server_error()
        }
    }
}

fn creation_status_error(error: OrderCreationError) -> StatusError {
    match error {
        OrderCreationError::Unauthorized(AuthorizationError::Anonymous) => {
            StatusError::unauthorized().brief("Sign in to place orders")
        }
        OrderCreationError::Unauthorized(reason) => {
            StatusError::forbidden().brief(reason.to_string())
        }
        OrderCreationError::InvalidRequest(message) => StatusError::bad_request().brief(message),
        OrderCreationError::Inconsistent {
            order,
            cause,
            rollback,
        } => {
            error!(
                order_uuid = %order,
                %cause,
                %rollback,
                "order header left without items"
            );

            StatusError::internal_server_error()
        }
        error @ (OrderCreationError::ProfileLookup(_)
        | OrderCreationError::HeaderWriteFailed(_)
        | OrderCreationError::ItemsWriteFailed(_)
        | OrderCreationError::Aborted(_)) => {
            error!("failed to create order: {error}");

            StatusError::internal_server_error()
        }
    }
}

/// Count a failed submission, and any rollback it triggered.
pub(crate) fn record_failure(channel: &str, error: &OrdersServiceError) {
    let result = match error {
        OrdersServiceError::Creation(OrderCreationError::Unauthorized(_)) => {
            SubmissionResult::Unauthorized
        }
        OrdersServiceError::Creation(OrderCreationError::InvalidRequest(_))
        | OrdersServiceError::InvalidReference
        | OrdersServiceError::InvalidData => SubmissionResult::Rejected,
        _ => SubmissionResult::Failed,
    };

    record_submission(channel, result);

    match error {
        OrdersServiceError::Creation(OrderCreationError::ItemsWriteFailed(_)) => {
            record_compensation(CompensationEvent::Compensated);
        }
        OrdersServiceError::Creation(OrderCreationError::Inconsistent { .. }) => {
            record_compensation(CompensationEvent::Inconsistent);
        }
        _ => {}
    }
}
