//! Order errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;
use tokio::task::JoinError;

use crate::domain::{orders::models::OrderUuid, profiles::models::Role};

#[derive(Debug, Error)]
pub enum AuthorizationError {
    #[error("order submission requires an authenticated user")]
    Anonymous,

    #[error("no profile for user")]
    UnknownProfile,

    #[error("role {0} may not create orders for this restaurant")]
    RoleNotPermitted(Role),
}

#[derive(Debug, Error)]
pub enum OrderCreationError {
    #[error("not authorized to create orders")]
    Unauthorized(#[from] AuthorizationError),

    #[error("invalid order request: {0}")]
    InvalidRequest(String),

    #[error("failed to resolve profile")]
    ProfileLookup(#[source] Error),

    #[error("failed to write order header")]
    HeaderWriteFailed(#[source] Error),

    /// Item insertion failed and the header was rolled back.
    #[error("failed to write order items")]
    ItemsWriteFailed(#[source] Error),

    /// Item insertion failed and so did the rollback: the header is persisted
    /// without items and needs operator attention.
    #[error("order {order} persisted without items after failed rollback")]
    Inconsistent {
        order: OrderUuid,
        #[source]
        cause: Error,
        rollback: Error,
    },

    #[error("order write task aborted")]
    Aborted(#[source] JoinError),
}

#[derive(Debug, Error)]
pub enum OrdersServiceError {
    #[error("order not found")]
    NotFound,

    #[error("related resource not found")]
    InvalidReference,

    #[error("invalid data")]
    InvalidData,

    #[error(transparent)]
    Creation(#[from] OrderCreationError),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for OrdersServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::CheckViolation | ErrorKind::NotNullViolation) => Self::InvalidData,
            Some(ErrorKind::UniqueViolation | ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}
