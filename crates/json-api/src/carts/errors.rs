//! Errors

use salvo::http::StatusError;
use tracing::error;

use larder_app::domain::carts::CartsServiceError;

pub(crate) fn into_status_error(error: CartsServiceError) -> StatusError {
    match error {
        CartsServiceError::ProductNotFound => StatusError::not_found().brief("Product not found"),
        CartsServiceError::ItemNotFound => {
            StatusError::not_found().brief("Product is not in the cart")
        }
        CartsServiceError::Sql(source) => {
            error!("failed to load product for cart: {source}");

            StatusError::internal_server_error()
        }
    }
}
