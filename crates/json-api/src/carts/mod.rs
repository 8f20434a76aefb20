//! Carts

use salvo::prelude::{Depot, StatusError};

use larder_app::domain::carts::CartStore;

use crate::{extensions::*, state::State};

pub(crate) mod errors;
pub(crate) mod handlers;
pub(crate) mod items;
pub(crate) mod responses;

pub(crate) use handlers::*;

/// The calling session's cart.
pub(crate) async fn open_cart(state: &State, depot: &Depot) -> Result<CartStore, StatusError> {
    let session = depot.session_id_or_400()?;

    Ok(state.app.cart_sessions.open(session, depot.cart_owner()).await)
}
