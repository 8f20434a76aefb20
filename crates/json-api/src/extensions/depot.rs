//! Depot helper extensions.

use std::any::Any;

use larder_app::domain::{carts::models::CartOwner, profiles::models::UserUuid};
use salvo::prelude::{Depot, StatusError};

const REQUEST_ID_KEY: &str = "request_id";
const SESSION_ID_KEY: &str = "session_id";
const USER_UUID_KEY: &str = "user_uuid";

/// Typed access to per-request values stored in the depot.
pub(crate) trait DepotExt {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError>;

    fn insert_request_id(&mut self, request_id: String);

    fn request_id(&self) -> Option<&str>;

    fn insert_session_id(&mut self, session: String);

    /// Cart routes are keyed by the browsing session.
    fn session_id_or_400(&self) -> Result<&str, StatusError>;

    fn insert_user_uuid(&mut self, user: UserUuid);

    fn user_uuid(&self) -> Option<UserUuid>;

    fn cart_owner(&self) -> CartOwner {
        CartOwner::from(self.user_uuid())
    }
}

impl DepotExt for Depot {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError> {
        self.obtain::<T>()
            .map_err(|_ignored| StatusError::internal_server_error())
    }

    fn insert_request_id(&mut self, request_id: String) {
        self.insert(REQUEST_ID_KEY, request_id);
    }

    fn request_id(&self) -> Option<&str> {
        self.get::<String>(REQUEST_ID_KEY).ok().map(String::as_str)
    }

    fn insert_session_id(&mut self, session: String) {
        self.insert(SESSION_ID_KEY, session);
    }

    fn session_id_or_400(&self) -> Result<&str, StatusError> {
        self.get::<String>(SESSION_ID_KEY)
            .ok()
            .map(String::as_str)
            .ok_or_else(|| StatusError::bad_request().brief("Missing x-session-id header"))
    }

    fn insert_user_uuid(&mut self, user: UserUuid) {
        self.insert(USER_UUID_KEY, user);
    }

    fn user_uuid(&self) -> Option<UserUuid> {
        self.get::<UserUuid>(USER_UUID_KEY).ok().copied()
    }
}
