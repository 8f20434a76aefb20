//! Caller identity.
//!
//! Sessions and users are established upstream; this layer only lifts the
//! forwarded headers into the depot.

use salvo::prelude::*;
use tracing::debug;

use larder_app::domain::profiles::models::UserUuid;

use crate::extensions::*;

pub(crate) const SESSION_ID_HEADER: &str = "x-session-id";
pub(crate) const USER_ID_HEADER: &str = "x-user-id";

#[salvo::handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    if let Some(session) = non_empty_header(req, SESSION_ID_HEADER) {
        depot.insert_session_id(session);
    }

    if let Some(user) = non_empty_header(req, USER_ID_HEADER) {
        match user.parse::<UserUuid>() {
            Ok(user) => depot.insert_user_uuid(user),
            Err(source) => {
                debug!("rejecting malformed {USER_ID_HEADER}: {source}");

                res.render(StatusError::bad_request().brief("Invalid x-user-id header"));

                return;
            }
        }
    }

    ctrl.call_next(req, depot, res).await;
}

fn non_empty_header(req: &Request, name: &str) -> Option<String> {
    req.header::<String>(name)
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use larder_app::domain::carts::models::CartOwner;
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;
    use uuid::Uuid;

    use super::*;

    #[salvo::handler]
    async fn echo_identity(depot: &mut Depot, res: &mut Response) {
        let session = depot.session_id_or_400().unwrap_or("none").to_owned();
        let owner = match depot.cart_owner() {
            CartOwner::User(user) => user.to_string(),
            CartOwner::Anonymous => "anonymous".to_owned(),
        };

        res.render(format!("{session}|{owner}"));
    }

    fn make_service() -> Service {
        Service::new(Router::new().hoop(handler).push(Router::new().get(echo_identity)))
    }

    #[tokio::test]
    async fn headers_are_lifted_into_the_depot() -> TestResult {
        let user = Uuid::now_v7();

        let mut res = TestClient::get("http://example.com")
            .add_header(SESSION_ID_HEADER, "abc", true)
            .add_header(USER_ID_HEADER, user.to_string(), true)
            .send(&make_service())
            .await;

        assert_eq!(res.take_string().await?, format!("abc|{user}"));

        Ok(())
    }

    #[tokio::test]
    async fn missing_user_is_anonymous() -> TestResult {
        let mut res = TestClient::get("http://example.com")
            .add_header(SESSION_ID_HEADER, "abc", true)
            .send(&make_service())
            .await;

        assert_eq!(res.take_string().await?, "abc|anonymous");

        Ok(())
    }

    #[tokio::test]
    async fn malformed_user_is_rejected() {
        let res = TestClient::get("http://example.com")
            .add_header(USER_ID_HEADER, "not-a-uuid", true)
            .send(&make_service())
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
    }
}
