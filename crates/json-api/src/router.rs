//! App Router

use salvo::Router;

use crate::{carts, identity, orders};

pub fn app_router() -> Router {
    Router::new()
        .hoop(identity::handler)
        .push(
            Router::with_path("orders")
                .push(Router::with_path("submit").post(orders::submit::handler))
                .push(Router::with_path("stats").get(orders::stats::handler))
                .push(
                    Router::with_path("{order}")
                        .get(orders::get::handler)
                        .delete(orders::cancel::handler),
                ),
        )
        .push(
            Router::with_path("cart")
                .get(carts::get::handler)
                .delete(carts::clear::handler)
                .push(Router::with_path("checkout").post(carts::checkout::handler))
                .push(
                    Router::with_path("items")
                        .post(carts::items::create::handler)
                        .push(
                            Router::with_path("{product}")
                                .put(carts::items::update::handler)
                                .delete(carts::items::delete::handler),
                        ),
                ),
        )
}

#[cfg(test)]
mod tests {
    use salvo::{http::StatusCode, test::TestClient};

    use crate::{identity::SESSION_ID_HEADER, test_helpers::TestApp};

    use super::*;

    #[tokio::test]
    async fn test_cart_routes_require_a_session() {
        let res = TestClient::get("http://example.com/cart")
            .send(&TestApp::new().service(app_router()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
    }

    #[tokio::test]
    async fn test_fresh_session_gets_an_empty_cart() {
        let res = TestClient::get("http://example.com/cart")
            .add_header(SESSION_ID_HEADER, "fresh", true)
            .send(&TestApp::new().service(app_router()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));
    }

    #[tokio::test]
    async fn test_malformed_order_id_is_rejected() {
        let mut app = TestApp::new();

        app.orders.expect_find_order_restaurant().never();

        let res = TestClient::get("http://example.com/orders/not-a-uuid")
            .send(&app.service(app_router()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
    }
}
