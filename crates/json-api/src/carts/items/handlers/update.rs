//! Update Cart Item Handler

use std::sync::Arc;

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use larder_app::domain::carts::{CartUpdate, validation::CartItemUpdate};

use crate::{
    carts::{errors::into_status_error, open_cart, responses::CartEnvelope},
    extensions::*,
    state::State,
};

/// Update Cart Item Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateCartItemRequest {
    /// Zero or less removes the item
    pub quantity: i64,

    #[serde(default)]
    pub notes: Option<String>,
}

/// Update Cart Item Handler
///
/// Replaces the quantity and notes of an item already in the cart.
#[endpoint(
    tags("carts"),
    summary = "Update Cart Item",
    responses(
        (status_code = StatusCode::OK, description = "Updated cart"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid quantity or notes"),
        (status_code = StatusCode::NOT_FOUND, description = "Item not in cart"),
    ),
)]
pub(crate) async fn handler(
    product: PathParam<Uuid>,
    json: JsonBody<UpdateCartItemRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<CartEnvelope>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let mut store = open_cart(state, depot).await?;
    let request = json.into_inner();

    let update = state
        .app
        .carts
        .update_cart_item(
            &mut store,
            CartItemUpdate {
                product: product.into_inner().into(),
                quantity: request.quantity,
                notes: request.notes,
            },
        )
        .await
        .map_err(into_status_error)?;

    match update {
        CartUpdate::Applied { warnings } => {
            let totals = state.app.carts.cart_totals(store.cart());

            Ok(Json(CartEnvelope::cart(store.cart(), totals, &warnings)))
        }
        CartUpdate::Rejected(report) => {
            res.status_code(StatusCode::BAD_REQUEST);

            Ok(Json(CartEnvelope::invalid("Invalid cart item update", &report)))
        }
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use larder_app::domain::{
        carts::models::{CartItem, CartOwner},
        products::models::ProductUuid,
    };
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use crate::{
        identity::SESSION_ID_HEADER,
        test_helpers::{TestApp, make_product},
    };

    use super::*;

    fn route() -> Router {
        Router::with_path("cart/items/{product}").put(handler)
    }

    async fn seeded_app() -> (TestApp, ProductUuid) {
        let app = TestApp::new();
        let product = make_product(12);
        let product_uuid = product.uuid;

        let mut store = app.open_cart("s1", CartOwner::Anonymous).await;
        store
            .add_item(CartItem::new(&product, 2, None, Timestamp::now()))
            .await;

        (app, product_uuid)
    }

    #[tokio::test]
    async fn test_update_sets_quantity_and_notes() -> TestResult {
        let (app, product) = seeded_app().await;

        let mut res = TestClient::put(format!("http://example.com/cart/items/{product}"))
            .add_header(SESSION_ID_HEADER, "s1", true)
            .json(&json!({ "quantity": 5, "notes": "ripe only" }))
            .send(&app.service(route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        let body: CartEnvelope = res.take_json().await?;
        let cart = body.data.ok_or("cart missing")?;
        let item = cart.items.first().ok_or("item missing")?;

        assert_eq!(item.quantity, 5);
        assert_eq!(item.notes.as_deref(), Some("ripe only"));
        assert_eq!(cart.total_price, "60");

        Ok(())
    }

    #[tokio::test]
    async fn test_zero_quantity_removes_item() -> TestResult {
        let (app, product) = seeded_app().await;

        let mut res = TestClient::put(format!("http://example.com/cart/items/{product}"))
            .add_header(SESSION_ID_HEADER, "s1", true)
            .json(&json!({ "quantity": 0 }))
            .send(&app.service(route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        let body: CartEnvelope = res.take_json().await?;

        assert_eq!(body.data.map(|cart| cart.items.len()), Some(0));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_of_missing_item_returns_404() {
        let (app, _product) = seeded_app().await;

        let res = TestClient::put(format!(
            "http://example.com/cart/items/{}",
            ProductUuid::new()
        ))
        .add_header(SESSION_ID_HEADER, "s1", true)
        .json(&json!({ "quantity": 3 }))
        .send(&app.service(route()))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn test_oversized_quantity_is_rejected() -> TestResult {
        let (app, product) = seeded_app().await;

        let mut res = TestClient::put(format!("http://example.com/cart/items/{product}"))
            .add_header(SESSION_ID_HEADER, "s1", true)
            .json(&json!({ "quantity": 1001 }))
            .send(&app.service(route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        let body: CartEnvelope = res.take_json().await?;

        assert_eq!(
            body.errors.first().map(|issue| issue.code.as_str()),
            Some("INVALID_QUANTITY")
        );

        Ok(())
    }
}
