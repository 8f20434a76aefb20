//! Test helpers.

use std::sync::Arc;

use jiff::Timestamp;
use rust_decimal::Decimal;
use salvo::{affix_state::inject, prelude::*};

use larder_app::{
    clock::{Clock, SystemClock},
    context::AppContext,
    domain::{
        carts::{
            CartService, CartSessions, CartSettings, CartStore, MemoryCartStorage,
            MockCartMirror, models::CartOwner,
        },
        checkout::CheckoutService,
        orders::{
            MockOrdersService, OrderingPolicy, OrdersService,
            models::{Order, OrderPriority, OrderStatus, OrderUuid},
        },
        pricing::DeliveryPolicy,
        products::{
            MockProductsRepository,
            models::{Product, ProductUuid},
        },
        profiles::models::{RestaurantUuid, UserUuid},
    },
};

use crate::{identity, state::State};

/// Mocks and in-memory collaborators behind one test server.
pub(crate) struct TestApp {
    pub(crate) orders: MockOrdersService,
    pub(crate) products: MockProductsRepository,
    pub(crate) mirror: MockCartMirror,
    pub(crate) policy: OrderingPolicy,
    storage: Arc<MemoryCartStorage>,
}

impl TestApp {
    pub(crate) fn new() -> Self {
        Self {
            orders: MockOrdersService::new(),
            products: MockProductsRepository::new(),
            mirror: MockCartMirror::new(),
            policy: OrderingPolicy::default(),
            storage: Arc::new(MemoryCartStorage::new()),
        }
    }

    /// Sessions sharing this app's storage, for seeding carts before a request.
    pub(crate) fn cart_sessions(&self) -> CartSessions {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        CartSessions::new(self.storage.clone(), clock, CartSettings::default())
    }

    pub(crate) async fn open_cart(&self, session: &str, owner: CartOwner) -> CartStore {
        self.cart_sessions().open(session, owner).await
    }

    pub(crate) fn service(self, route: Router) -> Service {
        let cart_sessions = self.cart_sessions();
        let delivery = DeliveryPolicy::default();

        let carts = Arc::new(CartService::new(
            Arc::new(self.products),
            Arc::new(self.mirror),
            delivery,
        ));
        let orders: Arc<dyn OrdersService> = Arc::new(self.orders);

        let app = AppContext {
            checkout: Arc::new(CheckoutService::new(Arc::clone(&carts), Arc::clone(&orders))),
            carts,
            cart_sessions,
            orders,
        };

        Service::new(
            Router::new()
                .hoop(inject(State::from_app_context(app, self.policy)))
                .hoop(identity::handler)
                .push(route),
        )
    }
}

pub(crate) fn make_product(price: i64) -> Product {
    Product {
        uuid: ProductUuid::new(),
        name: "San Marzano tomatoes".to_owned(),
        unit_price: Decimal::from(price),
        unit: "case".to_owned(),
        category: "produce".to_owned(),
        image_url: None,
    }
}

pub(crate) fn make_order(uuid: OrderUuid, restaurant: RestaurantUuid, status: OrderStatus) -> Order {
    let created_at = Timestamp::UNIX_EPOCH;

    Order {
        uuid,
        restaurant_uuid: restaurant,
        created_by: UserUuid::new(),
        status,
        priority: OrderPriority::Normal,
        total_amount: Decimal::ZERO,
        delivery_address: Some("1 Harbour St".to_owned()),
        contact_phone: "555-0100".to_owned(),
        special_instructions: None,
        requested_delivery_time: None,
        priced_at: None,
        created_at,
        updated_at: created_at,
        cancelled_at: None,
        cancellation_reason: None,
    }
}
