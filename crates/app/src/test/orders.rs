//! In-memory orders repository with failure injection.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use jiff::Timestamp;
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use sqlx::Error;
use tokio::sync::{Notify, RwLock};

use crate::domain::{
    orders::{
        OrdersRepository,
        models::{NewOrder, NewOrderItem, Order, OrderItem, OrderStatus, OrderUuid, StatusCount},
    },
    profiles::models::RestaurantUuid,
};

#[derive(Debug, Default)]
struct Tables {
    orders: FxHashMap<OrderUuid, Order>,
    items: FxHashMap<OrderUuid, Vec<OrderItem>>,
}

/// Behaves like the autocommit `PostgreSQL` repository: every call is one
/// independent write, with no transaction spanning calls.
#[derive(Debug, Default)]
pub(crate) struct InMemoryOrdersRepository {
    tables: RwLock<Tables>,
    fail_items: AtomicBool,
    fail_deletes: AtomicBool,
    item_gate: Mutex<Option<Arc<Notify>>>,
}

impl InMemoryOrdersRepository {
    pub(crate) fn fail_item_writes(&self) {
        self.fail_items.store(true, Ordering::SeqCst);
    }

    pub(crate) fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }

    /// Block item writes until the returned handle is notified.
    pub(crate) fn hold_item_writes(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());

        *self.item_gate.lock().expect("gate lock poisoned") = Some(Arc::clone(&gate));

        gate
    }

    pub(crate) async fn order_count(&self) -> usize {
        self.tables.read().await.orders.len()
    }

    pub(crate) async fn seed(&self, order: Order, items: Vec<OrderItem>) {
        let mut tables = self.tables.write().await;

        tables.items.insert(order.uuid, items);
        tables.orders.insert(order.uuid, order);
    }

    pub(crate) async fn set_status(&self, order: OrderUuid, status: OrderStatus) {
        if let Some(order) = self.tables.write().await.orders.get_mut(&order) {
            order.status = status;
        }
    }
}

fn injected() -> Error {
    Error::Protocol("injected failure".to_string())
}

#[async_trait]
impl OrdersRepository for InMemoryOrdersRepository {
    async fn insert_order(&self, order: NewOrder) -> Result<Order, Error> {
        let created = Order {
            uuid: order.uuid,
            restaurant_uuid: order.restaurant_uuid,
            created_by: order.created_by,
            status: OrderStatus::Pending,
            priority: order.priority,
            total_amount: Decimal::ZERO,
            delivery_address: order.delivery_address,
            contact_phone: order.contact_phone,
            special_instructions: order.special_instructions,
            requested_delivery_time: order.requested_delivery_time,
            priced_at: None,
            created_at: order.created_at,
            updated_at: order.created_at,
            cancelled_at: None,
            cancellation_reason: None,
        };

        self.tables
            .write()
            .await
            .orders
            .insert(created.uuid, created.clone());

        Ok(created)
    }

    async fn insert_order_items(
        &self,
        order: OrderUuid,
        items: Vec<NewOrderItem>,
        created_at: Timestamp,
    ) -> Result<u64, Error> {
        let gate = self.item_gate.lock().expect("gate lock poisoned").clone();

        if let Some(gate) = gate {
            gate.notified().await;
        }

        if self.fail_items.load(Ordering::SeqCst) {
            return Err(injected());
        }

        let rows: Vec<OrderItem> = items
            .into_iter()
            .map(|item| OrderItem {
                uuid: item.uuid,
                order_uuid: order,
                product_uuid: item.product_uuid,
                quantity: item.quantity,
                unit_price: Decimal::ZERO,
                subtotal: Decimal::ZERO,
                total_price: Decimal::ZERO,
                created_at,
            })
            .collect();

        let written = rows.len() as u64;

        self.tables
            .write()
            .await
            .items
            .entry(order)
            .or_default()
            .extend(rows);

        Ok(written)
    }

    async fn delete_order(&self, order: OrderUuid) -> Result<u64, Error> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(injected());
        }

        let mut tables = self.tables.write().await;

        tables.items.remove(&order);

        Ok(u64::from(tables.orders.remove(&order).is_some()))
    }

    async fn get_order(&self, order: OrderUuid) -> Result<Option<Order>, Error> {
        Ok(self.tables.read().await.orders.get(&order).cloned())
    }

    async fn get_order_items(&self, order: OrderUuid) -> Result<Vec<OrderItem>, Error> {
        Ok(self
            .tables
            .read()
            .await
            .items
            .get(&order)
            .cloned()
            .unwrap_or_default())
    }

    async fn update_order_status(
        &self,
        order: OrderUuid,
        status: OrderStatus,
        updated_at: Timestamp,
    ) -> Result<Option<Order>, Error> {
        let mut tables = self.tables.write().await;

        Ok(tables.orders.get_mut(&order).map(|order| {
            order.status = status;
            order.updated_at = updated_at;
            order.clone()
        }))
    }

    async fn cancel_order(
        &self,
        order: OrderUuid,
        reason: Option<String>,
        cancelled_at: Timestamp,
    ) -> Result<Option<Order>, Error> {
        let mut tables = self.tables.write().await;

        Ok(tables
            .orders
            .get_mut(&order)
            .filter(|order| order.status.is_cancellable())
            .map(|order| {
                order.status = OrderStatus::Cancelled;
                order.cancellation_reason = reason;
                order.cancelled_at = Some(cancelled_at);
                order.updated_at = cancelled_at;
                order.clone()
            }))
    }

    async fn order_status_counts(
        &self,
        restaurant: RestaurantUuid,
    ) -> Result<Vec<StatusCount>, Error> {
        let tables = self.tables.read().await;
        let mut counts: FxHashMap<OrderStatus, StatusCount> = FxHashMap::default();

        for order in tables
            .orders
            .values()
            .filter(|order| order.restaurant_uuid == restaurant)
        {
            let count = counts.entry(order.status).or_insert(StatusCount {
                status: order.status,
                orders: 0,
                total_amount: Decimal::ZERO,
            });

            count.orders += 1;
            count.total_amount += order.total_amount;
        }

        Ok(counts.into_values().collect())
    }
}
