//! Order creation.
//!
//! Writes an order header and then its items against a store without
//! multi-statement transactions. If the items cannot be written the header is
//! deleted again, so callers observe either both or neither. The write and its
//! compensation run in a spawned task, which keeps going even if the caller's
//! future is dropped mid-flight.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::Arc,
};

use jiff::Timestamp;
use tracing::{Instrument, Span, error, info, warn};

use crate::{
    clock::Clock,
    domain::{
        orders::{
            errors::{AuthorizationError, OrderCreationError},
            models::{NewOrder, NewOrderItem, Order, OrderItemUuid, OrderPriority, OrderUuid},
            repository::OrdersRepository,
        },
        products::models::ProductUuid,
        profiles::{
            ProfilesRepository,
            models::{RestaurantUuid, UserUuid},
        },
    },
};

/// One line of an order to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderLine {
    pub product_uuid: ProductUuid,
    pub quantity: u32,
}

/// Everything needed to write an order on behalf of a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    pub restaurant_uuid: RestaurantUuid,
    pub created_by: UserUuid,
    pub priority: OrderPriority,
    pub delivery_address: Option<String>,
    pub contact_phone: String,
    pub special_instructions: Option<String>,
    pub requested_delivery_time: Option<Timestamp>,
    pub lines: Vec<OrderLine>,
}

impl OrderRequest {
    fn into_rows(self, now: Timestamp) -> (NewOrder, Vec<NewOrderItem>) {
        let header = NewOrder {
            uuid: OrderUuid::new(),
            restaurant_uuid: self.restaurant_uuid,
            created_by: self.created_by,
            priority: self.priority,
            delivery_address: self.delivery_address,
            contact_phone: self.contact_phone,
            special_instructions: self.special_instructions,
            requested_delivery_time: self.requested_delivery_time,
            created_at: now,
        };

        let items = self
            .lines
            .into_iter()
            .map(|line| NewOrderItem {
                uuid: OrderItemUuid::new(),
                product_uuid: line.product_uuid,
                quantity: line.quantity,
            })
            .collect();

        (header, items)
    }
}

pub struct OrderCreationService {
    orders: Arc<dyn OrdersRepository>,
    profiles: Arc<dyn ProfilesRepository>,
    clock: Arc<dyn Clock>,
}

impl Debug for OrderCreationService {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("OrderCreationService")
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl OrderCreationService {
    #[must_use]
    pub fn new(
        orders: Arc<dyn OrdersRepository>,
        profiles: Arc<dyn ProfilesRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            orders,
            profiles,
            clock,
        }
    }

    /// Authorize the acting user, then durably write the order.
    ///
    /// Returns the header as inserted; items are written but not read back.
    #[tracing::instrument(
        name = "orders.create",
        skip(self, request),
        fields(
            restaurant_uuid = %request.restaurant_uuid,
            user_uuid = %request.created_by,
            lines = request.lines.len(),
        )
    )]
    pub async fn create_order(&self, request: OrderRequest) -> Result<Order, OrderCreationError> {
        if request.lines.is_empty() {
            return Err(OrderCreationError::InvalidRequest(
                "order has no items".to_string(),
            ));
        }

        if let Some(line) = request.lines.iter().find(|line| line.quantity == 0) {
            return Err(OrderCreationError::InvalidRequest(format!(
                "product {} has no quantity",
                line.product_uuid
            )));
        }

        self.authorize(request.created_by, request.restaurant_uuid)
            .await?;

        let (header, items) = request.into_rows(self.clock.now());
        let orders = Arc::clone(&self.orders);

        tokio::spawn(write_order(orders, header, items).instrument(Span::current()))
            .await
            .map_err(OrderCreationError::Aborted)?
    }

    pub(crate) async fn authorize(
        &self,
        user: UserUuid,
        restaurant: RestaurantUuid,
    ) -> Result<(), OrderCreationError> {
        let profile = self
            .profiles
            .get_profile(user)
            .await
            .map_err(OrderCreationError::ProfileLookup)?
            .ok_or(AuthorizationError::UnknownProfile)?;

        if !profile.may_order_for(restaurant) {
            return Err(AuthorizationError::RoleNotPermitted(profile.role).into());
        }

        Ok(())
    }
}

async fn write_order(
    orders: Arc<dyn OrdersRepository>,
    header: NewOrder,
    items: Vec<NewOrderItem>,
) -> Result<Order, OrderCreationError> {
    let order = orders
        .insert_order(header)
        .await
        .map_err(OrderCreationError::HeaderWriteFailed)?;

    match orders
        .insert_order_items(order.uuid, items, order.created_at)
        .await
    {
        Ok(written) => {
            info!(order_uuid = %order.uuid, items = written, "order created");
            Ok(order)
        }
        Err(cause) => Err(compensate(orders.as_ref(), order.uuid, cause).await),
    }
}

async fn compensate(
    orders: &dyn OrdersRepository,
    order: OrderUuid,
    cause: sqlx::Error,
) -> OrderCreationError {
    match orders.delete_order(order).await {
        Ok(_) => {
            warn!(order_uuid = %order, error = %cause, "order items write failed, header rolled back");

            OrderCreationError::ItemsWriteFailed(cause)
        }
        Err(rollback) => {
            error!(
                order_uuid = %order,
                error = %cause,
                rollback_error = %rollback,
                "order rollback failed, header persisted without items"
            );

            OrderCreationError::Inconsistent {
                order,
                cause,
                rollback,
            }
        }
    }
}
