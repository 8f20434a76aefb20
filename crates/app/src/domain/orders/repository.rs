//! Orders Repository
//!
//! Every operation is a single autocommit statement. Keeping a header and its
//! items consistent is the job of [`crate::domain::orders::OrderCreationService`].

use async_trait::async_trait;
use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use mockall::automock;
use sqlx::{Error, FromRow, PgPool, Postgres, Row, postgres::PgRow, query, query_as};

use crate::domain::{
    orders::models::{
        NewOrder, NewOrderItem, Order, OrderItem, OrderItemUuid, OrderStatus, OrderUuid,
        StatusCount,
    },
    products::models::ProductUuid,
    profiles::models::{RestaurantUuid, UserUuid},
};

const INSERT_ORDER_SQL: &str = include_str!("sql/insert_order.sql");
const INSERT_ORDER_ITEMS_SQL: &str = include_str!("sql/insert_order_items.sql");
const DELETE_ORDER_SQL: &str = include_str!("sql/delete_order.sql");
const GET_ORDER_SQL: &str = include_str!("sql/get_order.sql");
const GET_ORDER_ITEMS_SQL: &str = include_str!("sql/get_order_items.sql");
const UPDATE_ORDER_STATUS_SQL: &str = include_str!("sql/update_order_status.sql");
const CANCEL_ORDER_SQL: &str = include_str!("sql/cancel_order.sql");
const ORDER_STATUS_COUNTS_SQL: &str = include_str!("sql/order_status_counts.sql");

#[automock]
#[async_trait]
pub trait OrdersRepository: Send + Sync {
    /// Insert an order header as `pending` with a zero total.
    async fn insert_order(&self, order: NewOrder) -> Result<Order, Error>;

    /// Insert all lines of an order in one statement.
    async fn insert_order_items(
        &self,
        order: OrderUuid,
        items: Vec<NewOrderItem>,
        created_at: Timestamp,
    ) -> Result<u64, Error>;

    /// Delete an order header (and, by cascade, any lines).
    async fn delete_order(&self, order: OrderUuid) -> Result<u64, Error>;

    async fn get_order(&self, order: OrderUuid) -> Result<Option<Order>, Error>;

    async fn get_order_items(&self, order: OrderUuid) -> Result<Vec<OrderItem>, Error>;

    async fn update_order_status(
        &self,
        order: OrderUuid,
        status: OrderStatus,
        updated_at: Timestamp,
    ) -> Result<Option<Order>, Error>;

    /// Cancel the order if it is still cancellable; `None` otherwise.
    async fn cancel_order(
        &self,
        order: OrderUuid,
        reason: Option<String>,
        cancelled_at: Timestamp,
    ) -> Result<Option<Order>, Error>;

    async fn order_status_counts(
        &self,
        restaurant: RestaurantUuid,
    ) -> Result<Vec<StatusCount>, Error>;
}

#[derive(Debug, Clone)]
pub struct PgOrdersRepository {
    pool: PgPool,
}

impl PgOrdersRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn decode_error(column: &str, source: impl std::error::Error + Send + Sync + 'static) -> Error {
    Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(source),
    }
}

impl<'r> FromRow<'r, PgRow> for Order {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let status: String = row.try_get("status")?;
        let priority: String = row.try_get("priority")?;

        Ok(Self {
            uuid: OrderUuid::from_uuid(row.try_get("uuid")?),
            restaurant_uuid: RestaurantUuid::from_uuid(row.try_get("restaurant_uuid")?),
            created_by: UserUuid::from_uuid(row.try_get("created_by")?),
            status: status.parse().map_err(|e| decode_error("status", e))?,
            priority: priority.parse().map_err(|e| decode_error("priority", e))?,
            total_amount: row.try_get("total_amount")?,
            delivery_address: row.try_get("delivery_address")?,
            contact_phone: row.try_get("contact_phone")?,
            special_instructions: row.try_get("special_instructions")?,
            requested_delivery_time: row
                .try_get::<Option<SqlxTimestamp>, _>("requested_delivery_time")?
                .map(SqlxTimestamp::to_jiff),
            priced_at: row
                .try_get::<Option<SqlxTimestamp>, _>("priced_at")?
                .map(SqlxTimestamp::to_jiff),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
            cancelled_at: row
                .try_get::<Option<SqlxTimestamp>, _>("cancelled_at")?
                .map(SqlxTimestamp::to_jiff),
            cancellation_reason: row.try_get("cancellation_reason")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for OrderItem {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let quantity: i32 = row.try_get("quantity")?;

        Ok(Self {
            uuid: OrderItemUuid::from_uuid(row.try_get("uuid")?),
            order_uuid: OrderUuid::from_uuid(row.try_get("order_uuid")?),
            product_uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            quantity: u32::try_from(quantity).map_err(|e| decode_error("quantity", e))?,
            unit_price: row.try_get("unit_price")?,
            subtotal: row.try_get("subtotal")?,
            total_price: row.try_get("total_price")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for StatusCount {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let status: String = row.try_get("status")?;
        let orders: i64 = row.try_get("orders")?;

        Ok(Self {
            status: status.parse().map_err(|e| decode_error("status", e))?,
            orders: u64::try_from(orders).map_err(|e| decode_error("orders", e))?,
            total_amount: row.try_get("total_amount")?,
        })
    }
}

#[async_trait]
impl OrdersRepository for PgOrdersRepository {
    async fn insert_order(&self, order: NewOrder) -> Result<Order, Error> {
        query_as::<Postgres, Order>(INSERT_ORDER_SQL)
            .bind(order.uuid.into_uuid())
            .bind(order.restaurant_uuid.into_uuid())
            .bind(order.created_by.into_uuid())
            .bind(order.priority.as_str())
            .bind(order.delivery_address)
            .bind(order.contact_phone)
            .bind(order.special_instructions)
            .bind(order.requested_delivery_time.map(SqlxTimestamp::from))
            .bind(SqlxTimestamp::from(order.created_at))
            .fetch_one(&self.pool)
            .await
    }

    async fn insert_order_items(
        &self,
        order: OrderUuid,
        items: Vec<NewOrderItem>,
        created_at: Timestamp,
    ) -> Result<u64, Error> {
        let mut uuids = Vec::with_capacity(items.len());
        let mut products = Vec::with_capacity(items.len());
        let mut quantities = Vec::with_capacity(items.len());

        for item in items {
            uuids.push(item.uuid.into_uuid());
            products.push(item.product_uuid.into_uuid());
            quantities.push(
                i32::try_from(item.quantity).map_err(|e| Error::Encode(Box::new(e)))?,
            );
        }

        let rows_affected = query(INSERT_ORDER_ITEMS_SQL)
            .bind(order.into_uuid())
            .bind(uuids)
            .bind(products)
            .bind(quantities)
            .bind(SqlxTimestamp::from(created_at))
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    async fn delete_order(&self, order: OrderUuid) -> Result<u64, Error> {
        let rows_affected = query(DELETE_ORDER_SQL)
            .bind(order.into_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    async fn get_order(&self, order: OrderUuid) -> Result<Option<Order>, Error> {
        query_as::<Postgres, Order>(GET_ORDER_SQL)
            .bind(order.into_uuid())
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_order_items(&self, order: OrderUuid) -> Result<Vec<OrderItem>, Error> {
        query_as::<Postgres, OrderItem>(GET_ORDER_ITEMS_SQL)
            .bind(order.into_uuid())
            .fetch_all(&self.pool)
            .await
    }

    async fn update_order_status(
        &self,
        order: OrderUuid,
        status: OrderStatus,
        updated_at: Timestamp,
    ) -> Result<Option<Order>, Error> {
        query_as::<Postgres, Order>(UPDATE_ORDER_STATUS_SQL)
            .bind(order.into_uuid())
            .bind(status.as_str())
            .bind(SqlxTimestamp::from(updated_at))
            .fetch_optional(&self.pool)
            .await
    }

    async fn cancel_order(
        &self,
        order: OrderUuid,
        reason: Option<String>,
        cancelled_at: Timestamp,
    ) -> Result<Option<Order>, Error> {
        query_as::<Postgres, Order>(CANCEL_ORDER_SQL)
            .bind(order.into_uuid())
            .bind(reason)
            .bind(SqlxTimestamp::from(cancelled_at))
            .fetch_optional(&self.pool)
            .await
    }

    async fn order_status_counts(
        &self,
        restaurant: RestaurantUuid,
    ) -> Result<Vec<StatusCount>, Error> {
        query_as::<Postgres, StatusCount>(ORDER_STATUS_COUNTS_SQL)
            .bind(restaurant.into_uuid())
            .fetch_all(&self.pool)
            .await
    }
}

