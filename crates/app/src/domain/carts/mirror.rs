//! Server-side mirror of an authenticated user's cart.

use async_trait::async_trait;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use mockall::automock;
use sqlx::{PgPool, query};

use crate::domain::{
    carts::{errors::CartMirrorError, models::Cart},
    profiles::models::UserUuid,
};

const UPSERT_CART_MIRROR_SQL: &str = include_str!("sql/upsert_cart_mirror.sql");
const DELETE_CART_MIRROR_SQL: &str = include_str!("sql/delete_cart_mirror.sql");

#[automock]
#[async_trait]
pub trait CartMirror: Send + Sync {
    /// Replace the user's mirrored cart.
    async fn push(&self, user: UserUuid, cart: &Cart) -> Result<(), CartMirrorError>;

    /// Forget the user's mirrored cart.
    async fn clear(&self, user: UserUuid) -> Result<(), CartMirrorError>;
}

#[derive(Debug, Clone)]
pub struct PgCartMirror {
    pool: PgPool,
}

impl PgCartMirror {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CartMirror for PgCartMirror {
    async fn push(&self, user: UserUuid, cart: &Cart) -> Result<(), CartMirrorError> {
        let record = serde_json::to_string(cart)?;

        query(UPSERT_CART_MIRROR_SQL)
            .bind(user.into_uuid())
            .bind(record)
            .bind(SqlxTimestamp::from(cart.updated_at))
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn clear(&self, user: UserUuid) -> Result<(), CartMirrorError> {
        query(DELETE_CART_MIRROR_SQL)
            .bind(user.into_uuid())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
