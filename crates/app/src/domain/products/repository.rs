//! Products Repository

use async_trait::async_trait;
use mockall::automock;
use sqlx::{FromRow, PgPool, Postgres, Row, postgres::PgRow, query_as};

use crate::domain::products::models::{Product, ProductUuid};

const GET_PRODUCT_SQL: &str = include_str!("sql/get_product.sql");

#[derive(Debug, Clone)]
pub struct PgProductsRepository {
    pool: PgPool,
}

impl PgProductsRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl<'r> FromRow<'r, PgRow> for Product {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: ProductUuid::from_uuid(row.try_get("uuid")?),
            name: row.try_get("name")?,
            unit_price: row.try_get("unit_price")?,
            unit: row.try_get("unit")?,
            category: row.try_get("category")?,
            image_url: row.try_get("image_url")?,
        })
    }
}

#[async_trait]
impl ProductsRepository for PgProductsRepository {
    async fn get_product(&self, product: ProductUuid) -> Result<Option<Product>, sqlx::Error> {
        query_as::<Postgres, Product>(GET_PRODUCT_SQL)
            .bind(product.into_uuid())
            .fetch_optional(&self.pool)
            .await
    }
}

/// Read access to the product catalog.
#[automock]
#[async_trait]
pub trait ProductsRepository: Send + Sync {
    /// Look up a product by id; `None` when the catalog has no such product.
    async fn get_product(&self, product: ProductUuid) -> Result<Option<Product>, sqlx::Error>;
}
