//! App Context

use std::{path::PathBuf, sync::Arc};

use sqlx::PgPool;
use thiserror::Error;

use crate::{
    clock::{Clock, SystemClock},
    database,
    domain::{
        carts::{
            CartService, CartSessions, CartSettings, CartStorage, FileCartStorage,
            MemoryCartStorage, PgCartMirror,
        },
        checkout::CheckoutService,
        orders::{OrderSubmissionService, OrdersService, PgOrdersRepository},
        pricing::DeliveryPolicy,
        products::PgProductsRepository,
        profiles::PgProfilesRepository,
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),
}

/// Settings that shape the services, independent of where they come from.
#[derive(Debug, Clone, Default)]
pub struct AppSettings {
    /// Directory for persisted carts; carts stay in memory when unset.
    pub cart_storage_dir: Option<PathBuf>,
    pub carts: CartSettings,
    pub delivery: DeliveryPolicy,
}

#[derive(Clone)]
pub struct AppContext {
    pub carts: Arc<CartService>,
    pub cart_sessions: CartSessions,
    pub orders: Arc<dyn OrdersService>,
    pub checkout: Arc<CheckoutService>,
}

impl AppContext {
    /// Build application context from a database URL.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection fails.
    pub async fn from_database_url(url: &str, settings: AppSettings) -> Result<Self, AppInitError> {
        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        Ok(Self::from_pool(pool, settings))
    }

    #[must_use]
    pub fn from_pool(pool: PgPool, settings: AppSettings) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let storage: Arc<dyn CartStorage> = match settings.cart_storage_dir {
            Some(dir) => Arc::new(FileCartStorage::new(dir)),
            None => Arc::new(MemoryCartStorage::new()),
        };

        let products = Arc::new(PgProductsRepository::new(pool.clone()));

        let carts = Arc::new(CartService::new(
            products.clone(),
            Arc::new(PgCartMirror::new(pool.clone())),
            settings.delivery,
        ));

        let orders: Arc<dyn OrdersService> = Arc::new(OrderSubmissionService::new(
            Arc::new(PgOrdersRepository::new(pool.clone())),
            products,
            Arc::new(PgProfilesRepository::new(pool)),
            settings.delivery,
            Arc::clone(&clock),
        ));

        Self {
            cart_sessions: CartSessions::new(storage, clock, settings.carts),
            checkout: Arc::new(CheckoutService::new(
                Arc::clone(&carts),
                Arc::clone(&orders),
            )),
            carts,
            orders,
        }
    }
}
