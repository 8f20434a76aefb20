//! Server configuration module

use clap::Parser;
use larder_app::context::AppSettings;

use crate::config::{
    carts::CartsConfig,
    db::DatabaseConfig,
    observability::{LoggingConfig, ObservabilityConfig},
    ordering::OrderingConfig,
    server::ServerRuntimeConfig,
};

pub(crate) mod carts;
pub(crate) mod db;
pub(crate) mod observability;
pub(crate) mod ordering;
pub(crate) mod server;

/// Larder JSON API Server configuration
#[derive(Debug, Parser)]
#[command(name = "larder-json", about = "Larder JSON API Server", long_about = None)]
pub struct ServerConfig {
    /// Server network settings.
    #[command(flatten)]
    pub server: ServerRuntimeConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Observability (traces/metrics) settings.
    #[command(flatten)]
    pub observability: ObservabilityConfig,

    /// Application database settings.
    #[command(flatten)]
    pub database: DatabaseConfig,

    /// Cart persistence settings.
    #[command(flatten)]
    pub carts: CartsConfig,

    /// Delivery pricing and order admission policy.
    #[command(flatten)]
    pub ordering: OrderingConfig,
}

impl ServerConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // A missing .env is fine
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Get the socket address for binding
    #[must_use]
    pub fn socket_addr(&self) -> String {
        self.server.socket_addr()
    }

    /// Service-level settings handed to the application context.
    #[must_use]
    pub fn app_settings(&self) -> AppSettings {
        AppSettings {
            cart_storage_dir: self.carts.cart_storage_dir.clone(),
            carts: self.carts.cart_settings(),
            delivery: self.ordering.delivery_policy(),
        }
    }
}
