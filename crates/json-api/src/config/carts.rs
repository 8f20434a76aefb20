//! Cart Config

use std::path::PathBuf;

use clap::Args;
use jiff::SignedDuration;
use larder_app::domain::carts::CartSettings;

/// Cart persistence settings.
#[derive(Debug, Args)]
pub struct CartsConfig {
    /// Directory for persisted session carts. Carts are kept in memory when unset.
    #[arg(long, env = "CART_STORAGE_DIR")]
    pub cart_storage_dir: Option<PathBuf>,

    /// Hours after the last change before a cart expires.
    #[arg(long, env = "CART_TTL_HOURS", default_value_t = 24_i64)]
    pub cart_ttl_hours: i64,
}

impl CartsConfig {
    #[must_use]
    pub fn cart_settings(&self) -> CartSettings {
        CartSettings {
            ttl: SignedDuration::from_hours(self.cart_ttl_hours),
        }
    }
}
