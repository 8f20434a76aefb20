//! Database Config

use clap::Args;

/// `PostgreSQL` holding orders, products, profiles and mirrored carts.
#[derive(Debug, Args)]
pub struct DatabaseConfig {
    /// Connection string, e.g. `postgres://larder@localhost/larder`
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: String,
}
