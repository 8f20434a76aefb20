//! Ordering Policy Config

use clap::Args;
use larder_app::domain::{orders::OrderingPolicy, pricing::DeliveryPolicy};
use rust_decimal::Decimal;

/// Delivery pricing and order admission settings.
#[derive(Debug, Args)]
#[expect(
    clippy::struct_excessive_bools,
    reason = "independent policy toggles from CLI/env."
)]
pub struct OrderingConfig {
    /// Subtotal at which delivery becomes free.
    #[arg(long, env = "FREE_DELIVERY_THRESHOLD", default_value = "500")]
    pub free_delivery_threshold: Decimal,

    /// Flat delivery fee below the threshold.
    #[arg(long, env = "DELIVERY_FEE", default_value = "25")]
    pub delivery_fee: Decimal,

    /// Smallest order value accepted at submission.
    #[arg(long, env = "MIN_ORDER_VALUE", default_value = "0")]
    pub min_order_value: Decimal,

    /// Largest order value accepted at submission.
    #[arg(long, env = "MAX_ORDER_VALUE", default_value = "100000")]
    pub max_order_value: Decimal,

    /// Confirm orders as soon as they are created.
    #[arg(long, env = "AUTO_CONFIRM_ORDERS", default_value_t = false)]
    pub auto_confirm_orders: bool,

    /// Accept urgent priority orders.
    #[arg(long, env = "RUSH_DELIVERY_AVAILABLE", default_value_t = true)]
    pub rush_delivery_available: bool,

    /// Reject submissions without a delivery address.
    #[arg(long, env = "REQUIRE_DELIVERY_ADDRESS", default_value_t = true)]
    pub require_delivery_address: bool,

    /// Emit order notification events.
    #[arg(long, env = "ORDER_NOTIFICATIONS_ENABLED", default_value_t = false)]
    pub order_notifications_enabled: bool,
}

impl OrderingConfig {
    #[must_use]
    pub fn delivery_policy(&self) -> DeliveryPolicy {
        DeliveryPolicy {
            free_delivery_threshold: self.free_delivery_threshold,
            delivery_fee: self.delivery_fee,
        }
    }

    #[must_use]
    pub fn ordering_policy(&self) -> OrderingPolicy {
        OrderingPolicy {
            enable_notifications: self.order_notifications_enabled,
            auto_confirm: self.auto_confirm_orders,
            rush_delivery_available: self.rush_delivery_available,
            require_delivery_address: self.require_delivery_address,
            min_order_value: self.min_order_value,
            max_order_value: self.max_order_value,
        }
    }
}
