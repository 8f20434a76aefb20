//! Order Models

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    domain::{
        products::models::ProductUuid,
        profiles::models::{RestaurantUuid, UserUuid},
    },
    uuids::TypedUuid,
};

/// Order UUID
pub type OrderUuid = TypedUuid<Order>;

/// Order Item UUID
pub type OrderItemUuid = TypedUuid<OrderItem>;

#[derive(Debug, Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    InTransit,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Preparing => "preparing",
            Self::InTransit => "in_transit",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Only orders that have not started fulfillment can be cancelled.
    #[must_use]
    pub const fn is_cancellable(self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "preparing" => Ok(Self::Preparing),
            "in_transit" => Ok(Self::InTransit),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(UnknownVariant {
                kind: "order status",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderPriority {
    #[default]
    Normal,
    Urgent,
}

impl OrderPriority {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Urgent => "urgent",
        }
    }
}

impl FromStr for OrderPriority {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "normal" => Ok(Self::Normal),
            "urgent" => Ok(Self::Urgent),
            other => Err(UnknownVariant {
                kind: "order priority",
                value: other.to_string(),
            }),
        }
    }
}

/// Orders are created without prices; an external pricing authority sets
/// them later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingPhase {
    Unpriced,
    Priced,
}

impl PricingPhase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unpriced => "unpriced",
            Self::Priced => "priced",
        }
    }
}

/// Order header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "id")]
    pub uuid: OrderUuid,
    #[serde(rename = "restaurantId")]
    pub restaurant_uuid: RestaurantUuid,
    pub created_by: UserUuid,
    pub status: OrderStatus,
    pub priority: OrderPriority,
    pub total_amount: Decimal,
    pub delivery_address: Option<String>,
    pub contact_phone: String,
    pub special_instructions: Option<String>,
    pub requested_delivery_time: Option<Timestamp>,
    pub priced_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub cancelled_at: Option<Timestamp>,
    pub cancellation_reason: Option<String>,
}

impl Order {
    #[must_use]
    pub fn pricing_phase(&self) -> PricingPhase {
        if self.priced_at.is_some() {
            PricingPhase::Priced
        } else {
            PricingPhase::Unpriced
        }
    }
}

/// Order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(rename = "id")]
    pub uuid: OrderItemUuid,
    #[serde(rename = "orderId")]
    pub order_uuid: OrderUuid,
    #[serde(rename = "productId")]
    pub product_uuid: ProductUuid,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
    pub total_price: Decimal,
    pub created_at: Timestamp,
}

/// Header row to insert; status and amounts start at their unpriced defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub uuid: OrderUuid,
    pub restaurant_uuid: RestaurantUuid,
    pub created_by: UserUuid,
    pub priority: OrderPriority,
    pub delivery_address: Option<String>,
    pub contact_phone: String,
    pub special_instructions: Option<String>,
    pub requested_delivery_time: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// Line row to insert; prices are placeholders until pricing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderItem {
    pub uuid: OrderItemUuid,
    pub product_uuid: ProductUuid,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineInput {
    #[serde(rename = "productId")]
    pub product_uuid: ProductUuid,
    pub quantity: i64,
    #[serde(default)]
    pub unit_price: Option<Decimal>,
}

/// Free-form submission payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSubmissionInput {
    #[serde(rename = "restaurantId", default)]
    pub restaurant_uuid: Option<RestaurantUuid>,
    #[serde(default)]
    pub items: Vec<OrderLineInput>,
    #[serde(default)]
    pub delivery_address: Option<String>,
    #[serde(default)]
    pub contact_phone: String,
    #[serde(default)]
    pub special_instructions: Option<String>,
    #[serde(default)]
    pub priority: OrderPriority,
    #[serde(default)]
    pub requested_delivery_time: Option<Timestamp>,
}

/// Orders and summed amount per status, as read from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusCount {
    pub status: OrderStatus,
    pub orders: u64,
    pub total_amount: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStats {
    pub total_orders: u64,
    pub pending: u64,
    pub confirmed: u64,
    pub preparing: u64,
    pub in_transit: u64,
    pub delivered: u64,
    pub cancelled: u64,
    /// Summed `totalAmount` of every order that was not cancelled.
    pub total_value: Decimal,
}

impl OrderStats {
    #[must_use]
    pub fn from_counts(counts: &[StatusCount]) -> Self {
        counts.iter().fold(Self::default(), |mut stats, count| {
            stats.total_orders += count.orders;

            let bucket = match count.status {
                OrderStatus::Pending => &mut stats.pending,
                OrderStatus::Confirmed => &mut stats.confirmed,
                OrderStatus::Preparing => &mut stats.preparing,
                OrderStatus::InTransit => &mut stats.in_transit,
                OrderStatus::Delivered => &mut stats.delivered,
                OrderStatus::Cancelled => &mut stats.cancelled,
            };
            *bucket += count.orders;

            if count.status != OrderStatus::Cancelled {
                stats.total_value += count.total_amount;
            }

            stats
        })
    }
}

/// Status-facing view of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderTracking {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub estimated_delivery: Option<Timestamp>,
    pub pricing_phase: PricingPhase,
    pub is_cancellable: bool,
}
