//! Order response bodies.

use std::string::ToString;

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use larder_app::domain::{
    orders::models::{Order, OrderItem, OrderStats, OrderTracking},
    pricing::OrderTotals,
};

use crate::responses::TotalsResponse;

/// Order header
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderResponse {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub created_by: Uuid,

    /// `pending`, `confirmed`, `preparing`, `in_transit`, `delivered` or `cancelled`
    pub status: String,

    /// `normal` or `urgent`
    pub priority: String,

    /// `unpriced` until the pricing authority has set final prices
    pub pricing_phase: String,

    pub total_amount: String,
    pub delivery_address: Option<String>,
    pub contact_phone: String,
    pub special_instructions: Option<String>,
    pub requested_delivery_time: Option<String>,
    pub priced_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub cancelled_at: Option<String>,
    pub cancellation_reason: Option<String>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.uuid.into(),
            restaurant_id: order.restaurant_uuid.into(),
            created_by: order.created_by.into(),
            status: order.status.as_str().to_owned(),
            priority: order.priority.as_str().to_owned(),
            pricing_phase: order.pricing_phase().as_str().to_owned(),
            total_amount: order.total_amount.to_string(),
            delivery_address: order.delivery_address,
            contact_phone: order.contact_phone,
            special_instructions: order.special_instructions,
            requested_delivery_time: order.requested_delivery_time.as_ref().map(ToString::to_string),
            priced_at: order.priced_at.as_ref().map(ToString::to_string),
            created_at: order.created_at.to_string(),
            updated_at: order.updated_at.to_string(),
            cancelled_at: order.cancelled_at.as_ref().map(ToString::to_string),
            cancellation_reason: order.cancellation_reason,
        }
    }
}

/// Order line
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderItemResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: u32,
    pub unit_price: String,
    pub subtotal: String,
    pub total_price: String,
}

impl From<OrderItem> for OrderItemResponse {
    fn from(item: OrderItem) -> Self {
        Self {
            id: item.uuid.into(),
            product_id: item.product_uuid.into(),
            quantity: item.quantity,
            unit_price: item.unit_price.to_string(),
            subtotal: item.subtotal.to_string(),
            total_price: item.total_price.to_string(),
        }
    }
}

/// Order with its lines and delivery outlook
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderTrackingResponse {
    pub order: OrderResponse,
    pub items: Vec<OrderItemResponse>,
    pub estimated_delivery: Option<String>,
    pub is_cancellable: bool,
}

impl From<OrderTracking> for OrderTrackingResponse {
    fn from(tracking: OrderTracking) -> Self {
        Self {
            order: tracking.order.into(),
            items: tracking.items.into_iter().map(OrderItemResponse::from).collect(),
            estimated_delivery: tracking.estimated_delivery.as_ref().map(ToString::to_string),
            is_cancellable: tracking.is_cancellable,
        }
    }
}

/// Per-status order counts for one restaurant
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderStatsResponse {
    pub total_orders: u64,
    pub pending: u64,
    pub confirmed: u64,
    pub preparing: u64,
    pub in_transit: u64,
    pub delivered: u64,
    pub cancelled: u64,

    /// Summed total of every order that was not cancelled
    pub total_value: String,
}

impl From<OrderStats> for OrderStatsResponse {
    fn from(stats: OrderStats) -> Self {
        Self {
            total_orders: stats.total_orders,
            pending: stats.pending,
            confirmed: stats.confirmed,
            preparing: stats.preparing,
            in_transit: stats.in_transit,
            delivered: stats.delivered,
            cancelled: stats.cancelled,
            total_value: stats.total_value.to_string(),
        }
    }
}

/// Outcome of a submission: the created order, or why it was turned away.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct SubmitOrderResponse {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<OrderResponse>,

    /// Subtotal and delivery fee the order was admitted with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote: Option<TotalsResponse>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SubmitOrderResponse {
    pub(crate) fn submitted(order: Order, quote: OrderTotals) -> Self {
        Self {
            success: true,
            order: Some(order.into()),
            quote: Some(quote.into()),
            message: None,
        }
    }

    pub(crate) fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            order: None,
            quote: None,
            message: Some(message.into()),
        }
    }
}

/// Tracking view envelope
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderTrackingEnvelope {
    pub success: bool,
    pub data: OrderTrackingResponse,
}

/// Statistics envelope
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderStatsEnvelope {
    pub success: bool,
    pub data: OrderStatsResponse,
}

/// Outcome of a cancellation request.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CancelOrderResponse {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<OrderResponse>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
