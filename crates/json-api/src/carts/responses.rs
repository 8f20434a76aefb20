//! Cart response bodies.

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use larder_app::domain::{
    carts::{
        models::{Cart, CartItem, CartOwner},
        validation::{ValidationIssue, ValidationReport},
    },
    orders::models::Order,
    pricing::OrderTotals,
};

use crate::{
    orders::responses::OrderResponse,
    responses::{IssueResponse, TotalsResponse, issues},
};

/// Cart Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CartResponse {
    pub id: Uuid,

    /// User id, or `anonymous`
    pub owner_id: String,

    /// `active` or `submitted`
    pub status: String,

    pub items: Vec<CartItemResponse>,
    pub total_items: u64,
    pub total_price: String,

    /// Delivery fee and grand total under the current delivery policy
    pub totals: TotalsResponse,

    pub created_at: String,
    pub updated_at: String,
    pub expires_at: String,
}

impl CartResponse {
    pub(crate) fn new(cart: &Cart, totals: OrderTotals) -> Self {
        Self {
            id: cart.uuid.into(),
            owner_id: match cart.owner {
                CartOwner::User(user) => user.to_string(),
                CartOwner::Anonymous => "anonymous".to_owned(),
            },
            status: cart.status.as_str().to_owned(),
            items: cart.items().iter().map(CartItemResponse::from).collect(),
            total_items: cart.total_items(),
            total_price: cart.total_price().to_string(),
            totals: totals.into(),
            created_at: cart.created_at.to_string(),
            updated_at: cart.updated_at.to_string(),
            expires_at: cart.expires_at.to_string(),
        }
    }
}

/// Cart Item Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CartItemResponse {
    pub product_id: Uuid,
    pub name: String,
    pub unit: String,
    pub category: String,
    pub image_url: Option<String>,
    pub quantity: u32,

    /// Price when the item was first added
    pub unit_price: String,

    pub total_price: String,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&CartItem> for CartItemResponse {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product_uuid.into(),
            name: item.product.name.clone(),
            unit: item.product.unit.clone(),
            category: item.product.category.clone(),
            image_url: item.product.image_url.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price.to_string(),
            total_price: item.total_price().to_string(),
            notes: item.notes.clone(),
            created_at: item.created_at.to_string(),
            updated_at: item.updated_at.to_string(),
        }
    }
}

/// The cart after a read or change, or the reasons a change was refused.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartEnvelope {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<CartResponse>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<IssueResponse>,

    /// Accepted, but worth a second look
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<IssueResponse>,
}

impl CartEnvelope {
    pub(crate) fn cart(cart: &Cart, totals: OrderTotals, warnings: &[ValidationIssue]) -> Self {
        Self {
            success: true,
            data: Some(CartResponse::new(cart, totals)),
            message: None,
            errors: Vec::new(),
            warnings: issues(warnings),
        }
    }

    pub(crate) fn invalid(message: &str, report: &ValidationReport) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.to_owned()),
            errors: issues(&report.errors),
            warnings: issues(&report.warnings),
        }
    }
}

/// Outcome of checking out the session cart.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CheckoutResponse {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<OrderResponse>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote: Option<TotalsResponse>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<IssueResponse>,
}

impl CheckoutResponse {
    pub(crate) fn submitted(order: Order, quote: OrderTotals) -> Self {
        Self {
            success: true,
            order: Some(order.into()),
            quote: Some(quote.into()),
            message: None,
            errors: Vec::new(),
        }
    }

    pub(crate) fn failed(message: String, errors: Vec<IssueResponse>) -> Self {
        Self {
            success: false,
            order: None,
            quote: None,
            message: Some(message),
            errors,
        }
    }
}
