//! Order submission.
//!
//! Business-level admission control in front of [`OrderCreationService`], plus
//! tracking, cancellation and per-restaurant statistics.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::Arc,
};

use async_trait::async_trait;
use jiff::{SignedDuration, Timestamp};
use mockall::automock;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    clock::Clock,
    domain::{
        carts::validation::MAX_QUANTITY,
        orders::{
            creation::{OrderCreationService, OrderLine, OrderRequest},
            errors::{AuthorizationError, OrderCreationError, OrdersServiceError},
            models::{
                Order, OrderLineInput, OrderPriority, OrderStats, OrderStatus,
                OrderSubmissionInput, OrderTracking, OrderUuid,
            },
            repository::OrdersRepository,
        },
        pricing::{DeliveryPolicy, OrderTotals},
        products::{ProductsRepository, models::ProductUuid},
        profiles::{
            ProfilesRepository,
            models::{RestaurantUuid, UserUuid},
        },
    },
};

const URGENT_DELIVERY_WINDOW: SignedDuration = SignedDuration::from_hours(4);
const NORMAL_DELIVERY_WINDOW: SignedDuration = SignedDuration::from_hours(24);

/// Server-wide ordering policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderingPolicy {
    pub enable_notifications: bool,
    pub auto_confirm: bool,
    pub rush_delivery_available: bool,
    pub require_delivery_address: bool,
    pub min_order_value: Decimal,
    pub max_order_value: Decimal,
}

impl Default for OrderingPolicy {
    fn default() -> Self {
        Self {
            enable_notifications: false,
            auto_confirm: false,
            rush_delivery_available: true,
            require_delivery_address: true,
            min_order_value: Decimal::ZERO,
            max_order_value: Decimal::from(100_000),
        }
    }
}

impl OrderingPolicy {
    /// Bind the policy to the restaurant and user of one call.
    #[must_use]
    pub fn config_for(
        self,
        restaurant: Option<RestaurantUuid>,
        user: Option<UserUuid>,
    ) -> SubmissionConfig {
        SubmissionConfig {
            restaurant,
            user,
            enable_notifications: self.enable_notifications,
            auto_confirm: self.auto_confirm,
            rush_delivery_available: self.rush_delivery_available,
            require_delivery_address: self.require_delivery_address,
            max_order_value: self.max_order_value,
            min_order_value: self.min_order_value,
        }
    }
}

/// Capabilities and limits for one submission or cancellation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionConfig {
    pub restaurant: Option<RestaurantUuid>,
    pub user: Option<UserUuid>,
    pub enable_notifications: bool,
    pub auto_confirm: bool,
    pub rush_delivery_available: bool,
    pub require_delivery_address: bool,
    pub max_order_value: Decimal,
    pub min_order_value: Decimal,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        OrderingPolicy::default().config_for(None, None)
    }
}

/// Why a submission was turned away before anything was written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionRejection {
    #[error("restaurantId is required")]
    MissingRestaurant,

    #[error("order must contain at least one item")]
    NoItems,

    #[error("quantity for product {product} must be between 1 and {MAX_QUANTITY}")]
    InvalidQuantity { product: ProductUuid },

    #[error("unit price for product {product} must not be negative")]
    InvalidUnitPrice { product: ProductUuid },

    #[error("deliveryAddress is required")]
    MissingDeliveryAddress,

    #[error("rush delivery is not available")]
    RushUnavailable,

    #[error("requestedDeliveryTime must be in the future")]
    DeliveryTimeNotInFuture,

    #[error("product {0} not found")]
    UnknownProduct(ProductUuid),

    #[error("order value {value} is below the minimum of {minimum}")]
    BelowMinimum { value: Decimal, minimum: Decimal },

    #[error("order value {value} exceeds the maximum of {maximum}")]
    AboveMaximum { value: Decimal, maximum: Decimal },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Submitted { order: Order, quote: OrderTotals },
    Rejected(SubmissionRejection),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CancellationRejection {
    #[error("order can no longer be cancelled (status: {0})")]
    NotCancellable(OrderStatus),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancellationOutcome {
    Cancelled(Order),
    Rejected(CancellationRejection),
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Admit and durably create an order. Policy failures are returned as
    /// [`SubmissionOutcome::Rejected`].
    async fn submit_order(
        &self,
        config: SubmissionConfig,
        input: OrderSubmissionInput,
    ) -> Result<SubmissionOutcome, OrdersServiceError>;

    /// Status-facing view of an order; `None` when the order exists but has
    /// nothing to present.
    async fn track_order(&self, order: OrderUuid)
    -> Result<Option<OrderTracking>, OrdersServiceError>;

    /// Restaurant an order belongs to, if the order exists.
    async fn find_order_restaurant(
        &self,
        order: OrderUuid,
    ) -> Result<Option<RestaurantUuid>, OrdersServiceError>;

    async fn cancel_order(
        &self,
        config: SubmissionConfig,
        order: OrderUuid,
        reason: Option<String>,
    ) -> Result<CancellationOutcome, OrdersServiceError>;

    async fn order_stats(&self, restaurant: RestaurantUuid)
    -> Result<OrderStats, OrdersServiceError>;
}

pub struct OrderSubmissionService {
    orders: Arc<dyn OrdersRepository>,
    products: Arc<dyn ProductsRepository>,
    creation: OrderCreationService,
    delivery: DeliveryPolicy,
    clock: Arc<dyn Clock>,
}

impl Debug for OrderSubmissionService {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("OrderSubmissionService")
            .field("delivery", &self.delivery)
            .field("creation", &self.creation)
            .finish_non_exhaustive()
    }
}

impl OrderSubmissionService {
    #[must_use]
    pub fn new(
        orders: Arc<dyn OrdersRepository>,
        products: Arc<dyn ProductsRepository>,
        profiles: Arc<dyn ProfilesRepository>,
        delivery: DeliveryPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            creation: OrderCreationService::new(
                Arc::clone(&orders),
                profiles,
                Arc::clone(&clock),
            ),
            orders,
            products,
            delivery,
            clock,
        }
    }

    /// Price every line, preferring the submitted unit price over the catalog.
    async fn order_value(
        &self,
        lines: &[OrderLineInput],
    ) -> Result<Result<Decimal, SubmissionRejection>, OrdersServiceError> {
        let mut value = Decimal::ZERO;

        for line in lines {
            let unit_price = match line.unit_price {
                Some(price) => price,
                None => match self.products.get_product(line.product_uuid).await? {
                    Some(product) => product.unit_price,
                    None => {
                        return Ok(Err(SubmissionRejection::UnknownProduct(
                            line.product_uuid,
                        )));
                    }
                },
            };

            value += unit_price * Decimal::from(line.quantity);
        }

        Ok(Ok(value))
    }

    async fn confirm(&self, order: Order) -> Order {
        match self
            .orders
            .update_order_status(order.uuid, OrderStatus::Confirmed, self.clock.now())
            .await
        {
            Ok(Some(confirmed)) => confirmed,
            Ok(None) => {
                warn!(order_uuid = %order.uuid, "order vanished before auto-confirmation");
                order
            }
            Err(error) => {
                warn!(order_uuid = %order.uuid, %error, "auto-confirmation failed, order left pending");
                order
            }
        }
    }
}

fn admit_lines(
    config: &SubmissionConfig,
    input: &OrderSubmissionInput,
    now: Timestamp,
) -> Result<Vec<OrderLine>, SubmissionRejection> {
    if input.items.is_empty() {
        return Err(SubmissionRejection::NoItems);
    }

    let lines = input
        .items
        .iter()
        .map(|line| {
            if line.unit_price.is_some_and(|price| price < Decimal::ZERO) {
                return Err(SubmissionRejection::InvalidUnitPrice {
                    product: line.product_uuid,
                });
            }

            Some(line.quantity)
                .filter(|quantity| (1..=MAX_QUANTITY).contains(quantity))
                .and_then(|quantity| u32::try_from(quantity).ok())
                .map(|quantity| OrderLine {
                    product_uuid: line.product_uuid,
                    quantity,
                })
                .ok_or(SubmissionRejection::InvalidQuantity {
                    product: line.product_uuid,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let has_address = input
        .delivery_address
        .as_deref()
        .is_some_and(|address| !address.trim().is_empty());

    if config.require_delivery_address && !has_address {
        return Err(SubmissionRejection::MissingDeliveryAddress);
    }

    if input.priority == OrderPriority::Urgent && !config.rush_delivery_available {
        return Err(SubmissionRejection::RushUnavailable);
    }

    if input
        .requested_delivery_time
        .is_some_and(|requested| requested <= now)
    {
        return Err(SubmissionRejection::DeliveryTimeNotInFuture);
    }

    Ok(lines)
}

fn estimated_delivery(order: &Order) -> Option<Timestamp> {
    if matches!(order.status, OrderStatus::Cancelled | OrderStatus::Delivered) {
        return None;
    }

    if let Some(requested) = order.requested_delivery_time {
        return Some(requested);
    }

    let window = match order.priority {
        OrderPriority::Urgent => URGENT_DELIVERY_WINDOW,
        OrderPriority::Normal => NORMAL_DELIVERY_WINDOW,
    };

    order.created_at.checked_add(window).ok()
}

fn notify(event: &'static str, order: &Order) {
    info!(
        target: "order.notification",
        event,
        order_uuid = %order.uuid,
        restaurant_uuid = %order.restaurant_uuid,
        status = %order.status,
        "order notification"
    );
}

#[async_trait]
impl OrdersService for OrderSubmissionService {
    async fn submit_order(
        &self,
        config: SubmissionConfig,
        input: OrderSubmissionInput,
    ) -> Result<SubmissionOutcome, OrdersServiceError> {
        let Some(restaurant) = input.restaurant_uuid.or(config.restaurant) else {
            return Ok(SubmissionOutcome::Rejected(
                SubmissionRejection::MissingRestaurant,
            ));
        };

        let lines = match admit_lines(&config, &input, self.clock.now()) {
            Ok(lines) => lines,
            Err(rejection) => return Ok(SubmissionOutcome::Rejected(rejection)),
        };

        let value = match self.order_value(&input.items).await? {
            Ok(value) => value,
            Err(rejection) => return Ok(SubmissionOutcome::Rejected(rejection)),
        };

        if value < config.min_order_value {
            return Ok(SubmissionOutcome::Rejected(
                SubmissionRejection::BelowMinimum {
                    value,
                    minimum: config.min_order_value,
                },
            ));
        }

        if value > config.max_order_value {
            return Ok(SubmissionOutcome::Rejected(
                SubmissionRejection::AboveMaximum {
                    value,
                    maximum: config.max_order_value,
                },
            ));
        }

        let user = config
            .user
            .ok_or(OrderCreationError::Unauthorized(AuthorizationError::Anonymous))?;

        let mut order = self
            .creation
            .create_order(OrderRequest {
                restaurant_uuid: restaurant,
                created_by: user,
                priority: input.priority,
                delivery_address: input.delivery_address,
                contact_phone: input.contact_phone,
                special_instructions: input.special_instructions,
                requested_delivery_time: input.requested_delivery_time,
                lines,
            })
            .await?;

        if config.auto_confirm {
            order = self.confirm(order).await;
        }

        if config.enable_notifications {
            notify("order.created", &order);
        }

        Ok(SubmissionOutcome::Submitted {
            order,
            quote: self.delivery.totals(value),
        })
    }

    async fn track_order(
        &self,
        order: OrderUuid,
    ) -> Result<Option<OrderTracking>, OrdersServiceError> {
        let header = self
            .orders
            .get_order(order)
            .await?
            .ok_or(OrdersServiceError::NotFound)?;

        let items = self.orders.get_order_items(order).await?;

        if items.is_empty() {
            warn!(order_uuid = %order, "order has no items to present");
            return Ok(None);
        }

        Ok(Some(OrderTracking {
            estimated_delivery: estimated_delivery(&header),
            pricing_phase: header.pricing_phase(),
            is_cancellable: header.status.is_cancellable(),
            order: header,
            items,
        }))
    }

    async fn find_order_restaurant(
        &self,
        order: OrderUuid,
    ) -> Result<Option<RestaurantUuid>, OrdersServiceError> {
        Ok(self
            .orders
            .get_order(order)
            .await?
            .map(|order| order.restaurant_uuid))
    }

    async fn cancel_order(
        &self,
        config: SubmissionConfig,
        order: OrderUuid,
        reason: Option<String>,
    ) -> Result<CancellationOutcome, OrdersServiceError> {
        let user = config
            .user
            .ok_or(OrderCreationError::Unauthorized(AuthorizationError::Anonymous))?;

        let current = self
            .orders
            .get_order(order)
            .await?
            .ok_or(OrdersServiceError::NotFound)?;

        self.creation
            .authorize(user, current.restaurant_uuid)
            .await?;

        if !current.status.is_cancellable() {
            return Ok(CancellationOutcome::Rejected(
                CancellationRejection::NotCancellable(current.status),
            ));
        }

        let reason = reason
            .map(|reason| reason.trim().to_string())
            .filter(|reason| !reason.is_empty());

        let Some(cancelled) = self
            .orders
            .cancel_order(order, reason, self.clock.now())
            .await?
        else {
            // Progressed past pre-fulfillment between the read and the update.
            let status = self
                .orders
                .get_order(order)
                .await?
                .ok_or(OrdersServiceError::NotFound)?
                .status;

            return Ok(CancellationOutcome::Rejected(
                CancellationRejection::NotCancellable(status),
            ));
        };

        if config.enable_notifications {
            notify("order.cancelled", &cancelled);
        }

        Ok(CancellationOutcome::Cancelled(cancelled))
    }

    async fn order_stats(
        &self,
        restaurant: RestaurantUuid,
    ) -> Result<OrderStats, OrdersServiceError> {
        let counts = self.orders.order_status_counts(restaurant).await?;

        Ok(OrderStats::from_counts(&counts))
    }
}
