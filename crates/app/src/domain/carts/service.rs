//! Carts service.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::Arc,
};

use tracing::{debug, warn};

use crate::domain::{
    carts::{
        errors::CartsServiceError,
        mirror::CartMirror,
        models::{Cart, CartItem, CartOwner},
        store::CartStore,
        validation::{
            self, CartItemInput, CartItemUpdate, IssueCode, MAX_QUANTITY, ValidationIssue,
            ValidationReport,
        },
    },
    pricing::{DeliveryPolicy, OrderTotals},
    products::{ProductsRepository, models::ProductUuid},
};

/// Result of a cart mutation that passed or failed input validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartUpdate {
    Applied { warnings: Vec<ValidationIssue> },
    Rejected(ValidationReport),
}

pub struct CartService {
    products: Arc<dyn ProductsRepository>,
    mirror: Arc<dyn CartMirror>,
    delivery: DeliveryPolicy,
}

impl Debug for CartService {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("CartService")
            .field("delivery", &self.delivery)
            .finish_non_exhaustive()
    }
}

impl CartService {
    #[must_use]
    pub fn new(
        products: Arc<dyn ProductsRepository>,
        mirror: Arc<dyn CartMirror>,
        delivery: DeliveryPolicy,
    ) -> Self {
        Self {
            products,
            mirror,
            delivery,
        }
    }

    #[must_use]
    pub fn delivery_policy(&self) -> DeliveryPolicy {
        self.delivery
    }

    #[must_use]
    pub fn validate_cart_item_input(&self, input: &CartItemInput) -> ValidationReport {
        validation::validate_cart_item_input(input)
    }

    /// Validate, price from the catalog, then merge the item into the cart.
    pub async fn add_item_to_cart(
        &self,
        store: &mut CartStore,
        input: CartItemInput,
    ) -> Result<CartUpdate, CartsServiceError> {
        let item = match validation::validate_cart_item(&input) {
            Ok(item) => item,
            Err(report) => return Ok(CartUpdate::Rejected(report)),
        };

        let product = self
            .products
            .get_product(item.product)
            .await?
            .ok_or(CartsServiceError::ProductNotFound)?;

        let held = store
            .cart()
            .item(item.product)
            .map_or(0, |existing| i64::from(existing.quantity));

        if held + i64::from(item.quantity) > MAX_QUANTITY {
            let mut report = ValidationReport::default();
            report.error(
                IssueCode::InvalidQuantity,
                format!("cart would hold more than {MAX_QUANTITY} of this product"),
                Some("quantity"),
            );

            return Ok(CartUpdate::Rejected(report));
        }

        let line = CartItem::new(&product, item.quantity, item.notes, store.now());

        store.add_item(line).await;

        self.sync(store).await;

        Ok(CartUpdate::Applied {
            warnings: item.warnings,
        })
    }

    /// Set an item's quantity and notes. A quantity of zero or less removes the
    /// item, which is a no-op when it is not in the cart.
    pub async fn update_cart_item(
        &self,
        store: &mut CartStore,
        update: CartItemUpdate,
    ) -> Result<CartUpdate, CartsServiceError> {
        if update.quantity <= 0 {
            if store.remove_item(update.product).await {
                self.sync(store).await;
            } else {
                debug!(product_uuid = %update.product, "removal of absent cart item ignored");
            }

            return Ok(CartUpdate::Applied {
                warnings: Vec::new(),
            });
        }

        let (quantity, warnings) = match validation::validate_cart_item_update(&update) {
            Ok(valid) => valid,
            Err(report) => return Ok(CartUpdate::Rejected(report)),
        };

        if !store
            .update_item(update.product, quantity, update.notes)
            .await
        {
            return Err(CartsServiceError::ItemNotFound);
        }

        self.sync(store).await;

        Ok(CartUpdate::Applied { warnings })
    }

    pub async fn remove_item_from_cart(
        &self,
        store: &mut CartStore,
        product: ProductUuid,
    ) -> Result<CartUpdate, CartsServiceError> {
        self.update_cart_item(
            store,
            CartItemUpdate {
                product,
                quantity: 0,
                notes: None,
            },
        )
        .await
    }

    /// Start over with an empty cart and drop the remote mirror.
    pub async fn clear_cart(&self, store: &mut CartStore) {
        store.clear_cart().await;

        self.clear_mirror(store.owner()).await;
    }

    #[must_use]
    pub fn validate_cart_for_checkout(&self, cart: &Cart) -> ValidationReport {
        validation::validate_cart_for_checkout(cart)
    }

    #[must_use]
    pub fn cart_totals(&self, cart: &Cart) -> OrderTotals {
        self.delivery.totals(cart.total_price())
    }

    pub(crate) async fn clear_mirror(&self, owner: CartOwner) {
        let Some(user) = owner.user() else {
            return;
        };

        if let Err(error) = self.mirror.clear(user).await {
            warn!(user_uuid = %user, %error, "failed to clear mirrored cart");
        }
    }

    async fn sync(&self, store: &CartStore) {
        let Some(user) = store.owner().user() else {
            return;
        };

        if let Err(error) = self.mirror.push(user, store.cart()).await {
            warn!(
                user_uuid = %user,
                cart_uuid = %store.cart().uuid,
                %error,
                "cart sync failed, keeping local cart"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use super::*;
    use crate::{
        domain::{
            carts::{
                CartSessions, CartSettings, MemoryCartStorage, MockCartMirror,
                errors::CartMirrorError, validation::IssueCode,
            },
            products::{MockProductsRepository, models::Product},
            profiles::models::UserUuid,
        },
        test::{FixedClock, product},
    };

    fn catalog(products: Vec<Product>) -> MockProductsRepository {
        let mut repository = MockProductsRepository::new();

        repository.expect_get_product().returning(move |uuid| {
            Ok(products.iter().find(|product| product.uuid == uuid).cloned())
        });

        repository
    }

    fn silent_mirror() -> MockCartMirror {
        let mut mirror = MockCartMirror::new();

        mirror.expect_push().never();
        mirror.expect_clear().never();

        mirror
    }

    async fn anonymous_store() -> CartStore {
        CartSessions::new(
            Arc::new(MemoryCartStorage::new()),
            Arc::new(FixedClock::default()),
            CartSettings::default(),
        )
        .open("session", CartOwner::Anonymous)
        .await
    }

    fn add(product: ProductUuid, quantity: i64) -> CartItemInput {
        CartItemInput {
            product_id: product.to_string(),
            quantity,
            notes: None,
        }
    }

    #[tokio::test]
    async fn adding_the_same_product_merges_and_totals_follow() -> TestResult {
        let p1 = product(10);
        let p2 = product(20);
        let service = CartService::new(
            Arc::new(catalog(vec![p1.clone(), p2.clone()])),
            Arc::new(silent_mirror()),
            DeliveryPolicy::default(),
        );
        let mut store = anonymous_store().await;

        service.add_item_to_cart(&mut store, add(p1.uuid, 2)).await?;
        service.add_item_to_cart(&mut store, add(p1.uuid, 3)).await?;

        let line = store.cart().item(p1.uuid).ok_or("missing P1")?;
        assert_eq!(store.cart().items().len(), 1);
        assert_eq!(line.quantity, 5);
        assert_eq!(line.total_price(), Decimal::from(50));

        service.add_item_to_cart(&mut store, add(p2.uuid, 1)).await?;

        assert_eq!(store.total_items(), 6);
        assert_eq!(store.total_price(), Decimal::from(70));

        Ok(())
    }

    #[tokio::test]
    async fn invalid_input_is_rejected_without_a_catalog_lookup() -> TestResult {
        let mut products = MockProductsRepository::new();
        products.expect_get_product().never();

        let service = CartService::new(
            Arc::new(products),
            Arc::new(silent_mirror()),
            DeliveryPolicy::default(),
        );
        let mut store = anonymous_store().await;

        let outcome = service
            .add_item_to_cart(&mut store, add(ProductUuid::new(), 0))
            .await?;

        let CartUpdate::Rejected(report) = outcome else {
            return Err("expected rejection".into());
        };
        assert!(report.has_error(IssueCode::InvalidQuantity));
        assert!(store.cart().is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn merge_past_the_quantity_cap_is_rejected() -> TestResult {
        let p1 = product(10);
        let service = CartService::new(
            Arc::new(catalog(vec![p1.clone()])),
            Arc::new(silent_mirror()),
            DeliveryPolicy::default(),
        );
        let mut store = anonymous_store().await;

        service.add_item_to_cart(&mut store, add(p1.uuid, 600)).await?;
        let outcome = service.add_item_to_cart(&mut store, add(p1.uuid, 600)).await?;

        let CartUpdate::Rejected(report) = outcome else {
            panic!("expected rejection, got {outcome:?}");
        };
        assert!(report.has_error(IssueCode::InvalidQuantity));
        assert_eq!(
            report.errors.first().and_then(|issue| issue.field.as_deref()),
            Some("quantity")
        );
        assert_eq!(store.cart().item(p1.uuid).map(|line| line.quantity), Some(600));

        service.add_item_to_cart(&mut store, add(p1.uuid, 400)).await?;
        assert_eq!(store.cart().item(p1.uuid).map(|line| line.quantity), Some(1000));

        Ok(())
    }

    #[tokio::test]
    async fn unknown_product_is_not_found() {
        let service = CartService::new(
            Arc::new(catalog(Vec::new())),
            Arc::new(silent_mirror()),
            DeliveryPolicy::default(),
        );
        let mut store = anonymous_store().await;

        let result = service
            .add_item_to_cart(&mut store, add(ProductUuid::new(), 1))
            .await;

        assert!(
            matches!(result, Err(CartsServiceError::ProductNotFound)),
            "expected ProductNotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn quantity_zero_removes_and_absent_updates_are_distinguished() -> TestResult {
        let p1 = product(10);
        let service = CartService::new(
            Arc::new(catalog(vec![p1.clone()])),
            Arc::new(silent_mirror()),
            DeliveryPolicy::default(),
        );
        let mut store = anonymous_store().await;

        service.add_item_to_cart(&mut store, add(p1.uuid, 1)).await?;

        let removed = service.remove_item_from_cart(&mut store, p1.uuid).await?;
        assert!(matches!(removed, CartUpdate::Applied { .. }));
        assert!(store.cart().is_empty());

        let removed_again = service.remove_item_from_cart(&mut store, p1.uuid).await?;
        assert!(matches!(removed_again, CartUpdate::Applied { .. }));

        let missing = service
            .update_cart_item(
                &mut store,
                CartItemUpdate {
                    product: p1.uuid,
                    quantity: 4,
                    notes: None,
                },
            )
            .await;
        assert!(
            matches!(missing, Err(CartsServiceError::ItemNotFound)),
            "expected ItemNotFound, got {missing:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn update_sets_quantity_and_notes() -> TestResult {
        let p1 = product(10);
        let service = CartService::new(
            Arc::new(catalog(vec![p1.clone()])),
            Arc::new(silent_mirror()),
            DeliveryPolicy::default(),
        );
        let mut store = anonymous_store().await;

        service.add_item_to_cart(&mut store, add(p1.uuid, 1)).await?;
        service
            .update_cart_item(
                &mut store,
                CartItemUpdate {
                    product: p1.uuid,
                    quantity: 7,
                    notes: Some("ripe".to_string()),
                },
            )
            .await?;

        let line = store.cart().item(p1.uuid).ok_or("missing P1")?;
        assert_eq!(line.quantity, 7);
        assert_eq!(line.notes.as_deref(), Some("ripe"));
        assert_eq!(store.total_price(), Decimal::from(70));

        Ok(())
    }

    #[tokio::test]
    async fn authenticated_mutations_are_mirrored_and_failures_swallowed() -> TestResult {
        let p1 = product(10);
        let user = UserUuid::new();

        let mut mirror = MockCartMirror::new();
        mirror
            .expect_push()
            .times(2)
            .withf(move |pushed, _| *pushed == user)
            .returning(|_, _| Err(CartMirrorError::Sql(sqlx::Error::PoolTimedOut)));
        mirror
            .expect_clear()
            .once()
            .withf(move |cleared| *cleared == user)
            .return_once(|_| Ok(()));

        let service = CartService::new(
            Arc::new(catalog(vec![p1.clone()])),
            Arc::new(mirror),
            DeliveryPolicy::default(),
        );
        let mut store = CartSessions::new(
            Arc::new(MemoryCartStorage::new()),
            Arc::new(FixedClock::default()),
            CartSettings::default(),
        )
        .open("session", CartOwner::User(user))
        .await;

        service.add_item_to_cart(&mut store, add(p1.uuid, 2)).await?;
        service.add_item_to_cart(&mut store, add(p1.uuid, 1)).await?;
        service.clear_cart(&mut store).await;

        assert!(store.cart().is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn totals_apply_the_delivery_policy() -> TestResult {
        let p1 = product(100);
        let service = CartService::new(
            Arc::new(catalog(vec![p1.clone()])),
            Arc::new(silent_mirror()),
            DeliveryPolicy::default(),
        );
        let mut store = anonymous_store().await;

        service.add_item_to_cart(&mut store, add(p1.uuid, 4)).await?;

        let totals = service.cart_totals(store.cart());
        assert_eq!(totals.delivery_fee, Decimal::from(25));
        assert_eq!(totals.total, Decimal::from(425));

        service.add_item_to_cart(&mut store, add(p1.uuid, 1)).await?;

        let totals = service.cart_totals(store.cart());
        assert!(totals.free_delivery);
        assert_eq!(totals.total, Decimal::from(500));

        Ok(())
    }
}
