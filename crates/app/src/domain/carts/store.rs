//! Cart Store
//!
//! The in-process cart for one browsing session. Mutations apply in memory
//! first; the full record is then written to [`CartStorage`] on a best-effort
//! basis, so an unavailable backend never fails a mutation.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::Arc,
};

use jiff::{SignedDuration, Timestamp};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::{
    clock::Clock,
    domain::{
        carts::{
            models::{Cart, CartItem, CartOwner, CartStatus},
            errors::CartStorageError,
            storage::{CartStorage, FileCartStorage},
        },
        products::models::ProductUuid,
    },
};

/// Prefix of every persisted cart key.
pub const CART_STORAGE_PREFIX: &str = "larder.cart";

/// Storage key of the cart belonging to a browsing session.
#[must_use]
pub fn storage_key(session: &str) -> String {
    format!("{CART_STORAGE_PREFIX}:{session}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartSettings {
    /// Hard expiry horizon, re-derived from the time of each mutation.
    pub ttl: SignedDuration,
}

impl Default for CartSettings {
    fn default() -> Self {
        Self {
            ttl: SignedDuration::from_hours(24),
        }
    }
}

pub struct CartStore {
    key: String,
    cart: Cart,
    storage: Arc<dyn CartStorage>,
    clock: Arc<dyn Clock>,
    ttl: SignedDuration,
}

impl Debug for CartStore {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("CartStore")
            .field("key", &self.key)
            .field("cart", &self.cart)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Load the persisted cart under `key`, or start an empty one.
    ///
    /// Records that are expired, unreadable, already submitted or owned by a
    /// different user are treated as absent. An anonymous cart is claimed by
    /// the user who logs in on the same session.
    pub async fn open(
        key: String,
        owner: CartOwner,
        storage: Arc<dyn CartStorage>,
        clock: Arc<dyn Clock>,
        settings: CartSettings,
    ) -> Self {
        let now = clock.now();

        let restored = match storage.load(&key).await {
            Ok(Some(raw)) => restore(&key, &raw, owner, now),
            Ok(None) => None,
            Err(error) => {
                warn!(cart.key = %key, %error, "cart storage unavailable, starting empty");
                None
            }
        };

        let cart = restored.unwrap_or_else(|| Cart::new(owner, now, settings.ttl));

        Self {
            key,
            cart,
            storage,
            clock,
            ttl: settings.ttl,
        }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    #[must_use]
    pub fn owner(&self) -> CartOwner {
        self.cart.owner
    }

    #[must_use]
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.cart.total_items()
    }

    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.cart.total_price()
    }

    /// Add a line, merging quantities with an existing line for the product.
    pub async fn add_item(&mut self, item: CartItem) {
        self.cart.add_item(item);
        self.commit().await;
    }

    /// Returns `false` (and changes nothing) when the product is not in the cart.
    pub async fn remove_item(&mut self, product: ProductUuid) -> bool {
        let removed = self.cart.remove_item(product);

        if removed {
            self.commit().await;
        }

        removed
    }

    /// Set a line's quantity outright; zero removes the line.
    ///
    /// Returns `false` when the product is not in the cart.
    pub async fn update_quantity(&mut self, product: ProductUuid, quantity: u32) -> bool {
        self.update_item(product, quantity, None).await
    }

    /// Set a line's quantity and, when given, its notes; zero removes the line.
    pub async fn update_item(
        &mut self,
        product: ProductUuid,
        quantity: u32,
        notes: Option<String>,
    ) -> bool {
        if quantity == 0 {
            return self.remove_item(product).await;
        }

        let now = self.clock.now();
        let updated = self.cart.update_item(product, quantity, notes, now);

        if updated {
            self.commit().await;
        }

        updated
    }

    /// Replace the cart with an empty one for the same owner.
    pub async fn clear_cart(&mut self) {
        self.cart = Cart::new(self.cart.owner, self.clock.now(), self.ttl);
        self.persist().await;
    }

    /// Persist the cart as submitted and continue with a fresh one.
    ///
    /// Returns the submitted snapshot.
    pub async fn mark_submitted(&mut self) -> Cart {
        self.cart.status = CartStatus::Submitted;
        self.commit().await;

        let fresh = Cart::new(self.cart.owner, self.clock.now(), self.ttl);

        std::mem::replace(&mut self.cart, fresh)
    }

    async fn commit(&mut self) {
        self.cart.touch(self.clock.now(), self.ttl);
        self.persist().await;
    }

    async fn persist(&self) {
        let raw = match serde_json::to_string(&self.cart) {
            Ok(raw) => raw,
            Err(error) => {
                warn!(cart.key = %self.key, %error, "failed to encode cart");
                return;
            }
        };

        if let Err(error) = self.storage.save(&self.key, &raw).await {
            warn!(cart.key = %self.key, %error, "failed to persist cart");
        }
    }
}

fn restore(key: &str, raw: &str, owner: CartOwner, now: Timestamp) -> Option<Cart> {
    let mut cart = match serde_json::from_str::<Cart>(raw) {
        Ok(cart) => cart,
        Err(error) => {
            warn!(cart.key = %key, %error, "discarding unreadable cart record");
            return None;
        }
    };

    if cart.is_expired(now) {
        debug!(cart.key = %key, expires_at = %cart.expires_at, "discarding expired cart");
        return None;
    }

    if cart.status == CartStatus::Submitted {
        return None;
    }

    match (cart.owner, owner) {
        (stored, current) if stored == current => Some(cart),
        (CartOwner::Anonymous, CartOwner::User(_)) => {
            cart.owner = owner;
            Some(cart)
        }
        _ => {
            debug!(cart.key = %key, "discarding cart owned by another user");
            None
        }
    }
}

/// Opens the cart store for a browsing session.
#[derive(Clone)]
pub struct CartSessions {
    storage: Arc<dyn CartStorage>,
    clock: Arc<dyn Clock>,
    settings: CartSettings,
}

impl Debug for CartSessions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("CartSessions")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl CartSessions {
    #[must_use]
    pub fn new(
        storage: Arc<dyn CartStorage>,
        clock: Arc<dyn Clock>,
        settings: CartSettings,
    ) -> Self {
        Self {
            storage,
            clock,
            settings,
        }
    }

    pub async fn open(&self, session: &str, owner: CartOwner) -> CartStore {
        CartStore::open(
            storage_key(session),
            owner,
            Arc::clone(&self.storage),
            Arc::clone(&self.clock),
            self.settings,
        )
        .await
    }
}

/// Counts from one sweep of a cart directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneReport {
    pub kept: usize,
    pub removed: usize,
}

/// Delete records that [`CartStore::open`] would discard anyway: expired,
/// submitted or unreadable.
pub async fn prune_stale_carts(
    storage: &FileCartStorage,
    now: Timestamp,
) -> Result<PruneReport, CartStorageError> {
    let mut report = PruneReport::default();

    for key in storage.keys().await? {
        let Some(raw) = storage.load(&key).await? else {
            continue;
        };

        if is_stale(&raw, now) {
            storage.remove(&key).await?;
            debug!(cart.key = %key, "pruned stale cart");

            report.removed += 1;
        } else {
            report.kept += 1;
        }
    }

    Ok(report)
}

fn is_stale(raw: &str, now: Timestamp) -> bool {
    match serde_json::from_str::<Cart>(raw) {
        Ok(cart) => cart.is_expired(now) || cart.status == CartStatus::Submitted,
        Err(_unreadable) => true,
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use testresult::TestResult;

    use super::*;
    use crate::{
        domain::{
            carts::{MockCartStorage, storage::MemoryCartStorage},
            profiles::models::UserUuid,
        },
        test::{FixedClock, product},
    };

    fn sessions(storage: Arc<dyn CartStorage>, clock: Arc<FixedClock>) -> CartSessions {
        CartSessions::new(storage, clock, CartSettings::default())
    }

    #[tokio::test]
    async fn mutations_survive_a_reload() -> TestResult {
        let storage = Arc::new(MemoryCartStorage::new());
        let clock = Arc::new(FixedClock::default());
        let sessions = sessions(storage, clock);
        let p1 = product(10);

        let mut store = sessions.open("s1", CartOwner::Anonymous).await;
        store.add_item(CartItem::new(&p1, 2, None, store.now())).await;

        let reloaded = sessions.open("s1", CartOwner::Anonymous).await;

        assert_eq!(reloaded.cart().uuid, store.cart().uuid);
        assert_eq!(reloaded.total_items(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn expired_cart_is_treated_as_absent() {
        let storage = Arc::new(MemoryCartStorage::new());
        let clock = Arc::new(FixedClock::default());
        let sessions = sessions(storage, Arc::clone(&clock));
        let p1 = product(10);

        let mut store = sessions.open("s1", CartOwner::Anonymous).await;
        store.add_item(CartItem::new(&p1, 1, None, store.now())).await;
        let expired_uuid = store.cart().uuid;

        clock.advance(SignedDuration::from_hours(25));

        let mut revived = sessions.open("s1", CartOwner::Anonymous).await;
        assert!(revived.cart().is_empty(), "expired cart must not be revived");

        revived.add_item(CartItem::new(&p1, 1, None, revived.now())).await;
        assert_ne!(revived.cart().uuid, expired_uuid);
        assert_eq!(revived.total_items(), 1);
    }

    #[tokio::test]
    async fn mutation_refreshes_expiry() {
        let storage = Arc::new(MemoryCartStorage::new());
        let clock = Arc::new(FixedClock::default());
        let sessions = sessions(storage, Arc::clone(&clock));
        let p1 = product(10);

        let mut store = sessions.open("s1", CartOwner::Anonymous).await;
        store.add_item(CartItem::new(&p1, 1, None, store.now())).await;

        clock.advance(SignedDuration::from_hours(20));
        store.add_item(CartItem::new(&p1, 1, None, store.now())).await;

        clock.advance(SignedDuration::from_hours(20));
        let reloaded = sessions.open("s1", CartOwner::Anonymous).await;

        assert_eq!(reloaded.total_items(), 2);
    }

    #[tokio::test]
    async fn corrupt_record_is_discarded() -> TestResult {
        let storage = Arc::new(MemoryCartStorage::new());
        storage.save(&storage_key("s1"), "{not json").await?;

        let store = sessions(storage, Arc::new(FixedClock::default()))
            .open("s1", CartOwner::Anonymous)
            .await;

        assert!(store.cart().is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn anonymous_cart_is_claimed_on_login_but_not_shared_between_users() {
        let storage = Arc::new(MemoryCartStorage::new());
        let sessions = sessions(storage, Arc::new(FixedClock::default()));
        let alice = CartOwner::User(UserUuid::new());
        let bob = CartOwner::User(UserUuid::new());
        let p1 = product(10);

        let mut store = sessions.open("s1", CartOwner::Anonymous).await;
        store.add_item(CartItem::new(&p1, 3, None, store.now())).await;

        let mut claimed = sessions.open("s1", alice).await;
        assert_eq!(claimed.owner(), alice);
        assert_eq!(claimed.total_items(), 3);
        claimed.add_item(CartItem::new(&p1, 1, None, claimed.now())).await;

        let other = sessions.open("s1", bob).await;
        assert!(other.cart().is_empty(), "bob must not see alice's cart");
    }

    #[tokio::test]
    async fn update_quantity_sets_without_merging_and_zero_removes() {
        let storage = Arc::new(MemoryCartStorage::new());
        let sessions = sessions(storage, Arc::new(FixedClock::default()));
        let p1 = product(10);

        let mut store = sessions.open("s1", CartOwner::Anonymous).await;
        store.add_item(CartItem::new(&p1, 4, None, store.now())).await;

        assert!(store.update_quantity(p1.uuid, 2).await);
        assert_eq!(store.total_items(), 2);

        assert!(store.update_quantity(p1.uuid, 0).await);
        assert!(store.cart().is_empty());

        assert!(!store.update_quantity(p1.uuid, 5).await, "absent product is a no-op");
        assert!(!store.remove_item(p1.uuid).await, "absent product is a no-op");
        assert!(store.cart().is_empty());
    }

    #[tokio::test]
    async fn clear_keeps_the_owner() {
        let storage = Arc::new(MemoryCartStorage::new());
        let sessions = sessions(storage, Arc::new(FixedClock::default()));
        let alice = CartOwner::User(UserUuid::new());
        let p1 = product(10);

        let mut store = sessions.open("s1", alice).await;
        store.add_item(CartItem::new(&p1, 1, None, store.now())).await;
        store.clear_cart().await;

        assert!(store.cart().is_empty());
        assert_eq!(store.owner(), alice);
        assert_eq!(store.total_price(), Decimal::ZERO);
    }

    #[tokio::test]
    async fn submitted_cart_is_replaced_and_not_restored() {
        let storage = Arc::new(MemoryCartStorage::new());
        let sessions = sessions(storage, Arc::new(FixedClock::default()));
        let p1 = product(10);

        let mut store = sessions.open("s1", CartOwner::Anonymous).await;
        store.add_item(CartItem::new(&p1, 2, None, store.now())).await;

        let submitted = store.mark_submitted().await;

        assert_eq!(submitted.status, CartStatus::Submitted);
        assert_eq!(submitted.total_items(), 2);
        assert!(store.cart().is_empty());
        assert_ne!(store.cart().uuid, submitted.uuid);

        let reloaded = sessions.open("s1", CartOwner::Anonymous).await;
        assert!(reloaded.cart().is_empty());
    }

    #[tokio::test]
    async fn unavailable_storage_does_not_fail_mutations() {
        let mut storage = MockCartStorage::new();

        storage
            .expect_load()
            .return_once(|_| Err(CartStorageError::Io(io::Error::other("disk gone"))));
        storage
            .expect_save()
            .times(1)
            .returning(|_, _| Err(CartStorageError::Io(io::Error::other("disk gone"))));

        let sessions = sessions(Arc::new(storage), Arc::new(FixedClock::default()));
        let p1 = product(10);

        let mut store = sessions.open("s1", CartOwner::Anonymous).await;
        store.add_item(CartItem::new(&p1, 2, None, store.now())).await;

        assert_eq!(store.total_items(), 2);
        assert_eq!(store.total_price(), Decimal::from(20));
    }

    #[tokio::test]
    async fn pruning_keeps_only_live_active_carts() -> TestResult {
        let dir = tempfile::tempdir()?;
        let files = Arc::new(FileCartStorage::new(dir.path()));
        let clock = Arc::new(FixedClock::default());
        let sessions = sessions(Arc::<FileCartStorage>::clone(&files), Arc::clone(&clock));

        let mut early = sessions.open("early", CartOwner::Anonymous).await;
        early
            .add_item(CartItem::new(&product(10), 1, None, early.now()))
            .await;

        let mut submitted = sessions.open("submitted", CartOwner::Anonymous).await;
        submitted
            .add_item(CartItem::new(&product(10), 1, None, submitted.now()))
            .await;
        submitted.mark_submitted().await;

        files.save(&storage_key("garbage"), "not json").await?;

        clock.advance(SignedDuration::from_hours(2));

        let mut recent = sessions.open("recent", CartOwner::Anonymous).await;
        recent
            .add_item(CartItem::new(&product(10), 1, None, recent.now()))
            .await;

        // The early cart has lapsed by now, the recent one has an hour left
        let now = clock.now() + SignedDuration::from_hours(23);
        let report = prune_stale_carts(&files, now).await?;

        assert_eq!(report, PruneReport { kept: 1, removed: 3 });
        assert_eq!(files.keys().await?, ["larder.cart_recent"]);

        Ok(())
    }
}
