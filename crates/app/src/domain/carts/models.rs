//! Cart Models

use jiff::{SignedDuration, Timestamp};
use rust_decimal::Decimal;
use serde::{
    Deserialize, Deserializer, Serialize, Serializer, de::Error as _, ser::SerializeStruct,
};

use crate::{
    domain::{
        products::models::{Product, ProductUuid},
        profiles::models::UserUuid,
    },
    uuids::TypedUuid,
};

/// Cart UUID
pub type CartUuid = TypedUuid<Cart>;

const ANONYMOUS_OWNER: &str = "anonymous";

/// Who a cart belongs to. Persisted as the user id, or `"anonymous"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CartOwner {
    User(UserUuid),
    Anonymous,
}

impl CartOwner {
    #[must_use]
    pub const fn user(self) -> Option<UserUuid> {
        match self {
            Self::User(user) => Some(user),
            Self::Anonymous => None,
        }
    }
}

impl From<Option<UserUuid>> for CartOwner {
    fn from(user: Option<UserUuid>) -> Self {
        user.map_or(Self::Anonymous, Self::User)
    }
}

impl Serialize for CartOwner {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::User(user) => user.serialize(serializer),
            Self::Anonymous => serializer.serialize_str(ANONYMOUS_OWNER),
        }
    }
}

impl<'de> Deserialize<'de> for CartOwner {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;

        if raw == ANONYMOUS_OWNER {
            return Ok(Self::Anonymous);
        }

        raw.parse().map(Self::User).map_err(D::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CartStatus {
    Active,
    Submitted,
}

impl CartStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Submitted => "submitted",
        }
    }
}

/// Product details copied into the cart when the item was first added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSnapshot {
    pub name: String,
    pub unit_price: Decimal,
    pub unit: String,
    pub category: String,
    pub image_url: Option<String>,
}

impl From<&Product> for ProductSnapshot {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            unit_price: product.unit_price,
            unit: product.unit.clone(),
            category: product.category.clone(),
            image_url: product.image_url.clone(),
        }
    }
}

/// CartItem Model
///
/// `totalPrice` is written alongside the stored fields and ignored on load.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    #[serde(rename = "productId")]
    pub product_uuid: ProductUuid,
    #[serde(rename = "productSnapshot")]
    pub product: ProductSnapshot,
    pub quantity: u32,
    pub unit_price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CartItem {
    /// New line priced from the product as it is right now.
    #[must_use]
    pub fn new(product: &Product, quantity: u32, notes: Option<String>, now: Timestamp) -> Self {
        Self {
            product_uuid: product.uuid,
            product: ProductSnapshot::from(product),
            quantity,
            unit_price: product.unit_price,
            notes,
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

impl Serialize for CartItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut item = serializer.serialize_struct("CartItem", 8)?;

        item.serialize_field("productId", &self.product_uuid)?;
        item.serialize_field("productSnapshot", &self.product)?;
        item.serialize_field("quantity", &self.quantity)?;
        item.serialize_field("unitPrice", &self.unit_price)?;
        if let Some(notes) = &self.notes {
            item.serialize_field("notes", notes)?;
        } else {
            item.skip_field("notes")?;
        }
        item.serialize_field("totalPrice", &self.total_price())?;
        item.serialize_field("createdAt", &self.created_at)?;
        item.serialize_field("updatedAt", &self.updated_at)?;
        item.end()
    }
}

/// Cart Model
///
/// Holds at most one item per product; totals are always derived from the
/// items. They are written out for readers of the stored JSON and never read
/// back.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    #[serde(rename = "id")]
    pub uuid: CartUuid,
    #[serde(rename = "ownerId")]
    pub owner: CartOwner,
    pub(crate) items: Vec<CartItem>,
    pub status: CartStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub expires_at: Timestamp,
}

impl Cart {
    #[must_use]
    pub fn new(owner: CartOwner, now: Timestamp, ttl: SignedDuration) -> Self {
        Self {
            uuid: CartUuid::new(),
            owner,
            items: Vec::new(),
            status: CartStatus::Active,
            created_at: now,
            updated_at: now,
            expires_at: expiry(now, ttl),
        }
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn item(&self, product: ProductUuid) -> Option<&CartItem> {
        self.items.iter().find(|item| item.product_uuid == product)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.items.iter().map(CartItem::total_price).sum()
    }

    #[must_use]
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now > self.expires_at
    }

    /// Merge into the existing line for the same product, or append.
    pub(crate) fn add_item(&mut self, item: CartItem) {
        match self
            .items
            .iter_mut()
            .find(|existing| existing.product_uuid == item.product_uuid)
        {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(item.quantity);
                existing.updated_at = item.updated_at;

                if item.notes.is_some() {
                    existing.notes = item.notes;
                }
            }
            None => self.items.push(item),
        }
    }

    pub(crate) fn remove_item(&mut self, product: ProductUuid) -> bool {
        let before = self.items.len();

        self.items.retain(|item| item.product_uuid != product);

        self.items.len() != before
    }

    pub(crate) fn update_item(
        &mut self,
        product: ProductUuid,
        quantity: u32,
        notes: Option<String>,
        now: Timestamp,
    ) -> bool {
        let Some(item) = self
            .items
            .iter_mut()
            .find(|item| item.product_uuid == product)
        else {
            return false;
        };

        item.quantity = quantity;
        item.updated_at = now;

        if notes.is_some() {
            item.notes = notes;
        }

        true
    }

    pub(crate) fn touch(&mut self, now: Timestamp, ttl: SignedDuration) {
        self.updated_at = now;
        self.expires_at = expiry(now, ttl);
    }
}

impl Serialize for Cart {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut cart = serializer.serialize_struct("Cart", 9)?;

        cart.serialize_field("id", &self.uuid)?;
        cart.serialize_field("ownerId", &self.owner)?;
        cart.serialize_field("items", &self.items)?;
        cart.serialize_field("totalItems", &self.total_items())?;
        cart.serialize_field("totalPrice", &self.total_price())?;
        cart.serialize_field("status", &self.status)?;
        cart.serialize_field("createdAt", &self.created_at)?;
        cart.serialize_field("updatedAt", &self.updated_at)?;
        cart.serialize_field("expiresAt", &self.expires_at)?;
        cart.end()
    }
}

fn expiry(now: Timestamp, ttl: SignedDuration) -> Timestamp {
    now.checked_add(ttl).unwrap_or(Timestamp::MAX)
}
