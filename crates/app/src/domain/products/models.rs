//! Product Models

use rust_decimal::Decimal;

use crate::uuids::TypedUuid;

/// Product UUID
pub type ProductUuid = TypedUuid<Product>;

/// Catalog product, as needed to price and describe a cart line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub uuid: ProductUuid,
    pub name: String,
    pub unit_price: Decimal,
    pub unit: String,
    pub category: String,
    pub image_url: Option<String>,
}
