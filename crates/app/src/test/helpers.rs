//! Test Helpers

use rust_decimal::Decimal;

use crate::domain::{
    products::models::{Product, ProductUuid},
    profiles::models::{Profile, RestaurantUuid, Role, UserUuid},
};

pub(crate) fn product(price: i64) -> Product {
    Product {
        uuid: ProductUuid::new(),
        name: format!("Product at {price}"),
        unit_price: Decimal::from(price),
        unit: "case".to_string(),
        category: "produce".to_string(),
        image_url: None,
    }
}

pub(crate) fn owner_profile(restaurant: RestaurantUuid) -> Profile {
    Profile {
        uuid: UserUuid::new(),
        role: Role::RestaurantOwner,
        restaurant: Some(restaurant),
    }
}
