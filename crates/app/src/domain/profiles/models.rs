//! Profile Models

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::uuids::TypedUuid;

/// User UUID
pub type UserUuid = TypedUuid<Profile>;

/// Restaurant marker
#[derive(Debug)]
pub struct Restaurant;

/// Restaurant UUID
pub type RestaurantUuid = TypedUuid<Restaurant>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    RestaurantOwner,
    RestaurantStaff,
    Distributor,
    Admin,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RestaurantOwner => "restaurant_owner",
            Self::RestaurantStaff => "restaurant_staff",
            Self::Distributor => "distributor",
            Self::Admin => "admin",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "restaurant_owner" => Ok(Self::RestaurantOwner),
            "restaurant_staff" => Ok(Self::RestaurantStaff),
            "distributor" => Ok(Self::Distributor),
            "admin" => Ok(Self::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Profile Model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub uuid: UserUuid,
    pub role: Role,
    pub restaurant: Option<RestaurantUuid>,
}

impl Profile {
    /// Owners and staff may order for the restaurant they belong to; admins
    /// for any restaurant.
    #[must_use]
    pub fn may_order_for(&self, restaurant: RestaurantUuid) -> bool {
        match self.role {
            Role::Admin => true,
            Role::RestaurantOwner | Role::RestaurantStaff => self.restaurant == Some(restaurant),
            Role::Distributor => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(role: Role, restaurant: Option<RestaurantUuid>) -> Profile {
        Profile {
            uuid: UserUuid::new(),
            role,
            restaurant,
        }
    }

    #[test]
    fn staff_may_only_order_for_their_own_restaurant() {
        let own = RestaurantUuid::new();
        let staff = profile(Role::RestaurantStaff, Some(own));

        assert!(staff.may_order_for(own), "staff should order for own restaurant");
        assert!(
            !staff.may_order_for(RestaurantUuid::new()),
            "staff should not order for another restaurant"
        );
    }

    #[test]
    fn distributors_never_place_orders() {
        let restaurant = RestaurantUuid::new();

        assert!(!profile(Role::Distributor, Some(restaurant)).may_order_for(restaurant));
        assert!(profile(Role::Admin, None).may_order_for(restaurant));
    }

    #[test]
    fn role_round_trips_through_its_column_value() {
        for role in [
            Role::RestaurantOwner,
            Role::RestaurantStaff,
            Role::Distributor,
            Role::Admin,
        ] {
            assert_eq!(role.as_str().parse::<Role>().ok(), Some(role));
        }

        assert!("chef".parse::<Role>().is_err());
    }
}
