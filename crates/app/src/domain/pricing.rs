//! Delivery pricing shared by carts and order submission.

use rust_decimal::Decimal;
use serde::Serialize;

/// Flat delivery fee, waived once the subtotal reaches the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryPolicy {
    pub free_delivery_threshold: Decimal,
    pub delivery_fee: Decimal,
}

impl Default for DeliveryPolicy {
    fn default() -> Self {
        Self {
            free_delivery_threshold: Decimal::from(500),
            delivery_fee: Decimal::from(25),
        }
    }
}

impl DeliveryPolicy {
    #[must_use]
    pub fn qualifies_for_free_delivery(&self, subtotal: Decimal) -> bool {
        subtotal >= self.free_delivery_threshold
    }

    #[must_use]
    pub fn delivery_fee_for(&self, subtotal: Decimal) -> Decimal {
        if self.qualifies_for_free_delivery(subtotal) {
            Decimal::ZERO
        } else {
            self.delivery_fee
        }
    }

    #[must_use]
    pub fn totals(&self, subtotal: Decimal) -> OrderTotals {
        let delivery_fee = self.delivery_fee_for(subtotal);

        OrderTotals {
            subtotal,
            delivery_fee,
            total: subtotal + delivery_fee,
            free_delivery: self.qualifies_for_free_delivery(subtotal),
            amount_until_free_delivery: (self.free_delivery_threshold - subtotal)
                .max(Decimal::ZERO),
        }
    }
}

/// Priced summary of a cart or submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    pub total: Decimal,
    pub free_delivery: bool,
    pub amount_until_free_delivery: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subtotal_at_threshold_ships_free() {
        let totals = DeliveryPolicy::default().totals(Decimal::from(500));

        assert_eq!(totals.delivery_fee, Decimal::ZERO);
        assert_eq!(totals.total, Decimal::from(500));
        assert!(totals.free_delivery, "500 should qualify for free delivery");
        assert_eq!(totals.amount_until_free_delivery, Decimal::ZERO);
    }

    #[test]
    fn subtotal_just_below_threshold_pays_flat_fee() {
        let subtotal = Decimal::new(49_999, 2);
        let totals = DeliveryPolicy::default().totals(subtotal);

        assert_eq!(totals.delivery_fee, Decimal::from(25));
        assert_eq!(totals.total, Decimal::new(52_499, 2));
        assert!(!totals.free_delivery, "499.99 should not ship free");
        assert_eq!(totals.amount_until_free_delivery, Decimal::new(1, 2));
    }

    #[test]
    fn custom_policy_is_respected() {
        let policy = DeliveryPolicy {
            free_delivery_threshold: Decimal::from(100),
            delivery_fee: Decimal::from(7),
        };

        assert_eq!(policy.delivery_fee_for(Decimal::from(99)), Decimal::from(7));
        assert_eq!(policy.delivery_fee_for(Decimal::from(150)), Decimal::ZERO);
    }
}
