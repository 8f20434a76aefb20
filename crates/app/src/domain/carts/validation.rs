//! Cart validation.
//!
//! Input-shape problems are reported as values. Errors make the report
//! invalid; warnings never do.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer, ser::SerializeStruct};

use crate::domain::{carts::models::Cart, products::models::ProductUuid};

pub const MAX_QUANTITY: i64 = 1000;
pub const BULK_QUANTITY: i64 = 100;
pub const MAX_NOTES_LENGTH: usize = 500;
pub const NOTES_WARNING_LENGTH: usize = 450;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueCode {
    InvalidProductId,
    InvalidQuantity,
    NotesTooLong,
    EmptyCart,
    NegativeTotal,
    LargeQuantity,
    NotesNearLimit,
}

impl IssueCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidProductId => "INVALID_PRODUCT_ID",
            Self::InvalidQuantity => "INVALID_QUANTITY",
            Self::NotesTooLong => "NOTES_TOO_LONG",
            Self::EmptyCart => "EMPTY_CART",
            Self::NegativeTotal => "NEGATIVE_TOTAL",
            Self::LargeQuantity => "LARGE_QUANTITY",
            Self::NotesNearLimit => "NOTES_NEAR_LIMIT",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub code: IssueCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn has_error(&self, code: IssueCode) -> bool {
        self.errors.iter().any(|issue| issue.code == code)
    }

    pub(crate) fn error(
        &mut self,
        code: IssueCode,
        message: impl Into<String>,
        field: Option<&str>,
    ) {
        self.errors.push(issue(code, message, field));
    }

    pub(crate) fn warning(
        &mut self,
        code: IssueCode,
        message: impl Into<String>,
        field: Option<&str>,
    ) {
        self.warnings.push(issue(code, message, field));
    }
}

impl Serialize for ValidationReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut report = serializer.serialize_struct("ValidationReport", 3)?;

        report.serialize_field("isValid", &self.is_valid())?;
        report.serialize_field("errors", &self.errors)?;
        report.serialize_field("warnings", &self.warnings)?;
        report.end()
    }
}

fn issue(code: IssueCode, message: impl Into<String>, field: Option<&str>) -> ValidationIssue {
    ValidationIssue {
        code,
        message: message.into(),
        field: field.map(str::to_string),
    }
}

/// Item to add, as submitted by a client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemInput {
    pub product_id: String,
    pub quantity: i64,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Change to an item already in the cart. A quantity of zero or less removes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItemUpdate {
    pub product: ProductUuid,
    pub quantity: i64,
    pub notes: Option<String>,
}

/// A [`CartItemInput`] that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedItem {
    pub product: ProductUuid,
    pub quantity: u32,
    pub notes: Option<String>,
    pub warnings: Vec<ValidationIssue>,
}

#[must_use]
pub fn validate_cart_item_input(input: &CartItemInput) -> ValidationReport {
    match validate_cart_item(input) {
        Ok(item) => ValidationReport {
            errors: Vec::new(),
            warnings: item.warnings,
        },
        Err(report) => report,
    }
}

pub fn validate_cart_item(input: &CartItemInput) -> Result<ValidatedItem, ValidationReport> {
    let mut report = ValidationReport::default();

    let product = input.product_id.trim().parse::<ProductUuid>().ok();

    if product.is_none() {
        report.error(
            IssueCode::InvalidProductId,
            "product id must be a valid identifier",
            Some("productId"),
        );
    }

    let quantity = check_quantity(&mut report, input.quantity);

    check_notes(&mut report, input.notes.as_deref());

    match (product, quantity) {
        (Some(product), Some(quantity)) if report.is_valid() => Ok(ValidatedItem {
            product,
            quantity,
            notes: input.notes.clone(),
            warnings: report.warnings,
        }),
        _ => Err(report),
    }
}

/// Validate an update whose quantity is positive.
pub(crate) fn validate_cart_item_update(
    update: &CartItemUpdate,
) -> Result<(u32, Vec<ValidationIssue>), ValidationReport> {
    let mut report = ValidationReport::default();

    let quantity = check_quantity(&mut report, update.quantity);

    check_notes(&mut report, update.notes.as_deref());

    match quantity {
        Some(quantity) if report.is_valid() => Ok((quantity, report.warnings)),
        _ => Err(report),
    }
}

fn check_quantity(report: &mut ValidationReport, quantity: i64) -> Option<u32> {
    if !(1..=MAX_QUANTITY).contains(&quantity) {
        report.error(
            IssueCode::InvalidQuantity,
            format!("quantity must be between 1 and {MAX_QUANTITY}"),
            Some("quantity"),
        );

        return None;
    }

    if quantity > BULK_QUANTITY {
        report.warning(
            IssueCode::LargeQuantity,
            format!("quantity above {BULK_QUANTITY} may need distributor confirmation"),
            Some("quantity"),
        );
    }

    u32::try_from(quantity).ok()
}

fn check_notes(report: &mut ValidationReport, notes: Option<&str>) {
    let Some(length) = notes.map(|notes| notes.chars().count()) else {
        return;
    };

    if length > MAX_NOTES_LENGTH {
        report.error(
            IssueCode::NotesTooLong,
            format!("notes must be at most {MAX_NOTES_LENGTH} characters"),
            Some("notes"),
        );
    } else if length > NOTES_WARNING_LENGTH {
        report.warning(
            IssueCode::NotesNearLimit,
            format!("notes are close to the {MAX_NOTES_LENGTH} character limit"),
            Some("notes"),
        );
    }
}

/// Collect every problem that blocks checkout, without short-circuiting.
#[must_use]
pub fn validate_cart_for_checkout(cart: &Cart) -> ValidationReport {
    let mut report = ValidationReport::default();

    if cart.is_empty() {
        report.error(IssueCode::EmptyCart, "cart is empty", None);
    }

    for item in cart.items() {
        let field = format!("items.{}", item.product_uuid);

        if item.quantity == 0 {
            report.error(
                IssueCode::InvalidQuantity,
                format!("{} has no quantity", item.product.name),
                Some(&field),
            );
        } else if i64::from(item.quantity) > MAX_QUANTITY {
            report.error(
                IssueCode::InvalidQuantity,
                format!("{} exceeds {MAX_QUANTITY} units", item.product.name),
                Some(&field),
            );
        }

        if item.total_price() < Decimal::ZERO {
            report.error(
                IssueCode::NegativeTotal,
                format!("{} has a negative total", item.product.name),
                Some(&field),
            );
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use jiff::{SignedDuration, Timestamp};

    use super::*;
    use crate::{
        domain::carts::models::{CartItem, CartOwner},
        test::product,
    };

    fn input(product_id: &str, quantity: i64, notes: Option<&str>) -> CartItemInput {
        CartItemInput {
            product_id: product_id.to_string(),
            quantity,
            notes: notes.map(str::to_string),
        }
    }

    fn codes(issues: &[ValidationIssue]) -> Vec<IssueCode> {
        issues.iter().map(|issue| issue.code).collect()
    }

    fn cart_with(items: Vec<CartItem>) -> Cart {
        let mut cart = Cart::new(
            CartOwner::Anonymous,
            Timestamp::UNIX_EPOCH,
            SignedDuration::from_hours(24),
        );
        cart.items = items;
        cart
    }

    #[test]
    fn collects_every_input_error() {
        let notes = "x".repeat(501);
        let report = validate_cart_item_input(&input("nope", 0, Some(&notes)));

        assert!(!report.is_valid());
        assert_eq!(
            codes(&report.errors),
            vec![
                IssueCode::InvalidProductId,
                IssueCode::InvalidQuantity,
                IssueCode::NotesTooLong
            ]
        );
    }

    #[test]
    fn quantity_bounds_are_inclusive() {
        let id = product(1).uuid.to_string();

        assert!(validate_cart_item_input(&input(&id, 1, None)).is_valid());
        assert!(validate_cart_item_input(&input(&id, 1000, None)).is_valid());
        assert!(!validate_cart_item_input(&input(&id, 1001, None)).is_valid());
        assert!(!validate_cart_item_input(&input(&id, -3, None)).is_valid());
    }

    #[test]
    fn bulk_quantity_and_long_notes_only_warn() {
        let id = product(1).uuid.to_string();
        let notes = "x".repeat(480);
        let report = validate_cart_item_input(&input(&id, 250, Some(&notes)));

        assert!(report.is_valid());
        assert_eq!(
            codes(&report.warnings),
            vec![IssueCode::LargeQuantity, IssueCode::NotesNearLimit]
        );
    }

    #[test]
    fn empty_cart_yields_exactly_one_error() {
        let report = validate_cart_for_checkout(&cart_with(Vec::new()));

        assert_eq!(codes(&report.errors), vec![IssueCode::EmptyCart]);
    }

    #[test]
    fn zero_quantity_item_is_invalid_quantity_only() {
        let mut item = CartItem::new(&product(10), 1, None, Timestamp::UNIX_EPOCH);
        item.quantity = 0;

        let report = validate_cart_for_checkout(&cart_with(vec![item]));

        assert_eq!(codes(&report.errors), vec![IssueCode::InvalidQuantity]);
    }

    #[test]
    fn checkout_flags_quantities_over_the_cap() {
        let at_cap = CartItem::new(&product(10), 1000, None, Timestamp::UNIX_EPOCH);
        let over = CartItem::new(&product(10), 1200, None, Timestamp::UNIX_EPOCH);

        let report = validate_cart_for_checkout(&cart_with(vec![at_cap, over]));

        assert_eq!(codes(&report.errors), vec![IssueCode::InvalidQuantity]);
    }

    #[test]
    fn checkout_reports_all_problems_in_one_pass() {
        let mut empty = CartItem::new(&product(10), 1, None, Timestamp::UNIX_EPOCH);
        empty.quantity = 0;

        let mut negative = CartItem::new(&product(10), 2, None, Timestamp::UNIX_EPOCH);
        negative.unit_price = Decimal::from(-5);

        let report = validate_cart_for_checkout(&cart_with(vec![empty, negative]));

        assert_eq!(
            codes(&report.errors),
            vec![IssueCode::InvalidQuantity, IssueCode::NegativeTotal]
        );
    }

    #[test]
    fn report_serializes_with_is_valid_flag() -> testresult::TestResult {
        let report = validate_cart_for_checkout(&cart_with(Vec::new()));
        let json = serde_json::to_value(&report)?;

        assert_eq!(json["isValid"], false);
        assert_eq!(json["errors"][0]["code"], "EMPTY_CART");
        assert!(json["errors"][0].get("field").is_none());

        Ok(())
    }

    #[test]
    fn issue_codes_render_as_they_serialize() {
        for code in [
            IssueCode::InvalidProductId,
            IssueCode::InvalidQuantity,
            IssueCode::NotesTooLong,
            IssueCode::EmptyCart,
            IssueCode::NegativeTotal,
            IssueCode::LargeQuantity,
            IssueCode::NotesNearLimit,
        ] {
            assert_eq!(
                serde_json::to_value(code).ok(),
                Some(serde_json::Value::from(code.as_str())),
                "{code:?}"
            );
        }
    }
}
