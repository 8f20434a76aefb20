//! Response bodies shared by the order and cart resources.

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};

use larder_app::domain::{carts::validation::ValidationIssue, pricing::OrderTotals};

/// A single validation finding.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct IssueResponse {
    /// Machine-readable code, e.g. `INVALID_QUANTITY`
    pub code: String,

    /// Human-readable description
    pub message: String,

    /// Offending input field, when there is one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl From<&ValidationIssue> for IssueResponse {
    fn from(issue: &ValidationIssue) -> Self {
        Self {
            code: issue.code.as_str().to_owned(),
            message: issue.message.clone(),
            field: issue.field.clone(),
        }
    }
}

pub(crate) fn issues(issues: &[ValidationIssue]) -> Vec<IssueResponse> {
    issues.iter().map(IssueResponse::from).collect()
}

/// Subtotal, delivery fee and total. Amounts are decimal strings.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TotalsResponse {
    pub subtotal: String,
    pub delivery_fee: String,
    pub total: String,
    pub free_delivery: bool,
    pub amount_until_free_delivery: String,
}

impl From<OrderTotals> for TotalsResponse {
    fn from(totals: OrderTotals) -> Self {
        Self {
            subtotal: totals.subtotal.to_string(),
            delivery_fee: totals.delivery_fee.to_string(),
            total: totals.total.to_string(),
            free_delivery: totals.free_delivery,
            amount_until_free_delivery: totals.amount_until_free_delivery.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use larder_app::domain::{carts::validation::IssueCode, pricing::DeliveryPolicy};
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn totals_are_rendered_in_camel_case() -> TestResult {
        let totals = TotalsResponse::from(DeliveryPolicy::default().totals(Decimal::from(450)));

        let json = serde_json::to_value(&totals)?;

        assert_eq!(json["deliveryFee"], "25");
        assert_eq!(json["total"], "475");
        assert_eq!(json["freeDelivery"], false);
        assert_eq!(json["amountUntilFreeDelivery"], "50");

        Ok(())
    }

    #[test]
    fn issue_without_field_omits_it() -> TestResult {
        let issue = ValidationIssue {
            code: IssueCode::EmptyCart,
            message: "cart is empty".to_owned(),
            field: None,
        };

        let json = serde_json::to_value(IssueResponse::from(&issue))?;

        assert_eq!(json["code"], "EMPTY_CART");
        assert!(json.get("field").is_none(), "field omitted");

        Ok(())
    }
}
