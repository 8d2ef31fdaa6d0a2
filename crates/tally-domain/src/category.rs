//! Domain types representing spending buckets inside a budget.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One spending bucket with an allocation and the amount consumed so far.
///
/// Both amounts are optional on the wire; records created before an
/// allocation was entered carry no value. Use [`Category::budgeted_amount`]
/// and [`Category::spent_amount`] to read them with their defaults applied.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budgeted: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spent: Option<f64>,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            budgeted: None,
            spent: None,
        }
    }

    pub fn with_budgeted(mut self, amount: f64) -> Self {
        self.budgeted = Some(amount);
        self
    }

    pub fn with_spent(mut self, amount: f64) -> Self {
        self.spent = Some(amount);
        self
    }

    /// Allocated amount, `0.0` when none has been assigned.
    pub fn budgeted_amount(&self) -> f64 {
        self.budgeted.unwrap_or(0.0)
    }

    /// Consumed amount, `0.0` when nothing has been recorded.
    pub fn spent_amount(&self) -> f64 {
        self.spent.unwrap_or(0.0)
    }

    /// Allocation left after spending. Negative when overspent.
    pub fn remaining(&self) -> f64 {
        self.budgeted_amount() - self.spent_amount()
    }

    pub fn is_overspent(&self) -> bool {
        self.spent_amount() > self.budgeted_amount()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_amounts_resolve_to_zero() {
        let category = Category::new("Groceries");
        assert_eq!(category.budgeted_amount(), 0.0);
        assert_eq!(category.spent_amount(), 0.0);
        assert!(!category.is_overspent());
    }

    #[test]
    fn remaining_goes_negative_when_overspent() {
        let category = Category::new("Dining")
            .with_budgeted(80.0)
            .with_spent(95.5);
        assert_eq!(category.remaining(), -15.5);
        assert!(category.is_overspent());
    }

    #[test]
    fn missing_amounts_deserialize_as_none() {
        let json = r#"{"id":"00000000-0000-0000-0000-000000000001","name":"Fuel"}"#;
        let category: Category = serde_json::from_str(json).expect("parse category");
        assert_eq!(category.budgeted, None);
        assert_eq!(category.budgeted_amount(), 0.0);
    }
}
