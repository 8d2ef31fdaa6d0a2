//! Budget aggregates: sections, categories and derived totals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::category::Category;

const CURRENT_SCHEMA_VERSION: u8 = 1;

/// Aggregate allocation figures produced by reconciliation.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct BudgetTotals {
    pub total_budgeted: f64,
    pub total_available: f64,
}

impl BudgetTotals {
    pub fn new(total_budgeted: f64, total_available: f64) -> Self {
        Self {
            total_budgeted,
            total_available,
        }
    }

    /// Size of the pool these totals describe.
    pub fn pool(&self) -> f64 {
        self.total_budgeted + self.total_available
    }
}

/// A named group of categories inside a budget.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Section {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl Section {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            categories: Vec::new(),
        }
    }

    pub fn category(&self, id: Uuid) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }
}

/// One user's allocation pool for a period.
///
/// `totals` is derived from the categories and only changes through
/// reconciliation. `income` is set explicitly by the owner and, when present,
/// fixes the pool size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub id: Uuid,
    pub owner: Uuid,
    pub name: String,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub totals: BudgetTotals,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub income: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "Budget::schema_version_default")]
    pub schema_version: u8,
}

impl Budget {
    pub fn new(owner: Uuid, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner,
            name: name.into(),
            sections: Vec::new(),
            totals: BudgetTotals::default(),
            income: None,
            created_at: now,
            updated_at: now,
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }

    fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }

    /// Fixed capacity used when recomputing totals: the explicit income when
    /// one was set, otherwise whatever the last reconciliation left behind.
    pub fn total_budget_amount(&self) -> f64 {
        self.income.unwrap_or_else(|| self.totals.pool())
    }

    /// Iterates every category across all sections.
    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.sections.iter().flat_map(|s| s.categories.iter())
    }

    pub fn category_count(&self) -> usize {
        self.sections.iter().map(|s| s.categories.len()).sum()
    }

    pub fn category(&self, id: Uuid) -> Option<&Category> {
        self.categories().find(|c| c.id == id)
    }

    pub fn category_mut(&mut self, id: Uuid) -> Option<&mut Category> {
        self.sections
            .iter_mut()
            .flat_map(|s| s.categories.iter_mut())
            .find(|c| c.id == id)
    }

    pub fn section(&self, id: Uuid) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn section_mut(&mut self, id: Uuid) -> Option<&mut Section> {
        self.sections.iter_mut().find(|s| s.id == id)
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner == user_id
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn budget_with_two_sections() -> Budget {
        let mut budget = Budget::new(Uuid::new_v4(), "March");
        let mut bills = Section::new("Bills");
        bills.categories.push(Category::new("Rent").with_budgeted(900.0));
        let mut living = Section::new("Living");
        living.categories.push(Category::new("Groceries").with_budgeted(300.0));
        living.categories.push(Category::new("Fuel"));
        budget.sections.push(bills);
        budget.sections.push(living);
        budget
    }

    #[test]
    fn categories_span_all_sections() {
        let budget = budget_with_two_sections();
        let names: Vec<_> = budget.categories().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Rent", "Groceries", "Fuel"]);
        assert_eq!(budget.category_count(), 3);
    }

    #[test]
    fn pool_falls_back_to_stored_totals_without_income() {
        let mut budget = budget_with_two_sections();
        budget.totals = BudgetTotals::new(450.0, 50.0);
        assert_eq!(budget.total_budget_amount(), 500.0);

        budget.income = Some(2_000.0);
        assert_eq!(budget.total_budget_amount(), 2_000.0);
    }

    #[test]
    fn category_mut_finds_nested_category() {
        let mut budget = budget_with_two_sections();
        let fuel = budget.sections[1].categories[1].id;
        budget.category_mut(fuel).expect("fuel").budgeted = Some(60.0);
        assert_eq!(budget.category(fuel).map(Category::budgeted_amount), Some(60.0));
    }
}
