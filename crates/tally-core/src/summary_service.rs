use serde::Serialize;
use tally_domain::Budget;
use uuid::Uuid;

/// Spending for one category against its allocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySpending {
    pub category_id: Uuid,
    pub section: String,
    pub name: String,
    pub budgeted: f64,
    pub spent: f64,
    pub remaining: f64,
    pub overspent: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpendingSummary {
    pub budget_id: Uuid,
    pub total_budgeted: f64,
    pub total_available: f64,
    pub total_spent: f64,
    pub categories: Vec<CategorySpending>,
}

impl SpendingSummary {
    pub fn overspent(&self) -> impl Iterator<Item = &CategorySpending> {
        self.categories.iter().filter(|c| c.overspent)
    }

    /// Share of the allocation already spent, `None` when nothing is allocated.
    pub fn utilisation(&self) -> Option<f64> {
        (self.total_budgeted > 0.0).then(|| self.total_spent / self.total_budgeted)
    }
}

pub struct SummaryService;

impl SummaryService {
    pub fn summarize(budget: &Budget) -> SpendingSummary {
        let categories: Vec<CategorySpending> = budget
            .sections
            .iter()
            .flat_map(|section| {
                section.categories.iter().map(move |category| CategorySpending {
                    category_id: category.id,
                    section: section.name.clone(),
                    name: category.name.clone(),
                    budgeted: category.budgeted_amount(),
                    spent: category.spent_amount(),
                    remaining: category.remaining(),
                    overspent: category.is_overspent(),
                })
            })
            .collect();
        SpendingSummary {
            budget_id: budget.id,
            total_budgeted: budget.totals.total_budgeted,
            total_available: budget.totals.total_available,
            total_spent: categories.iter().map(|c| c.spent).sum(),
            categories,
        }
    }
}
