//! Budget totals reconciliation.

use tally_domain::{Budget, BudgetTotals, Category};
use tracing::debug;

use crate::CoreError;

/// Stateless budgeting utilities that operate over [`Budget`] snapshots.
pub struct BudgetService;

impl BudgetService {
    /// Recomputes aggregate totals from category allocations against a fixed pool.
    ///
    /// Missing allocations count as zero. Over-allocation is absorbed:
    /// `total_available` floors at zero instead of going negative. Non-finite
    /// inputs flow through unchanged.
    pub fn reconcile<'a, I>(categories: I, total_budget_amount: f64) -> BudgetTotals
    where
        I: IntoIterator<Item = &'a Category>,
    {
        let total_budgeted: f64 = categories
            .into_iter()
            .map(Category::budgeted_amount)
            .sum();
        let remainder = total_budget_amount - total_budgeted;
        // `f64::max` would swallow NaN; keep it visible.
        let total_available = if remainder < 0.0 { 0.0 } else { remainder };
        BudgetTotals::new(total_budgeted, total_available)
    }

    /// Recomputes and stores the budget's totals, keeping its pool size.
    pub fn apply_reconciliation(budget: &mut Budget) -> BudgetTotals {
        let pool = budget.total_budget_amount();
        let totals = Self::reconcile(budget.categories(), pool);
        debug!(
            budget = %budget.id,
            pool,
            total_budgeted = totals.total_budgeted,
            total_available = totals.total_available,
            "reconciled budget totals"
        );
        budget.totals = totals;
        budget.touch();
        totals
    }

    /// Income-setting action: fixes the pool size and reconciles against it.
    pub fn set_income(budget: &mut Budget, amount: f64) -> Result<BudgetTotals, CoreError> {
        let amount = validate_amount("income", amount)?;
        budget.income = Some(amount);
        Ok(Self::apply_reconciliation(budget))
    }

    /// Returns `true` when the stored totals disagree with a fresh reconciliation.
    pub fn totals_are_stale(budget: &Budget) -> bool {
        let fresh = Self::reconcile(budget.categories(), budget.total_budget_amount());
        !amounts_match(fresh.total_budgeted, budget.totals.total_budgeted)
            || !amounts_match(fresh.total_available, budget.totals.total_available)
    }
}

const AMOUNT_EPSILON: f64 = 1e-9;

pub(crate) fn amounts_match(a: f64, b: f64) -> bool {
    (a - b).abs() <= AMOUNT_EPSILON
}

/// Accepts finite, non-negative monetary amounts.
pub(crate) fn validate_amount(label: &str, amount: f64) -> Result<f64, CoreError> {
    if !amount.is_finite() {
        return Err(CoreError::Validation(format!("{label} must be a finite number")));
    }
    if amount < 0.0 {
        return Err(CoreError::Validation(format!("{label} cannot be negative")));
    }
    Ok(amount)
}
