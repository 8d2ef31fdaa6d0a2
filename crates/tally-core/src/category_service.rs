use tally_domain::{Budget, BudgetTotals, Category, Section};
use tracing::info;
use uuid::Uuid;

use crate::{
    budget_service::{validate_amount, BudgetService},
    CoreError,
};

/// Section and category editing. Every allocation change reconciles the budget.
pub struct CategoryService;

impl CategoryService {
    pub fn add_section(budget: &mut Budget, name: &str) -> Result<Uuid, CoreError> {
        let name = validate_name("section", name)?;
        if budget.sections.iter().any(|s| s.name.eq_ignore_ascii_case(name)) {
            return Err(CoreError::Validation(format!(
                "section `{name}` already exists"
            )));
        }
        let section = Section::new(name);
        let id = section.id;
        budget.sections.push(section);
        budget.touch();
        Ok(id)
    }

    pub fn remove_section(budget: &mut Budget, section_id: Uuid) -> Result<Section, CoreError> {
        let index = budget
            .sections
            .iter()
            .position(|s| s.id == section_id)
            .ok_or(CoreError::SectionNotFound(section_id))?;
        let removed = budget.sections.remove(index);
        BudgetService::apply_reconciliation(budget);
        Ok(removed)
    }

    pub fn add_category(
        budget: &mut Budget,
        section_id: Uuid,
        mut category: Category,
    ) -> Result<Uuid, CoreError> {
        category.name = validate_name("category", &category.name)?.to_string();
        if let Some(amount) = category.budgeted {
            validate_amount("budgeted amount", amount)?;
        }
        if let Some(amount) = category.spent {
            validate_amount("spent amount", amount)?;
        }
        let section = budget
            .section_mut(section_id)
            .ok_or(CoreError::SectionNotFound(section_id))?;
        let id = category.id;
        section.categories.push(category);
        let totals = BudgetService::apply_reconciliation(budget);
        info!(budget = %budget.id, category = %id, total_budgeted = totals.total_budgeted, "added category");
        Ok(id)
    }

    pub fn set_budgeted(
        budget: &mut Budget,
        category_id: Uuid,
        amount: f64,
    ) -> Result<BudgetTotals, CoreError> {
        let amount = validate_amount("budgeted amount", amount)?;
        let category = budget
            .category_mut(category_id)
            .ok_or(CoreError::CategoryNotFound(category_id))?;
        category.budgeted = Some(amount);
        Ok(BudgetService::apply_reconciliation(budget))
    }

    pub fn rename(budget: &mut Budget, category_id: Uuid, name: &str) -> Result<(), CoreError> {
        let name = validate_name("category", name)?.to_string();
        let category = budget
            .category_mut(category_id)
            .ok_or(CoreError::CategoryNotFound(category_id))?;
        category.name = name;
        budget.touch();
        Ok(())
    }

    /// Adds `amount` to the category's spending and returns the new total.
    /// Spending does not affect allocation totals.
    pub fn record_spend(
        budget: &mut Budget,
        category_id: Uuid,
        amount: f64,
    ) -> Result<f64, CoreError> {
        let amount = validate_amount("expense", amount)?;
        let category = budget
            .category_mut(category_id)
            .ok_or(CoreError::CategoryNotFound(category_id))?;
        let spent = category.spent_amount() + amount;
        category.spent = Some(spent);
        budget.touch();
        Ok(spent)
    }

    pub fn remove_category(budget: &mut Budget, category_id: Uuid) -> Result<Category, CoreError> {
        let removed = budget.sections.iter_mut().find_map(|section| {
            section
                .categories
                .iter()
                .position(|c| c.id == category_id)
                .map(|index| section.categories.remove(index))
        });
        let removed = removed.ok_or(CoreError::CategoryNotFound(category_id))?;
        BudgetService::apply_reconciliation(budget);
        Ok(removed)
    }
}

fn validate_name<'a>(label: &str, name: &'a str) -> Result<&'a str, CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(format!("{label} name cannot be empty")));
    }
    Ok(trimmed)
}
