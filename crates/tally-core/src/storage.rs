use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
};

use tally_domain::{Budget, User};
use uuid::Uuid;

use crate::{budget_service::BudgetService, CoreError};

/// Abstraction over persistence backends holding users and budgets.
///
/// Implementations provide per-record atomicity; callers that need a
/// read-recompute-write sequence to be atomic must serialise it themselves.
pub trait BudgetStorage: Send + Sync {
    fn save_user(&self, user: &User) -> Result<(), CoreError>;
    fn find_user(&self, id: Uuid) -> Result<Option<User>, CoreError>;
    fn list_users(&self) -> Result<Vec<User>, CoreError>;
    fn save_budget(&self, budget: &Budget) -> Result<(), CoreError>;
    fn find_budget(&self, id: Uuid) -> Result<Option<Budget>, CoreError>;
    fn list_budgets(&self, owner: Uuid) -> Result<Vec<Budget>, CoreError>;
    fn delete_budget(&self, id: Uuid) -> Result<(), CoreError>;
}

/// Process-local storage, mostly for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    users: RwLock<HashMap<Uuid, User>>,
    budgets: RwLock<HashMap<Uuid, Budget>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: PoisonError<T>) -> CoreError {
    CoreError::Storage("memory storage lock poisoned".into())
}

impl BudgetStorage for MemoryStorage {
    fn save_user(&self, user: &User) -> Result<(), CoreError> {
        self.users
            .write()
            .map_err(poisoned)?
            .insert(user.id, user.clone());
        Ok(())
    }

    fn find_user(&self, id: Uuid) -> Result<Option<User>, CoreError> {
        Ok(self.users.read().map_err(poisoned)?.get(&id).cloned())
    }

    fn list_users(&self) -> Result<Vec<User>, CoreError> {
        let mut users: Vec<User> = self.users.read().map_err(poisoned)?.values().cloned().collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    fn save_budget(&self, budget: &Budget) -> Result<(), CoreError> {
        self.budgets
            .write()
            .map_err(poisoned)?
            .insert(budget.id, budget.clone());
        Ok(())
    }

    fn find_budget(&self, id: Uuid) -> Result<Option<Budget>, CoreError> {
        Ok(self.budgets.read().map_err(poisoned)?.get(&id).cloned())
    }

    fn list_budgets(&self, owner: Uuid) -> Result<Vec<Budget>, CoreError> {
        let mut budgets: Vec<Budget> = self
            .budgets
            .read()
            .map_err(poisoned)?
            .values()
            .filter(|b| b.owner == owner)
            .cloned()
            .collect();
        budgets.sort_by_key(|b| b.created_at);
        Ok(budgets)
    }

    fn delete_budget(&self, id: Uuid) -> Result<(), CoreError> {
        self.budgets
            .write()
            .map_err(poisoned)?
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| CoreError::BudgetNotFound(id.to_string()))
    }
}

/// Detects stale totals and suspicious amounts within a budget snapshot.
pub fn budget_warnings(budget: &Budget) -> Vec<String> {
    let mut warnings = Vec::new();

    for category in budget.categories() {
        if let Some(amount) = category.budgeted {
            if !amount.is_finite() {
                warnings.push(format!(
                    "category {} has a non-finite budgeted amount",
                    category.id
                ));
            } else if amount < 0.0 {
                warnings.push(format!(
                    "category {} has a negative budgeted amount {amount}",
                    category.id
                ));
            }
        }
        if category.spent.is_some_and(|spent| spent < 0.0) {
            warnings.push(format!("category {} has negative spending", category.id));
        }
    }
    if budget.totals.total_available < 0.0 {
        warnings.push(format!(
            "budget {} reports negative available funds",
            budget.id
        ));
    }
    if BudgetService::totals_are_stale(budget) {
        warnings.push(format!(
            "budget {} totals are out of date with its categories",
            budget.id
        ));
    }
    warnings
}
