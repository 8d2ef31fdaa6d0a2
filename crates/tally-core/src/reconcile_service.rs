//! Request-level reconciliation: resolve the acting user, load the budget,
//! recompute totals and persist them.

use serde::Serialize;
use tally_domain::{Budget, Category, User};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    budget_service::BudgetService,
    storage::{budget_warnings, BudgetStorage},
    CoreError,
};

/// The acting identity for a request. `None` is an anonymous caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Session {
    pub user_id: Option<Uuid>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self { user_id: None }
    }

    pub fn for_user(user_id: Uuid) -> Self {
        Self {
            user_id: Some(user_id),
        }
    }
}

/// Loads the session's user; a missing id or record is unauthorized.
pub fn resolve_user<S>(storage: &S, session: &Session) -> Result<User, CoreError>
where
    S: BudgetStorage + ?Sized,
{
    let user_id = session.user_id.ok_or(CoreError::Unauthorized)?;
    storage.find_user(user_id)?.ok_or_else(|| {
        warn!(user = %user_id, "session refers to unknown user");
        CoreError::Unauthorized
    })
}

/// Loads a budget owned by `user`. Budgets owned by someone else are
/// reported as missing. Without an id, the user's most recently updated
/// budget is used.
pub fn resolve_budget<S>(
    storage: &S,
    user: &User,
    budget_id: Option<Uuid>,
) -> Result<Budget, CoreError>
where
    S: BudgetStorage + ?Sized,
{
    let found = match budget_id {
        Some(id) => storage
            .find_budget(id)?
            .filter(|budget| budget.is_owned_by(user.id)),
        None => storage
            .list_budgets(user.id)?
            .into_iter()
            .max_by_key(|budget| budget.updated_at),
    };
    found.ok_or_else(|| {
        CoreError::BudgetNotFound(
            budget_id.map_or_else(|| format!("no budget for user {}", user.id), |id| id.to_string()),
        )
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconcileOutcome {
    pub budget: Budget,
    pub categories: Vec<Category>,
    pub total_budgeted: f64,
    /// Problems found in the stored budget before it was recomputed.
    pub warnings: Vec<String>,
}

pub struct ReconcileService;

impl ReconcileService {
    pub fn run<S>(
        storage: &S,
        session: &Session,
        budget_id: Option<Uuid>,
    ) -> Result<ReconcileOutcome, CoreError>
    where
        S: BudgetStorage + ?Sized,
    {
        let user = resolve_user(storage, session)?;
        let mut budget = resolve_budget(storage, &user, budget_id)?;
        let warnings = budget_warnings(&budget);
        for warning in &warnings {
            warn!(budget = %budget.id, "{warning}");
        }
        let totals = BudgetService::apply_reconciliation(&mut budget);
        storage.save_budget(&budget)?;
        info!(
            budget = %budget.id,
            user = %user.id,
            total_budgeted = totals.total_budgeted,
            total_available = totals.total_available,
            "persisted reconciled totals"
        );
        let categories = budget.categories().cloned().collect();
        Ok(ReconcileOutcome {
            budget,
            categories,
            total_budgeted: totals.total_budgeted,
            warnings,
        })
    }
}
