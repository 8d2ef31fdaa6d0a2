//! Plan-gated operations over stored users and budgets.
//!
//! Each call resolves the acting user from the [`Session`], checks the
//! feature it needs against the user's current entitlement, then loads,
//! edits and saves the affected record.

use std::collections::BTreeSet;

use serde::Serialize;
use tally_domain::{
    Budget, BudgetTotals, Category, Feature, FeatureRegistry, Plan, SubscriptionStatus, User,
};
use tracing::info;
use uuid::Uuid;

use crate::{
    budget_service::BudgetService,
    category_service::CategoryService,
    notice_service::{Notice, NoticeService},
    plan_access::PlanAccess,
    reconcile_service::{resolve_budget, resolve_user, Session},
    storage::BudgetStorage,
    subscription_service::SubscriptionService,
    summary_service::{SpendingSummary, SummaryService},
    Clock, CoreError,
};

/// Snapshot of a user's plan state for display.
#[derive(Debug, Clone, Serialize)]
pub struct AccountView {
    pub user: User,
    pub status: SubscriptionStatus,
    pub days_left: u32,
    pub entitled_plan: Plan,
    pub banner: Option<String>,
    pub features: BTreeSet<Feature>,
}

pub struct WorkspaceService<'a, S: BudgetStorage + ?Sized> {
    storage: &'a S,
    registry: &'a FeatureRegistry,
    clock: &'a dyn Clock,
    trial_days: u32,
}

impl<'a, S: BudgetStorage + ?Sized> WorkspaceService<'a, S> {
    pub fn new(
        storage: &'a S,
        registry: &'a FeatureRegistry,
        clock: &'a dyn Clock,
        trial_days: u32,
    ) -> Self {
        Self {
            storage,
            registry,
            clock,
            trial_days,
        }
    }

    fn subscriptions(&self) -> SubscriptionService<'a> {
        SubscriptionService::new(self.clock)
    }

    fn access(&self) -> PlanAccess<'a> {
        PlanAccess::new(self.registry)
    }

    fn authorize(&self, session: &Session, feature: Feature) -> Result<User, CoreError> {
        let user = resolve_user(self.storage, session)?;
        let status = self.subscriptions().status(&user);
        self.access().ensure_feature(Some(&user), status, feature)?;
        Ok(user)
    }

    fn edit_budget<T>(
        &self,
        session: &Session,
        budget_id: Uuid,
        feature: Feature,
        edit: impl FnOnce(&mut Budget) -> Result<T, CoreError>,
    ) -> Result<T, CoreError> {
        let user = self.authorize(session, feature)?;
        let mut budget = resolve_budget(self.storage, &user, Some(budget_id))?;
        let result = edit(&mut budget)?;
        self.storage.save_budget(&budget)?;
        Ok(result)
    }

    /// Signs a user up, optionally opening a trial.
    pub fn register_user(
        &self,
        email: &str,
        name: &str,
        with_trial: bool,
    ) -> Result<User, CoreError> {
        let email = email.trim();
        if !email.contains('@') {
            return Err(CoreError::Validation(format!("`{email}` is not an email address")));
        }
        let duplicate = self
            .storage
            .list_users()?
            .into_iter()
            .any(|u| u.email.eq_ignore_ascii_case(email));
        if duplicate {
            return Err(CoreError::Validation(format!("`{email}` is already registered")));
        }
        let mut user = User::new(email, name.trim()).with_plan(Plan::Free);
        if with_trial {
            self.subscriptions().start_trial(&mut user, self.trial_days);
        }
        self.storage.save_user(&user)?;
        info!(user = %user.id, with_trial, "registered user");
        Ok(user)
    }

    pub fn account(&self, session: &Session) -> Result<AccountView, CoreError> {
        let user = resolve_user(self.storage, session)?;
        let subscriptions = self.subscriptions();
        let status = subscriptions.status(&user);
        let entitled_plan = PlanAccess::entitled_plan(&user, status);
        Ok(AccountView {
            status,
            days_left: subscriptions.days_left(&user),
            entitled_plan,
            banner: subscriptions.trial_banner(&user),
            features: self.registry.features_for(entitled_plan),
            user,
        })
    }

    /// Billing-success hook.
    pub fn upgrade(&self, session: &Session) -> Result<User, CoreError> {
        let mut user = resolve_user(self.storage, session)?;
        self.subscriptions().mark_paid(&mut user);
        self.storage.save_user(&user)?;
        Ok(user)
    }

    /// Downgrades every user whose trial lapsed while still on pro.
    pub fn sweep_lapsed_trials(&self) -> Result<usize, CoreError> {
        let subscriptions = self.subscriptions();
        let mut changed = 0;
        for mut user in self.storage.list_users()? {
            if subscriptions.downgrade_if_lapsed(&mut user) {
                self.storage.save_user(&user)?;
                changed += 1;
            }
        }
        Ok(changed)
    }

    pub fn create_budget(
        &self,
        session: &Session,
        name: &str,
        income: Option<f64>,
    ) -> Result<Budget, CoreError> {
        let user = self.authorize(session, Feature::Budgets)?;
        if !self.storage.list_budgets(user.id)?.is_empty() {
            self.authorize(session, Feature::MultipleBudgets)?;
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::Validation("budget name cannot be empty".into()));
        }
        let mut budget = Budget::new(user.id, name);
        if let Some(amount) = income {
            BudgetService::set_income(&mut budget, amount)?;
        }
        self.storage.save_budget(&budget)?;
        info!(budget = %budget.id, user = %user.id, "created budget");
        Ok(budget)
    }

    pub fn budget(&self, session: &Session, budget_id: Option<Uuid>) -> Result<Budget, CoreError> {
        let user = resolve_user(self.storage, session)?;
        resolve_budget(self.storage, &user, budget_id)
    }

    pub fn budgets(&self, session: &Session) -> Result<Vec<Budget>, CoreError> {
        let user = resolve_user(self.storage, session)?;
        self.storage.list_budgets(user.id)
    }

    pub fn set_income(
        &self,
        session: &Session,
        budget_id: Uuid,
        amount: f64,
    ) -> Result<BudgetTotals, CoreError> {
        self.edit_budget(session, budget_id, Feature::Budgets, |budget| {
            BudgetService::set_income(budget, amount)
        })
    }

    pub fn add_section(
        &self,
        session: &Session,
        budget_id: Uuid,
        name: &str,
    ) -> Result<Uuid, CoreError> {
        self.edit_budget(session, budget_id, Feature::Categories, |budget| {
            CategoryService::add_section(budget, name)
        })
    }

    pub fn add_category(
        &self,
        session: &Session,
        budget_id: Uuid,
        section_id: Uuid,
        name: &str,
        budgeted: Option<f64>,
    ) -> Result<Uuid, CoreError> {
        self.edit_budget(session, budget_id, Feature::Categories, |budget| {
            let mut category = Category::new(name);
            category.budgeted = budgeted;
            CategoryService::add_category(budget, section_id, category)
        })
    }

    pub fn set_budgeted(
        &self,
        session: &Session,
        budget_id: Uuid,
        category_id: Uuid,
        amount: f64,
    ) -> Result<BudgetTotals, CoreError> {
        self.edit_budget(session, budget_id, Feature::Categories, |budget| {
            CategoryService::set_budgeted(budget, category_id, amount)
        })
    }

    pub fn rename_category(
        &self,
        session: &Session,
        budget_id: Uuid,
        category_id: Uuid,
        name: &str,
    ) -> Result<(), CoreError> {
        self.edit_budget(session, budget_id, Feature::Categories, |budget| {
            CategoryService::rename(budget, category_id, name)
        })
    }

    pub fn record_spend(
        &self,
        session: &Session,
        budget_id: Uuid,
        category_id: Uuid,
        amount: f64,
    ) -> Result<f64, CoreError> {
        self.edit_budget(session, budget_id, Feature::ExpenseTracking, |budget| {
            CategoryService::record_spend(budget, category_id, amount)
        })
    }

    pub fn remove_category(
        &self,
        session: &Session,
        budget_id: Uuid,
        category_id: Uuid,
    ) -> Result<Category, CoreError> {
        self.edit_budget(session, budget_id, Feature::Categories, |budget| {
            CategoryService::remove_category(budget, category_id)
        })
    }

    pub fn insights(&self, session: &Session, budget_id: Uuid) -> Result<SpendingSummary, CoreError> {
        let user = self.authorize(session, Feature::SpendingInsights)?;
        let budget = resolve_budget(self.storage, &user, Some(budget_id))?;
        Ok(SummaryService::summarize(&budget))
    }

    pub fn export(&self, session: &Session, budget_id: Uuid) -> Result<Budget, CoreError> {
        let user = self.authorize(session, Feature::DataExport)?;
        resolve_budget(self.storage, &user, Some(budget_id))
    }

    pub fn notices(&self, session: &Session) -> Result<Vec<Notice>, CoreError> {
        let user = self.authorize(session, Feature::PushNotifications)?;
        let subscriptions = self.subscriptions();
        let budgets = self.storage.list_budgets(user.id)?;
        Ok(NoticeService::pending(
            subscriptions.status(&user),
            subscriptions.days_left(&user),
            &budgets,
        ))
    }
}
