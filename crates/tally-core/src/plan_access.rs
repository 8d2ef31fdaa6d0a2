//! Plan-gated feature access.

use std::collections::BTreeSet;

use tally_domain::{Feature, FeatureRegistry, Plan, SubscriptionStatus, User};
use tracing::warn;

use crate::CoreError;

/// Evaluates feature access against a [`FeatureRegistry`].
///
/// `has_access` and `available_features` read the user's stored plan field
/// only. Write paths go through [`PlanAccess::ensure_feature`], which also
/// consults the current subscription status.
#[derive(Debug, Clone, Copy)]
pub struct PlanAccess<'r> {
    registry: &'r FeatureRegistry,
}

impl<'r> PlanAccess<'r> {
    pub fn new(registry: &'r FeatureRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'r FeatureRegistry {
        self.registry
    }

    /// The user's plan field, `free` when absent or when there is no user.
    pub fn effective_plan(user: Option<&User>) -> Plan {
        user.and_then(|u| u.plan).unwrap_or_default()
    }

    /// No user means no access, regardless of what the free plan permits.
    pub fn has_access(&self, user: Option<&User>, feature: Feature) -> bool {
        match user {
            Some(user) => self
                .registry
                .permits(feature, Self::effective_plan(Some(user))),
            None => false,
        }
    }

    pub fn available_features(&self, user: Option<&User>) -> BTreeSet<Feature> {
        match user {
            Some(user) => self
                .registry
                .features_for(Self::effective_plan(Some(user))),
            None => BTreeSet::new(),
        }
    }

    /// Features usable on `pro` but not on `free`.
    pub fn pro_only_features(&self) -> BTreeSet<Feature> {
        self.registry
            .features()
            .filter(|(_, plans)| plans.is_pro_only())
            .map(|(feature, _)| feature)
            .collect()
    }

    /// Plan that governs write access right now.
    ///
    /// Paid users and active trials are pro. An expired trial is free even if
    /// the stored plan field still says pro. Otherwise the stored plan applies.
    pub fn entitled_plan(user: &User, status: SubscriptionStatus) -> Plan {
        if status.grants_pro() {
            Plan::Pro
        } else if status == SubscriptionStatus::Expired {
            Plan::Free
        } else {
            Self::effective_plan(Some(user))
        }
    }

    /// Gate for write operations on plan-restricted features.
    pub fn ensure_feature(
        &self,
        user: Option<&User>,
        status: SubscriptionStatus,
        feature: Feature,
    ) -> Result<(), CoreError> {
        let user = user.ok_or(CoreError::Unauthorized)?;
        let plan = Self::entitled_plan(user, status);
        if self.registry.permits(feature, plan) {
            return Ok(());
        }
        let required = self
            .registry
            .plans_for(feature)
            .iter()
            .next()
            .unwrap_or(Plan::Pro);
        warn!(user = %user.id, %feature, %plan, %status, "feature denied by plan");
        Err(CoreError::FeatureLocked { feature, required })
    }
}
