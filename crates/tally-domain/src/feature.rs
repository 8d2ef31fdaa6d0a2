//! Named capabilities and the registry mapping them to permitted plans.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::plan::{Plan, PlanSet};

/// Every capability the product gates by plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Budgets,
    Categories,
    ExpenseTracking,
    PushNotifications,
    MultipleBudgets,
    SpendingInsights,
    DataExport,
    BudgetSharing,
}

impl Feature {
    pub const ALL: [Feature; 8] = [
        Feature::Budgets,
        Feature::Categories,
        Feature::ExpenseTracking,
        Feature::PushNotifications,
        Feature::MultipleBudgets,
        Feature::SpendingInsights,
        Feature::DataExport,
        Feature::BudgetSharing,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Feature::Budgets => "budgets",
            Feature::Categories => "categories",
            Feature::ExpenseTracking => "expense_tracking",
            Feature::PushNotifications => "push_notifications",
            Feature::MultipleBudgets => "multiple_budgets",
            Feature::SpendingInsights => "spending_insights",
            Feature::DataExport => "data_export",
            Feature::BudgetSharing => "budget_sharing",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Feature::Budgets => "Create a monthly budget",
            Feature::Categories => "Organise spending into categories",
            Feature::ExpenseTracking => "Record expenses against categories",
            Feature::PushNotifications => "Trial and overspending reminders",
            Feature::MultipleBudgets => "Keep more than one budget",
            Feature::SpendingInsights => "Spending breakdowns and trends",
            Feature::DataExport => "Export budgets as JSON",
            Feature::BudgetSharing => "Share a budget with another user",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Feature {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim();
        Feature::ALL
            .into_iter()
            .find(|feature| feature.key() == key)
            .ok_or_else(|| RegistryError::UnknownFeature(key.to_string()))
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("unknown feature key `{0}`")]
    UnknownFeature(String),
    #[error("feature `{0}` is registered more than once")]
    Duplicate(Feature),
    #[error("feature `{0}` has no permitted plans")]
    EmptyPlanSet(Feature),
    #[error("feature `{0}` is missing from the registry")]
    Missing(Feature),
}

/// Static configuration mapping each feature to the plans allowed to use it.
///
/// Construction validates the table: each [`Feature`] appears exactly once
/// and has at least one permitted plan. A registry that exists is complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureRegistry {
    entries: BTreeMap<Feature, PlanSet>,
}

impl FeatureRegistry {
    pub fn from_entries<I, P>(entries: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = (Feature, P)>,
        P: Into<PlanSet>,
    {
        let mut table = BTreeMap::new();
        for (feature, plans) in entries {
            let plans = plans.into();
            if plans.is_empty() {
                return Err(RegistryError::EmptyPlanSet(feature));
            }
            if table.insert(feature, plans).is_some() {
                return Err(RegistryError::Duplicate(feature));
            }
        }
        if let Some(missing) = Feature::ALL.into_iter().find(|f| !table.contains_key(f)) {
            return Err(RegistryError::Missing(missing));
        }
        Ok(Self { entries: table })
    }

    /// The product's shipped feature matrix.
    pub fn standard() -> Self {
        use Plan::{Free, Pro};

        let entries: [(Feature, PlanSet); 8] = [
            (Feature::Budgets, [Free, Pro].into()),
            (Feature::Categories, [Free, Pro].into()),
            (Feature::ExpenseTracking, [Free, Pro].into()),
            (Feature::PushNotifications, [Free, Pro].into()),
            (Feature::MultipleBudgets, [Pro].into()),
            (Feature::SpendingInsights, [Pro].into()),
            (Feature::DataExport, [Pro].into()),
            (Feature::BudgetSharing, [Pro].into()),
        ];
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    pub fn plans_for(&self, feature: Feature) -> &PlanSet {
        // Construction guarantees every variant is present.
        &self.entries[&feature]
    }

    pub fn permits(&self, feature: Feature, plan: Plan) -> bool {
        self.plans_for(feature).contains(plan)
    }

    pub fn features(&self) -> impl Iterator<Item = (Feature, &PlanSet)> {
        self.entries.iter().map(|(feature, plans)| (*feature, plans))
    }

    pub fn features_for(&self, plan: Plan) -> BTreeSet<Feature> {
        self.features()
            .filter(|(_, plans)| plans.contains(plan))
            .map(|(feature, _)| feature)
            .collect()
    }
}

impl Default for FeatureRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_registry_passes_validation() {
        let standard = FeatureRegistry::standard();
        let rebuilt = FeatureRegistry::from_entries(
            standard.features().map(|(feature, plans)| (feature, plans.clone())),
        )
        .expect("standard registry is valid");
        assert_eq!(rebuilt, standard);
    }

    #[test]
    fn every_feature_has_a_plan() {
        let registry = FeatureRegistry::standard();
        for feature in Feature::ALL {
            assert!(!registry.plans_for(feature).is_empty(), "{feature}");
        }
    }

    #[test]
    fn rejects_empty_plan_set() {
        let entries = Feature::ALL.map(|feature| {
            if feature == Feature::DataExport {
                (feature, PlanSet::default())
            } else {
                (feature, PlanSet::from([Plan::Free]))
            }
        });
        assert_eq!(
            FeatureRegistry::from_entries(entries),
            Err(RegistryError::EmptyPlanSet(Feature::DataExport))
        );
    }

    #[test]
    fn rejects_missing_and_duplicate_features() {
        let missing = [(Feature::Budgets, PlanSet::from([Plan::Free]))];
        assert_eq!(
            FeatureRegistry::from_entries(missing),
            Err(RegistryError::Missing(Feature::Categories))
        );

        let duplicate = [
            (Feature::Budgets, PlanSet::from([Plan::Free])),
            (Feature::Budgets, PlanSet::from([Plan::Pro])),
        ];
        assert_eq!(
            FeatureRegistry::from_entries(duplicate),
            Err(RegistryError::Duplicate(Feature::Budgets))
        );
    }

    #[test]
    fn unknown_key_fails_to_parse() {
        assert_eq!("data_export".parse::<Feature>(), Ok(Feature::DataExport));
        assert_eq!(
            "teleport".parse::<Feature>(),
            Err(RegistryError::UnknownFeature("teleport".into()))
        );
    }
}
