//! Property-based tests for budget reconciliation and plan gating.

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use tally_core::{classify, days_left, BudgetService, PlanAccess};
use tally_domain::{Category, Feature, FeatureRegistry, Plan, PlanSet, SubscriptionStatus, User};

// ============================================================================
// Strategies
// ============================================================================

/// Allocations in whole cents so float sums stay exact enough to compare.
fn arb_allocations() -> impl Strategy<Value = Vec<Option<f64>>> {
    prop::collection::vec(
        prop::option::of((0u32..1_000_000).prop_map(|cents| f64::from(cents) / 100.0)),
        0..24,
    )
}

fn arb_pool() -> impl Strategy<Value = f64> {
    (0u32..5_000_000).prop_map(|cents| f64::from(cents) / 100.0)
}

fn arb_plan_set() -> impl Strategy<Value = PlanSet> {
    prop_oneof![
        Just(PlanSet::from([Plan::Free])),
        Just(PlanSet::from([Plan::Pro])),
        Just(PlanSet::from([Plan::Free, Plan::Pro])),
    ]
}

/// Registries where every free feature is also a pro feature.
fn arb_registry() -> impl Strategy<Value = FeatureRegistry> {
    prop::collection::vec(arb_plan_set(), Feature::ALL.len()).prop_map(|sets| {
        let entries = Feature::ALL.into_iter().zip(sets).map(|(feature, plans)| {
            let plans = if plans.contains(Plan::Free) {
                PlanSet::from([Plan::Free, Plan::Pro])
            } else {
                plans
            };
            (feature, plans)
        });
        FeatureRegistry::from_entries(entries).expect("generated registry is complete")
    })
}

fn to_categories(allocations: &[Option<f64>]) -> Vec<Category> {
    allocations
        .iter()
        .map(|amount| {
            let mut category = Category::new("generated");
            category.budgeted = *amount;
            category
        })
        .collect()
}

// ============================================================================
// Reconciliation Properties
// ============================================================================

proptest! {
    /// Property: available funds never go negative and budgeted is the plain sum
    #[test]
    fn prop_available_never_negative(allocations in arb_allocations(), pool in arb_pool()) {
        let categories = to_categories(&allocations);
        let totals = BudgetService::reconcile(&categories, pool);
        let expected: f64 = allocations.iter().map(|a| a.unwrap_or(0.0)).sum();

        prop_assert!(totals.total_available >= 0.0);
        prop_assert!((totals.total_budgeted - expected).abs() < 1e-6);
    }

    /// Property: over-allocation clamps available to zero
    #[test]
    fn prop_over_allocation_clamps(allocations in arb_allocations(), pool in arb_pool()) {
        let categories = to_categories(&allocations);
        let totals = BudgetService::reconcile(&categories, pool);
        if totals.total_budgeted >= pool {
            prop_assert_eq!(totals.total_available, 0.0);
        } else {
            prop_assert!((totals.total_budgeted + totals.total_available - pool).abs() < 1e-6);
        }
    }

    /// Property: reconciliation is a pure function of its inputs
    #[test]
    fn prop_reconcile_is_idempotent(allocations in arb_allocations(), pool in arb_pool()) {
        let categories = to_categories(&allocations);
        let first = BudgetService::reconcile(&categories, pool);
        let second = BudgetService::reconcile(&categories, pool);
        prop_assert_eq!(first, second);
    }
}

// ============================================================================
// Subscription Properties
// ============================================================================

proptest! {
    /// Property: paid always wins, whatever the trial window says
    #[test]
    fn prop_paid_dominates(offset_hours in -10_000i64..10_000, has_trial in any::<bool>()) {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let trial_end = has_trial.then(|| now + Duration::hours(offset_hours));
        prop_assert_eq!(classify(true, trial_end, now), SubscriptionStatus::Paid);
    }

    /// Property: unpaid users are in trial exactly while days remain
    #[test]
    fn prop_trial_iff_days_left(offset_minutes in -100_000i64..100_000) {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let trial_end = Some(now + Duration::minutes(offset_minutes));
        let status = classify(false, trial_end, now);
        if days_left(trial_end, now) > 0 {
            prop_assert_eq!(status, SubscriptionStatus::Trial);
        } else {
            prop_assert_eq!(status, SubscriptionStatus::Expired);
        }
    }
}

// ============================================================================
// Plan Access Properties
// ============================================================================

proptest! {
    /// Property: pro-only features are available to pro and never to free
    #[test]
    fn prop_pro_only_partition(registry in arb_registry()) {
        let access = PlanAccess::new(&registry);
        let free = User::new("free@example.com", "Free").with_plan(Plan::Free);
        let pro = User::new("pro@example.com", "Pro").with_plan(Plan::Pro);

        let pro_only = access.pro_only_features();
        let pro_features = access.available_features(Some(&pro));
        let free_features = access.available_features(Some(&free));

        prop_assert!(pro_only.is_subset(&pro_features));
        prop_assert!(pro_only.is_disjoint(&free_features));
        prop_assert!(pro_features.len() >= free_features.len());
        for feature in Feature::ALL {
            prop_assert!(!access.has_access(None, feature));
        }
    }
}
