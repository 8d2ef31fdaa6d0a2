//! Subscription plan identifiers.

use std::{collections::BTreeSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Subscription tier controlling feature access.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    #[default]
    Free,
    Pro,
}

impl Plan {
    pub const ALL: [Plan; 2] = [Plan::Free, Plan::Pro];

    pub fn as_str(self) -> &'static str {
        match self {
            Plan::Free => "free",
            Plan::Pro => "pro",
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown plan `{0}`")]
pub struct PlanParseError(pub String);

impl FromStr for Plan {
    type Err = PlanParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(Plan::Free),
            "pro" => Ok(Plan::Pro),
            _ => Err(PlanParseError(s.to_string())),
        }
    }
}

/// The plans permitted to use a feature.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSet(BTreeSet<Plan>);

impl PlanSet {
    pub fn contains(&self, plan: Plan) -> bool {
        self.0.contains(&plan)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Plan> + '_ {
        self.0.iter().copied()
    }

    /// True when `pro` may use the feature and `free` may not.
    pub fn is_pro_only(&self) -> bool {
        self.contains(Plan::Pro) && !self.contains(Plan::Free)
    }
}

impl FromIterator<Plan> for PlanSet {
    fn from_iter<T: IntoIterator<Item = Plan>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[Plan; N]> for PlanSet {
    fn from(plans: [Plan; N]) -> Self {
        plans.into_iter().collect()
    }
}

impl fmt::Display for PlanSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<&str> = self.iter().map(Plan::as_str).collect();
        f.write_str(&labels.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("PRO".parse::<Plan>(), Ok(Plan::Pro));
        assert_eq!(" free ".parse::<Plan>(), Ok(Plan::Free));
        assert!("enterprise".parse::<Plan>().is_err());
    }

    #[test]
    fn pro_only_requires_absence_of_free() {
        assert!(PlanSet::from([Plan::Pro]).is_pro_only());
        assert!(!PlanSet::from([Plan::Free, Plan::Pro]).is_pro_only());
        assert!(!PlanSet::from([Plan::Free]).is_pro_only());
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&Plan::Pro).expect("serialize");
        assert_eq!(json, "\"pro\"");
    }
}
