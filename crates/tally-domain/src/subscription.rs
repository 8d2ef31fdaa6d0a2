//! Derived subscription classifications.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Subscription state derived from a user's payment flag and trial window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Paid,
    Trial,
    Expired,
    None,
}

impl SubscriptionStatus {
    pub fn label(self) -> &'static str {
        match self {
            SubscriptionStatus::Paid => "paid",
            SubscriptionStatus::Trial => "trial",
            SubscriptionStatus::Expired => "expired",
            SubscriptionStatus::None => "none",
        }
    }

    /// Paid subscribers and active trials receive pro entitlements.
    pub fn grants_pro(self) -> bool {
        matches!(self, SubscriptionStatus::Paid | SubscriptionStatus::Trial)
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_paid_and_trial_grant_pro() {
        assert!(SubscriptionStatus::Paid.grants_pro());
        assert!(SubscriptionStatus::Trial.grants_pro());
        assert!(!SubscriptionStatus::Expired.grants_pro());
        assert!(!SubscriptionStatus::None.grants_pro());
    }
}
