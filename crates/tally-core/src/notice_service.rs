//! User-facing reminders derived from subscription and spending state.
//! Delivery is someone else's job; these are data only.

use std::fmt;

use serde::Serialize;
use tally_domain::{Budget, SubscriptionStatus};
use uuid::Uuid;

/// Trials ending within this many days trigger a reminder.
pub const TRIAL_REMINDER_DAYS: u32 = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    TrialEnding {
        days_left: u32,
    },
    TrialExpired,
    CategoryOverspent {
        budget_id: Uuid,
        category_id: Uuid,
        name: String,
        over_by: f64,
    },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::TrialEnding { days_left: 1 } => write!(f, "Your trial ends tomorrow"),
            Notice::TrialEnding { days_left } => {
                write!(f, "Your trial ends in {days_left} days")
            }
            Notice::TrialExpired => write!(f, "Your trial has expired"),
            Notice::CategoryOverspent { name, over_by, .. } => {
                write!(f, "{name} is over budget by {over_by:.2}")
            }
        }
    }
}

pub struct NoticeService;

impl NoticeService {
    pub fn pending(status: SubscriptionStatus, days_left: u32, budgets: &[Budget]) -> Vec<Notice> {
        let mut notices = Vec::new();
        match status {
            SubscriptionStatus::Trial if days_left <= TRIAL_REMINDER_DAYS => {
                notices.push(Notice::TrialEnding { days_left });
            }
            SubscriptionStatus::Expired => notices.push(Notice::TrialExpired),
            _ => {}
        }
        for budget in budgets {
            for category in budget.categories().filter(|c| c.is_overspent()) {
                notices.push(Notice::CategoryOverspent {
                    budget_id: budget.id,
                    category_id: category.id,
                    name: category.name.clone(),
                    over_by: -category.remaining(),
                });
            }
        }
        notices
    }
}
