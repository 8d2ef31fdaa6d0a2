//! Subscription status classification from payment flag and trial window.
//!
//! The free functions take `now` explicitly; [`SubscriptionService`] binds
//! them to a [`Clock`].

use chrono::{DateTime, Duration, Utc};
use tally_domain::{Plan, SubscriptionStatus, User};
use tracing::info;

use crate::Clock;

const MILLIS_PER_DAY: u64 = 86_400_000;

/// Whole days remaining until `trial_end`, rounded up and never negative.
///
/// A trial ending exactly at `now` has zero days left.
pub fn days_left(trial_end: Option<DateTime<Utc>>, now: DateTime<Utc>) -> u32 {
    let Some(end) = trial_end else {
        return 0;
    };
    let millis = (end - now).num_milliseconds();
    if millis <= 0 {
        return 0;
    }
    let days = (millis as u64).div_ceil(MILLIS_PER_DAY);
    u32::try_from(days).unwrap_or(u32::MAX)
}

pub fn is_expired(trial_end: Option<DateTime<Utc>>, is_paid: bool, now: DateTime<Utc>) -> bool {
    if is_paid || trial_end.is_none() {
        return false;
    }
    days_left(trial_end, now) == 0
}

pub fn is_in_trial(trial_end: Option<DateTime<Utc>>, is_paid: bool, now: DateTime<Utc>) -> bool {
    if is_paid || trial_end.is_none() {
        return false;
    }
    days_left(trial_end, now) > 0
}

/// Classifies in priority order: paid, expired, trial, none.
pub fn classify(
    is_paid: bool,
    trial_end: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> SubscriptionStatus {
    if is_paid {
        SubscriptionStatus::Paid
    } else if is_expired(trial_end, is_paid, now) {
        SubscriptionStatus::Expired
    } else if is_in_trial(trial_end, is_paid, now) {
        SubscriptionStatus::Trial
    } else {
        SubscriptionStatus::None
    }
}

/// Clock-bound view over a user's subscription state.
pub struct SubscriptionService<'a> {
    clock: &'a dyn Clock,
}

impl<'a> SubscriptionService<'a> {
    pub fn new(clock: &'a dyn Clock) -> Self {
        Self { clock }
    }

    pub fn status(&self, user: &User) -> SubscriptionStatus {
        classify(user.is_paid, user.trial_end, self.clock.now())
    }

    pub fn days_left(&self, user: &User) -> u32 {
        days_left(user.trial_end, self.clock.now())
    }

    /// Opens a trial window starting now. Trial users are put on the pro plan.
    pub fn start_trial(&self, user: &mut User, trial_days: u32) {
        let now = self.clock.now();
        user.trial_start = Some(now);
        let end = now
            .checked_add_signed(Duration::days(i64::from(trial_days)))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        user.trial_end = Some(end);
        user.plan = Some(Plan::Pro);
        info!(user = %user.id, trial_days, "started trial");
    }

    /// Records a successful payment.
    pub fn mark_paid(&self, user: &mut User) {
        user.is_paid = true;
        user.plan = Some(Plan::Pro);
        info!(user = %user.id, "marked user as paid");
    }

    /// Moves a lapsed trial user back to the free plan. Returns whether the
    /// record changed.
    pub fn downgrade_if_lapsed(&self, user: &mut User) -> bool {
        if self.status(user) == SubscriptionStatus::Expired && user.plan == Some(Plan::Pro) {
            user.plan = Some(Plan::Free);
            info!(user = %user.id, "trial lapsed, downgraded to free");
            true
        } else {
            false
        }
    }

    /// Banner text for trial countdowns and expiry prompts.
    pub fn trial_banner(&self, user: &User) -> Option<String> {
        match self.status(user) {
            SubscriptionStatus::Trial => {
                let days = self.days_left(user);
                let unit = if days == 1 { "day" } else { "days" };
                Some(format!("{days} {unit} left in your free trial"))
            }
            SubscriptionStatus::Expired => {
                Some("Your free trial has ended. Upgrade to keep pro features.".to_string())
            }
            SubscriptionStatus::Paid | SubscriptionStatus::None => None,
        }
    }
}
