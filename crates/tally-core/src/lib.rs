//! tally-core
//!
//! Business logic and services for tally: budget reconciliation, subscription
//! classification and plan-gated feature access.
//! Depends on tally-domain. No CLI, no terminal I/O, storage only through
//! [`storage::BudgetStorage`] handles passed in by the caller.

pub mod budget_service;
pub mod category_service;
pub mod error;
pub mod notice_service;
pub mod plan_access;
pub mod reconcile_service;
pub mod storage;
pub mod subscription_service;
pub mod summary_service;
pub mod time;
pub mod workspace_service;

pub use budget_service::*;
pub use category_service::*;
pub use error::CoreError;
pub use notice_service::*;
pub use plan_access::*;
pub use reconcile_service::*;
pub use subscription_service::*;
pub use summary_service::*;
pub use time::{Clock, FixedClock};
pub use workspace_service::*;
