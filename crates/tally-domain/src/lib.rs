//! tally-domain
//!
//! Pure domain models (Budget, Section, Category, User, Plan, Feature).
//! No I/O, no CLI, no storage. Only data types, enums and the feature registry.

pub mod budget;
pub mod category;
pub mod feature;
pub mod plan;
pub mod subscription;
pub mod user;

pub use budget::*;
pub use category::*;
pub use feature::*;
pub use plan::*;
pub use subscription::*;
pub use user::*;
