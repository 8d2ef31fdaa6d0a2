use tally_domain::{Feature, Plan, RegistryError};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Unauthorized: no resolvable user for this session")]
    Unauthorized,
    #[error("Budget not found: {0}")]
    BudgetNotFound(String),
    #[error("Section not found: {0}")]
    SectionNotFound(Uuid),
    #[error("Category not found: {0}")]
    CategoryNotFound(Uuid),
    #[error("Feature `{feature}` requires the {required} plan")]
    FeatureLocked { feature: Feature, required: Plan },
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Serialization error: {0}")]
    Serde(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl CoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CoreError::BudgetNotFound(_)
                | CoreError::SectionNotFound(_)
                | CoreError::CategoryNotFound(_)
        )
    }
}
