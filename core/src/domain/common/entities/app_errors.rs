use thiserror::Error;

use crate::domain::meal_plan::policies::GenerationAccess;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    #[error("Invalid input: {0}")]
    Invalid(String),

    #[error("Meal distribution is empty")]
    EmptyDistribution,

    #[error("Household size must be at least 1")]
    InvalidHouseholdSize,

    #[error("No profile, onboarding required")]
    NoProfile,

    #[error("Generation is not allowed: {0:?}")]
    GenerationNotAllowed(GenerationAccess),

    #[error("A generation is already in progress")]
    GenerationInProgress,

    #[error("Subscription transition not allowed: {from} -> {to}")]
    InvalidSubscriptionTransition { from: String, to: String },

    #[error("External service error: {0}")]
    ExternalServiceError(String),

    #[error("External service timed out after {0} seconds")]
    Timeout(u64),

    #[error("Storage error: {0}")]
    StorageError(String),
}
