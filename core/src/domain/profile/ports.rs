use std::future::Future;

use crate::domain::{
    common::entities::app_errors::CoreError,
    profile::{
        entities::UserProfile,
        value_objects::{OnboardingInput, UpdateProfileInput},
    },
};
use chrono::{DateTime, Utc};

/// Local persistence for the two profile slots: the onboarding flag and the
/// current profile.
#[cfg_attr(test, mockall::automock)]
pub trait ProfileRepository: Send + Sync {
    /// Returns `None` when nothing is stored or the stored profile is
    /// unreadable.
    fn load(&self) -> impl Future<Output = Result<Option<UserProfile>, CoreError>> + Send;

    fn save(&self, profile: UserProfile) -> impl Future<Output = Result<(), CoreError>> + Send;

    fn is_onboarding_completed(&self) -> impl Future<Output = Result<bool, CoreError>> + Send;

    fn mark_onboarding_completed(&self) -> impl Future<Output = Result<(), CoreError>> + Send;

    fn clear(&self) -> impl Future<Output = Result<(), CoreError>> + Send;
}

#[cfg_attr(test, mockall::automock)]
pub trait ProfileService: Send + Sync {
    /// Loads the stored profile and applies the trial expiry check.
    fn start_session(
        &self,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<Option<UserProfile>, CoreError>> + Send;

    fn complete_onboarding(
        &self,
        input: OnboardingInput,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<UserProfile, CoreError>> + Send;

    fn update_profile(
        &self,
        profile: UserProfile,
        input: UpdateProfileInput,
    ) -> impl Future<Output = Result<UserProfile, CoreError>> + Send;

    fn activate_subscription(
        &self,
        profile: UserProfile,
    ) -> impl Future<Output = Result<UserProfile, CoreError>> + Send;

    fn reset(&self) -> impl Future<Output = Result<(), CoreError>> + Send;
}
