use serde::{Deserialize, Serialize};

use crate::domain::{
    common::entities::app_errors::CoreError,
    profile::entities::{SubscriptionStatus, UserProfile},
};

/// What the generation screen should show for a given profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationAccess {
    Allowed,
    /// No profile yet: onboarding comes first.
    NoProfile,
    /// Trial over and no payment: the upgrade path is shown instead.
    Expired,
}

pub fn generation_access(profile: Option<&UserProfile>) -> GenerationAccess {
    match profile.map(|p| p.subscription_status) {
        None => GenerationAccess::NoProfile,
        Some(SubscriptionStatus::Expired) => GenerationAccess::Expired,
        Some(SubscriptionStatus::Trial) | Some(SubscriptionStatus::Active) => {
            GenerationAccess::Allowed
        }
    }
}

/// Trial and active profiles may generate, expired ones may not. The trial
/// clock is not consulted here; `refresh_subscription_status` writes the
/// expiry into the profile beforehand.
pub fn can_generate(profile: Option<&UserProfile>) -> bool {
    generation_access(profile) == GenerationAccess::Allowed
}

/// Returns the profile when generation is allowed, the denial otherwise.
pub fn ensure_generation_allowed(profile: Option<&UserProfile>) -> Result<&UserProfile, CoreError> {
    match (generation_access(profile), profile) {
        (GenerationAccess::Allowed, Some(profile)) => Ok(profile),
        (access, _) => Err(CoreError::GenerationNotAllowed(access)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        meal_plan::value_objects::MealConstraints,
        profile::{
            entities::{ApproxLocation, ProfileStatus, Visibility},
            policies::refresh_subscription_status,
        },
    };
    use chrono::{Duration, Utc};

    fn profile(status: SubscriptionStatus) -> UserProfile {
        let mut profile = UserProfile::new(
            "Rose".into(),
            ProfileStatus::Diagnosed,
            vec![],
            vec![],
            1,
            Visibility::City,
            ApproxLocation::paris(),
            Utc::now(),
        );
        profile.subscription_status = status;
        profile
    }

    #[test]
    fn test_expired_never_generates() {
        for profile_status in [
            ProfileStatus::Diagnosed,
            ProfileStatus::Suspicion,
            ProfileStatus::Supporter,
        ] {
            for visibility in [Visibility::City, Visibility::Off] {
                for household in 1..=6 {
                    let mut p = profile(SubscriptionStatus::Expired);
                    p.status = profile_status;
                    p.visibility = visibility;
                    p.household_size = household;
                    p.diet_tags = vec!["Vegan".into()];
                    assert!(!can_generate(Some(&p)));
                    assert_eq!(generation_access(Some(&p)), GenerationAccess::Expired);
                }
            }
        }
    }

    #[test]
    fn test_trial_and_active_generate() {
        assert!(can_generate(Some(&profile(SubscriptionStatus::Trial))));
        assert!(can_generate(Some(&profile(SubscriptionStatus::Active))));
    }

    #[test]
    fn test_no_profile_is_denied() {
        assert!(!can_generate(None));
        assert_eq!(generation_access(None), GenerationAccess::NoProfile);
        assert_eq!(
            ensure_generation_allowed(None),
            Err(CoreError::GenerationNotAllowed(GenerationAccess::NoProfile))
        );
    }

    #[test]
    fn test_old_trial_is_denied_after_refresh() {
        let mut p = profile(SubscriptionStatus::Trial);
        p.trial_start_date = Utc::now() - Duration::days(35);
        assert!(can_generate(Some(&p)));

        let refreshed = refresh_subscription_status(&p, Utc::now());
        assert!(!can_generate(Some(&refreshed)));
        assert!(MealConstraints::from_profile(&refreshed, None, None).is_ok());
    }
}
