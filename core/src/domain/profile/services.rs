use chrono::{DateTime, Utc};
use tracing::instrument;

use crate::domain::{
    common::{entities::app_errors::CoreError, services::Service},
    meal_plan::ports::LLMClient,
    profile::{
        entities::{
            ApproxLocation, SubscriptionStatus, UserProfile, Visibility, clamp_household_size,
            normalize_labels,
        },
        policies::refresh_subscription_status,
        ports::{ProfileRepository, ProfileService},
        value_objects::{DEFAULT_DIET_TAG, DEFAULT_PSEUDO, OnboardingInput, UpdateProfileInput},
    },
};

impl<P, LLM> ProfileService for Service<P, LLM>
where
    P: ProfileRepository,
    LLM: LLMClient,
{
    #[instrument(skip(self))]
    async fn start_session(&self, now: DateTime<Utc>) -> Result<Option<UserProfile>, CoreError> {
        if !self.profile_repository.is_onboarding_completed().await? {
            return Ok(None);
        }

        let Some(profile) = self.profile_repository.load().await? else {
            tracing::warn!("onboarding flag set but no readable profile, onboarding again");
            return Ok(None);
        };

        let refreshed = refresh_subscription_status(&profile, now);
        if refreshed.subscription_status != profile.subscription_status {
            tracing::info!(profile_id = %refreshed.id, "trial window elapsed, subscription expired");
            self.profile_repository.save(refreshed.clone()).await?;
        }

        Ok(Some(refreshed))
    }

    #[instrument(skip(self, input))]
    async fn complete_onboarding(
        &self,
        input: OnboardingInput,
        now: DateTime<Utc>,
    ) -> Result<UserProfile, CoreError> {
        let profile = build_onboarding_profile(input, now);

        self.profile_repository.save(profile.clone()).await?;
        self.profile_repository.mark_onboarding_completed().await?;

        tracing::info!(profile_id = %profile.id, "onboarding completed");
        Ok(profile)
    }

    #[instrument(skip_all, fields(profile_id = %profile.id))]
    async fn update_profile(
        &self,
        profile: UserProfile,
        input: UpdateProfileInput,
    ) -> Result<UserProfile, CoreError> {
        if input.is_empty() {
            return Ok(profile);
        }

        let updated = apply_profile_update(profile, input)?;
        self.profile_repository.save(updated.clone()).await?;

        Ok(updated)
    }

    #[instrument(skip_all, fields(profile_id = %profile.id))]
    async fn activate_subscription(&self, profile: UserProfile) -> Result<UserProfile, CoreError> {
        if profile.subscription_status == SubscriptionStatus::Active {
            return Ok(profile);
        }

        let from = profile.subscription_status;
        if !from.can_transition_to(SubscriptionStatus::Active) {
            return Err(CoreError::InvalidSubscriptionTransition {
                from: from.as_str().to_string(),
                to: SubscriptionStatus::Active.as_str().to_string(),
            });
        }

        let mut activated = profile;
        activated.subscription_status = SubscriptionStatus::Active;
        self.profile_repository.save(activated.clone()).await?;

        tracing::info!(from = from.as_str(), "subscription activated");
        Ok(activated)
    }

    async fn reset(&self) -> Result<(), CoreError> {
        self.profile_repository.clear().await
    }
}

pub fn build_onboarding_profile(input: OnboardingInput, now: DateTime<Utc>) -> UserProfile {
    let pseudo = input
        .pseudo
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| DEFAULT_PSEUDO.to_string());

    let diet_tags = input
        .diet_tags
        .unwrap_or_else(|| vec![DEFAULT_DIET_TAG.to_string()]);

    UserProfile::new(
        pseudo,
        input.status,
        diet_tags,
        Vec::new(),
        1,
        Visibility::City,
        input.location.unwrap_or_else(ApproxLocation::paris),
        now,
    )
}

/// Applies every edit of `input` to `profile`. The id, the location and the
/// subscription fields are never touched here.
pub fn apply_profile_update(
    mut profile: UserProfile,
    input: UpdateProfileInput,
) -> Result<UserProfile, CoreError> {
    if let Some(pseudo) = input.pseudo {
        let pseudo = pseudo.trim();
        if pseudo.is_empty() {
            return Err(CoreError::Invalid("pseudo must not be blank".to_string()));
        }
        profile.pseudo = pseudo.to_string();
    }

    if let Some(avatar_url) = input.avatar_url {
        profile.avatar_url = Some(avatar_url).filter(|url| !url.trim().is_empty());
    }

    if let Some(status) = input.status {
        profile.status = status;
    }

    if let Some(visibility) = input.visibility {
        profile.visibility = visibility;
    }

    if let Some(size) = input.household_size {
        profile.household_size = clamp_household_size(size);
    }

    if let Some(delta) = input.household_delta {
        let shifted = i64::from(profile.household_size) + i64::from(delta);
        profile.household_size = clamp_household_size(shifted.clamp(0, i64::from(u32::MAX)) as u32);
    }

    let mut diet_tags = profile.diet_tags;
    for tag in &input.toggle_diet_tags {
        if contains_label(&diet_tags, tag) {
            remove_label(&mut diet_tags, tag);
        } else {
            diet_tags.push(tag.clone());
        }
    }
    diet_tags.extend(input.add_diet_tags);
    for tag in &input.remove_diet_tags {
        remove_label(&mut diet_tags, tag);
    }
    profile.diet_tags = normalize_labels(diet_tags);

    let mut excluded = profile.excluded_ingredients;
    excluded.extend(input.add_excluded_ingredients);
    for ingredient in &input.remove_excluded_ingredients {
        remove_label(&mut excluded, ingredient);
    }
    profile.excluded_ingredients = normalize_labels(excluded);

    Ok(profile)
}

fn contains_label(labels: &[String], label: &str) -> bool {
    let needle = label.trim().to_lowercase();
    labels.iter().any(|l| l.trim().to_lowercase() == needle)
}

fn remove_label(labels: &mut Vec<String>, label: &str) {
    let needle = label.trim().to_lowercase();
    labels.retain(|l| l.trim().to_lowercase() != needle);
}
