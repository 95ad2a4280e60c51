use chrono::{DateTime, Utc};

use crate::domain::{
    common::{entities::app_errors::CoreError, services::Service},
    meal_plan::{
        entities::{GeneratedMeal, MealBatch, ShoppingListEntry},
        policies::{GenerationAccess, generation_access},
        ports::{LLMClient, MealPlanService},
        value_objects::{ExplainMealInput, GenerateMealsInput, ReplaceMealInput},
    },
    profile::{
        entities::{SubscriptionStatus, UserProfile},
        policies::remaining_trial_days,
        ports::{ProfileRepository, ProfileService},
        value_objects::{OnboardingInput, UpdateProfileInput},
    },
};

/// Session state owned by the shell: the current profile and the meals of
/// the last generation. Every profile mutation goes through the service so
/// it is persisted before the state changes.
pub struct AppState<P, LLM>
where
    P: ProfileRepository,
    LLM: LLMClient,
{
    service: Service<P, LLM>,
    profile: Option<UserProfile>,
    meals: Vec<GeneratedMeal>,
}

impl<P, LLM> AppState<P, LLM>
where
    P: ProfileRepository,
    LLM: LLMClient,
{
    pub fn new(service: Service<P, LLM>) -> Self {
        Self {
            service,
            profile: None,
            meals: Vec::new(),
        }
    }

    /// Loads the stored profile, expiring the trial if its window has passed.
    pub async fn boot(&mut self, now: DateTime<Utc>) -> Result<Option<&UserProfile>, CoreError> {
        self.profile = self.service.start_session(now).await?;
        Ok(self.profile.as_ref())
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub fn meals(&self) -> &[GeneratedMeal] {
        &self.meals
    }

    pub fn needs_onboarding(&self) -> bool {
        self.profile.is_none()
    }

    pub fn generation_access(&self) -> GenerationAccess {
        generation_access(self.profile.as_ref())
    }

    /// Days left in the trial, `None` outside a trial.
    pub fn remaining_trial_days(&self, now: DateTime<Utc>) -> Option<i64> {
        self.profile
            .as_ref()
            .filter(|p| p.subscription_status == SubscriptionStatus::Trial)
            .map(|p| remaining_trial_days(p, now))
    }

    pub async fn onboard(
        &mut self,
        input: OnboardingInput,
        now: DateTime<Utc>,
    ) -> Result<&UserProfile, CoreError> {
        let profile = self.service.complete_onboarding(input, now).await?;
        Ok(self.profile.insert(profile))
    }

    pub async fn edit_profile(&mut self, input: UpdateProfileInput) -> Result<&UserProfile, CoreError> {
        let current = self.profile.clone().ok_or(CoreError::NoProfile)?;
        let updated = self.service.update_profile(current, input).await?;
        Ok(self.profile.insert(updated))
    }

    pub async fn confirm_payment(&mut self) -> Result<&UserProfile, CoreError> {
        let current = self.profile.clone().ok_or(CoreError::NoProfile)?;
        let active = self.service.activate_subscription(current).await?;
        Ok(self.profile.insert(active))
    }

    fn check_access(&self) -> Result<(), CoreError> {
        match self.generation_access() {
            GenerationAccess::Allowed => Ok(()),
            denied => Err(CoreError::GenerationNotAllowed(denied)),
        }
    }

    /// Generates a new set of meals. The accepted meals replace the current
    /// ones only when the batch is not empty.
    pub async fn generate(&mut self, input: GenerateMealsInput) -> Result<MealBatch, CoreError> {
        self.check_access()?;

        let batch = self
            .service
            .generate_meals(self.profile.clone(), input)
            .await?;

        if !batch.accepted.is_empty() {
            self.meals = batch.accepted.clone();
        }

        Ok(batch)
    }

    /// Finds a replacement meal. With `slot`, the meal at that position is
    /// swapped for the replacement.
    pub async fn replace(
        &mut self,
        input: ReplaceMealInput,
        slot: Option<usize>,
    ) -> Result<Option<GeneratedMeal>, CoreError> {
        self.check_access()?;

        if let Some(index) = slot
            && index >= self.meals.len()
        {
            return Err(CoreError::Invalid(format!("no meal at position {}", index + 1)));
        }

        let replacement = self
            .service
            .find_replacement_meal(self.profile.clone(), input)
            .await?;

        if let (Some(index), Some(meal)) = (slot, &replacement) {
            self.meals[index] = meal.clone();
        }

        Ok(replacement)
    }

    pub async fn shopping_list(&self) -> Result<Vec<ShoppingListEntry>, CoreError> {
        self.service.build_shopping_list(self.meals.clone()).await
    }

    pub async fn explain(&self, input: ExplainMealInput) -> String {
        self.service.explain_inflammation(input).await
    }

    pub async fn reset(&mut self) -> Result<(), CoreError> {
        self.service.reset().await?;
        self.profile = None;
        self.meals.clear();
        Ok(())
    }
}
