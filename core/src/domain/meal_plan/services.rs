use tracing::instrument;

use crate::domain::{
    common::{entities::app_errors::CoreError, services::Service},
    meal_plan::{
        entities::{GeneratedMeal, MealBatch, ShoppingListEntry},
        helpers::merge_shopping_list,
        normalizer::{normalize, parse_replacement, parse_shopping_list, screen_meals},
        policies::ensure_generation_allowed,
        ports::{LLMClient, MealPlanService},
        prompts::{
            EXPLANATION_MAX_CHARS, compile_explanation_request, compile_meal_request,
            compile_replacement_request, compile_shopping_list_request,
        },
        value_objects::{
            ExplainMealInput, GenerateMealsInput, GenerationRequest, MealConstraints,
            ReplaceMealInput,
        },
    },
    profile::{entities::UserProfile, ports::ProfileRepository},
};

pub const EXPLANATION_UNAVAILABLE: &str = "Explication non disponible.";
pub const EXPLANATION_FAILED: &str = "Erreur lors de la récupération de l'explication.";

impl<P, LLM> Service<P, LLM>
where
    P: ProfileRepository,
    LLM: LLMClient,
{
    /// One bounded call to the collaborator.
    async fn call_llm(&self, request: GenerationRequest) -> Result<String, CoreError> {
        let timeout = self.settings.timeout;
        tracing::debug!(model = %request.model, "calling generation collaborator");

        tokio::time::timeout(timeout, self.llm_client.generate(request))
            .await
            .map_err(|_| CoreError::Timeout(timeout.as_secs()))?
    }
}

impl<P, LLM> MealPlanService for Service<P, LLM>
where
    P: ProfileRepository,
    LLM: LLMClient,
{
    #[instrument(skip_all, fields(total = input.distribution.total()))]
    async fn generate_meals(
        &self,
        profile: Option<UserProfile>,
        input: GenerateMealsInput,
    ) -> Result<MealBatch, CoreError> {
        let profile = ensure_generation_allowed(profile.as_ref())?;
        let constraints =
            MealConstraints::from_profile(profile, input.diet_tags, input.household_size)?;

        if input.distribution.is_empty() {
            tracing::debug!("empty distribution, nothing to generate");
            return Ok(MealBatch::default());
        }

        let request = compile_meal_request(&input.distribution, &constraints, &self.settings)?;
        let _guard = self.begin_generation()?;

        let raw = match self.call_llm(request).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "meal generation failed");
                return Ok(MealBatch::default());
            }
        };

        let batch = screen_meals(normalize(&raw), &constraints.excluded_ingredients);

        if !batch.is_empty() && !batch.matches_distribution(&input.distribution) {
            let counts = batch.tier_counts();
            tracing::warn!(
                requested = ?input.distribution,
                returned = ?counts,
                "generator did not honour the requested distribution"
            );
        }

        tracing::info!(
            accepted = batch.accepted.len(),
            rejected = batch.rejected.len(),
            "meal batch generated"
        );
        Ok(batch)
    }

    #[instrument(skip_all, fields(category = %input.category))]
    async fn find_replacement_meal(
        &self,
        profile: Option<UserProfile>,
        input: ReplaceMealInput,
    ) -> Result<Option<GeneratedMeal>, CoreError> {
        let profile = ensure_generation_allowed(profile.as_ref())?;
        let constraints =
            MealConstraints::from_profile(profile, input.diet_tags, input.household_size)?;

        let request =
            compile_replacement_request(&input.query, input.category, &constraints, &self.settings)?;
        let _guard = self.begin_generation()?;

        let raw = match self.call_llm(request).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "replacement search failed");
                return Ok(None);
            }
        };

        let meal = match parse_replacement(&raw) {
            Ok(meal) => meal,
            Err(e) => {
                tracing::warn!(error = %e, "discarding malformed replacement");
                return Ok(None);
            }
        };

        if let Some(term) = meal.find_excluded(&constraints.excluded_ingredients) {
            tracing::warn!(title = %meal.title, term, "replacement contains an excluded ingredient");
            return Ok(None);
        }

        if meal.category != input.category {
            tracing::debug!(returned = %meal.category, "replacement landed in another category");
        }

        Ok(Some(meal))
    }

    #[instrument(skip_all, fields(meals = meals.len()))]
    async fn build_shopping_list(
        &self,
        meals: Vec<GeneratedMeal>,
    ) -> Result<Vec<ShoppingListEntry>, CoreError> {
        if meals.is_empty() {
            return Ok(Vec::new());
        }

        let request = compile_shopping_list_request(&meals, &self.settings)?;
        let _guard = self.begin_generation()?;

        let raw = match self.call_llm(request).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "shopping list generation failed");
                return Ok(Vec::new());
            }
        };

        match parse_shopping_list(&raw) {
            Ok(entries) => Ok(merge_shopping_list(entries)),
            Err(e) => {
                tracing::warn!(error = %e, "discarding malformed shopping list");
                Ok(Vec::new())
            }
        }
    }

    #[instrument(skip_all, fields(title = %input.title))]
    async fn explain_inflammation(&self, input: ExplainMealInput) -> String {
        let request = compile_explanation_request(&input.title, &input.ingredients, &self.settings);

        match self.call_llm(request).await {
            Ok(text) if text.trim().is_empty() => EXPLANATION_UNAVAILABLE.to_string(),
            Ok(text) => text.trim().chars().take(EXPLANATION_MAX_CHARS).collect(),
            Err(e) => {
                tracing::warn!(error = %e, "explanation failed");
                EXPLANATION_FAILED.to_string()
            }
        }
    }
}
