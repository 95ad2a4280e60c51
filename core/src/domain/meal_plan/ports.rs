use std::future::Future;

use crate::domain::{
    common::entities::app_errors::CoreError,
    meal_plan::{
        entities::{GeneratedMeal, MealBatch, ShoppingListEntry},
        value_objects::{ExplainMealInput, GenerateMealsInput, GenerationRequest, ReplaceMealInput},
    },
    profile::entities::UserProfile,
};

/// LLM Client trait for calling the generation collaborator
#[cfg_attr(test, mockall::automock)]
pub trait LLMClient: Send + Sync {
    /// Returns the raw text of the first candidate.
    fn generate(
        &self,
        request: GenerationRequest,
    ) -> impl Future<Output = Result<String, CoreError>> + Send;
}

/// Service trait for meal planning
#[cfg_attr(test, mockall::automock)]
pub trait MealPlanService: Send + Sync {
    /// Generates a batch following `input.distribution`. Collaborator and
    /// parse failures produce an empty batch, not an error.
    fn generate_meals(
        &self,
        profile: Option<UserProfile>,
        input: GenerateMealsInput,
    ) -> impl Future<Output = Result<MealBatch, CoreError>> + Send;

    fn find_replacement_meal(
        &self,
        profile: Option<UserProfile>,
        input: ReplaceMealInput,
    ) -> impl Future<Output = Result<Option<GeneratedMeal>, CoreError>> + Send;

    fn build_shopping_list(
        &self,
        meals: Vec<GeneratedMeal>,
    ) -> impl Future<Output = Result<Vec<ShoppingListEntry>, CoreError>> + Send;

    fn explain_inflammation(
        &self,
        input: ExplainMealInput,
    ) -> impl Future<Output = String> + Send;
}
