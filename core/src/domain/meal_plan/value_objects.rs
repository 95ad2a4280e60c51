use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::{
    common::{LLMConfig, entities::app_errors::CoreError},
    meal_plan::entities::MealCategory,
    profile::entities::{UserProfile, normalize_labels},
};

/// Number of meals requested per tier for one generation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealDistribution {
    pub green: u32,
    pub orange: u32,
    pub red: u32,
}

impl Default for MealDistribution {
    fn default() -> Self {
        Self {
            green: 3,
            orange: 2,
            red: 1,
        }
    }
}

impl MealDistribution {
    pub fn new(green: u32, orange: u32, red: u32) -> Self {
        Self { green, orange, red }
    }

    /// Widened so that large per-tier counts cannot overflow.
    pub fn total(&self) -> u64 {
        u64::from(self.green) + u64::from(self.orange) + u64::from(self.red)
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn count_for(&self, category: MealCategory) -> u32 {
        match category {
            MealCategory::Green => self.green,
            MealCategory::Orange => self.orange,
            MealCategory::Red => self.red,
        }
    }
}

/// Dietary constraints forwarded to the generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealConstraints {
    pub diet_tags: Vec<String>,
    pub excluded_ingredients: Vec<String>,
    pub household_size: u32,
}

impl MealConstraints {
    pub fn new(
        diet_tags: Vec<String>,
        excluded_ingredients: Vec<String>,
        household_size: u32,
    ) -> Result<Self, CoreError> {
        if household_size == 0 {
            return Err(CoreError::InvalidHouseholdSize);
        }

        Ok(Self {
            diet_tags: normalize_labels(diet_tags),
            excluded_ingredients: normalize_labels(excluded_ingredients),
            household_size,
        })
    }

    /// Constraints of `profile`, with optional per-generation overrides of
    /// the diet tags and the household size. Exclusions always come from
    /// the profile.
    pub fn from_profile(
        profile: &UserProfile,
        diet_tags: Option<Vec<String>>,
        household_size: Option<u32>,
    ) -> Result<Self, CoreError> {
        Self::new(
            diet_tags.unwrap_or_else(|| profile.diet_tags.clone()),
            profile.excluded_ingredients.clone(),
            household_size.unwrap_or(profile.household_size),
        )
    }
}

/// Models and limits used when talking to the generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationSettings {
    pub meal_model: String,
    pub fast_model: String,
    pub timeout: Duration,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self::from(&LLMConfig::default())
    }
}

impl From<&LLMConfig> for GenerationSettings {
    fn from(config: &LLMConfig) -> Self {
        Self {
            meal_model: config.meal_model.clone(),
            fast_model: config.fast_model.clone(),
            timeout: config.request_timeout,
        }
    }
}

/// One call to the generation collaborator: an instruction, an optional
/// system instruction and an optional structured-output schema.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub model: String,
    pub system_instruction: Option<String>,
    pub prompt: String,
    pub response_schema: Option<serde_json::Value>,
}

#[derive(Debug, Clone)]
pub struct GenerateMealsInput {
    pub distribution: MealDistribution,
    pub diet_tags: Option<Vec<String>>,
    pub household_size: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct ReplaceMealInput {
    pub query: String,
    pub category: MealCategory,
    pub diet_tags: Option<Vec<String>>,
    pub household_size: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct ExplainMealInput {
    pub title: String,
    pub ingredients: Vec<String>,
}
