//! Compiles user constraints into requests for the generation collaborator.
//! Every function here is deterministic: the same inputs always produce the
//! same request.

use crate::domain::{
    common::entities::app_errors::CoreError,
    meal_plan::{
        entities::{GeneratedMeal, MealCategory},
        schema::{get_meal_batch_schema, get_replacement_meal_schema, get_shopping_list_schema},
        value_objects::{GenerationRequest, GenerationSettings, MealConstraints, MealDistribution},
    },
};

pub const NUTRITION_SYSTEM_INSTRUCTION: &str = "Tu es un expert en nutrition anti-inflammatoire spécialisé dans l'endométriose. Ton ton est rassurant et pédagogique.";

pub const EXPLANATION_MAX_CHARS: usize = 300;

/// Upper bound on the meals of one batch request.
pub const MAX_MEALS_PER_REQUEST: u64 = 21;

const NONE_LABEL: &str = "aucun";

fn tier_line(category: MealCategory, count: u32) -> String {
    let (label, meaning) = match category {
        MealCategory::Green => ("VERTS", "hautement anti-inflammatoires"),
        MealCategory::Orange => ("ORANGES", "neutres/équilibrés"),
        MealCategory::Red => ("ROUGES", "plaisirs occasionnels"),
    };

    format!(
        "- {count} repas \"{label}\" (category \"{}\", score {}, {meaning})",
        category.as_str(),
        category.score_band()
    )
}

fn constraint_lines(constraints: &MealConstraints) -> String {
    let diets = if constraints.diet_tags.is_empty() {
        format!("- Régimes : {NONE_LABEL}")
    } else {
        format!(
            "- Régimes (respecter TOUS simultanément) : {}",
            constraints.diet_tags.join(", ")
        )
    };

    let exclusions = if constraints.excluded_ingredients.is_empty() {
        format!("- EXCLURE ABSOLUMENT : {NONE_LABEL}")
    } else {
        format!(
            "- EXCLURE ABSOLUMENT (aucune liste d'ingrédients ne doit les contenir) : {}",
            constraints.excluded_ingredients.join(", ")
        )
    };

    format!(
        "- Nombre de convives : {size} personnes (ADAPTE LES QUANTITÉS de chaque ingrédient pour {size} personnes)\n{diets}\n{exclusions}",
        size = constraints.household_size
    )
}

/// Builds the meal batch request. An empty distribution is rejected: the
/// caller short-circuits to an empty result instead.
pub fn compile_meal_request(
    distribution: &MealDistribution,
    constraints: &MealConstraints,
    settings: &GenerationSettings,
) -> Result<GenerationRequest, CoreError> {
    let total = distribution.total();
    if total == 0 {
        return Err(CoreError::EmptyDistribution);
    }
    if total > MAX_MEALS_PER_REQUEST {
        return Err(CoreError::Invalid(format!(
            "at most {MAX_MEALS_PER_REQUEST} meals can be requested at once, got {total}"
        )));
    }

    let tiers = MealCategory::ALL
        .iter()
        .map(|category| tier_line(*category, distribution.count_for(*category)))
        .collect::<Vec<_>>()
        .join("\n");

    let prompt = format!(
        "Génère exactement {total} idées de repas pour l'endométriose, ni plus ni moins.\n\
         REPARTITION :\n\
         {tiers}\n\
         \n\
         CONTRAINTES :\n\
         {constraints}\n\
         \n\
         Réponds uniquement avec un tableau JSON de {total} objets.",
        constraints = constraint_lines(constraints),
    );

    Ok(GenerationRequest {
        model: settings.meal_model.clone(),
        system_instruction: Some(NUTRITION_SYSTEM_INSTRUCTION.to_string()),
        prompt,
        response_schema: Some(get_meal_batch_schema()),
    })
}

pub fn compile_replacement_request(
    query: &str,
    category: MealCategory,
    constraints: &MealConstraints,
    settings: &GenerationSettings,
) -> Result<GenerationRequest, CoreError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(CoreError::Invalid("replacement query must not be blank".to_string()));
    }

    let prompt = format!(
        "Trouve ou adapte une recette de \"{query}\" pour qu'elle corresponde à la catégorie \"{}\" (score d'inflammation {}) et respecte les contraintes suivantes :\n{}",
        category.as_str(),
        category.score_band(),
        constraint_lines(constraints),
    );

    Ok(GenerationRequest {
        model: settings.meal_model.clone(),
        system_instruction: Some(NUTRITION_SYSTEM_INSTRUCTION.to_string()),
        prompt,
        response_schema: Some(get_replacement_meal_schema()),
    })
}

pub fn compile_shopping_list_request(
    meals: &[GeneratedMeal],
    settings: &GenerationSettings,
) -> Result<GenerationRequest, CoreError> {
    if meals.is_empty() {
        return Err(CoreError::Invalid("no meals to aggregate".to_string()));
    }

    let meals_json = serde_json::to_string(meals).map_err(|e| {
        tracing::error!("Failed to serialize meals: {}", e);
        CoreError::Invalid(format!("meals are not serializable: {}", e))
    })?;

    let prompt = format!(
        "Regroupe tous les ingrédients de ces repas en une liste de courses cohérente, classée par rayons de supermarché. \
         Combine les quantités si un ingrédient apparaît plusieurs fois et ne répète jamais un ingrédient.\n\
         REPAS : {meals_json}"
    );

    Ok(GenerationRequest {
        model: settings.fast_model.clone(),
        system_instruction: None,
        prompt,
        response_schema: Some(get_shopping_list_schema()),
    })
}

pub fn compile_explanation_request(
    title: &str,
    ingredients: &[String],
    settings: &GenerationSettings,
) -> GenerationRequest {
    let prompt = format!(
        "Explique de manière simple et bienveillante pourquoi la recette \"{title}\" (Ingrédients: {}) est considérée comme anti-inflammatoire ou neutre pour une personne souffrant d'endométriose. Maximum {EXPLANATION_MAX_CHARS} caractères.",
        ingredients.join(", ")
    );

    GenerationRequest {
        model: settings.fast_model.clone(),
        system_instruction: Some(NUTRITION_SYSTEM_INSTRUCTION.to_string()),
        prompt,
        response_schema: None,
    }
}
