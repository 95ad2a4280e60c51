use serde::Serialize;

use endoserenite_core::domain::{
    meal_plan::{
        entities::{GeneratedMeal, MealBatch, MealCategory, RejectionReason, ShoppingListEntry},
        policies::GenerationAccess,
    },
    profile::entities::{SubscriptionStatus, UserProfile, Visibility},
};

/// Writes command results to stdout, as text or as pretty JSON.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    json: bool,
}

impl Output {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce() -> String) -> Result<(), anyhow::Error> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            println!("{}", text());
        }
        Ok(())
    }

    pub fn message(&self, text: &str) -> Result<(), anyhow::Error> {
        self.emit(&serde_json::json!({ "message": text }), || text.to_string())
    }

    pub fn profile(&self, profile: &UserProfile) -> Result<(), anyhow::Error> {
        self.emit(profile, || render_profile(profile))
    }

    pub fn status(
        &self,
        profile: &UserProfile,
        access: GenerationAccess,
        remaining_days: Option<i64>,
    ) -> Result<(), anyhow::Error> {
        let value = serde_json::json!({
            "pseudo": profile.pseudo,
            "subscriptionStatus": profile.subscription_status,
            "remainingTrialDays": remaining_days,
            "generation": access,
        });
        self.emit(&value, || render_status(profile, access, remaining_days))
    }

    pub fn batch(&self, batch: &MealBatch) -> Result<(), anyhow::Error> {
        self.emit(batch, || render_batch(batch))
    }

    /// A batch and its shopping list, as one JSON document in JSON mode.
    pub fn meal_plan(
        &self,
        batch: &MealBatch,
        entries: &[ShoppingListEntry],
    ) -> Result<(), anyhow::Error> {
        self.emit(&meal_plan_json(batch, entries)?, || {
            format!(
                "{}\n\n{}",
                render_batch(batch),
                render_shopping_list(entries)
            )
        })
    }

    pub fn replacement(&self, meal: Option<&GeneratedMeal>) -> Result<(), anyhow::Error> {
        self.emit(&meal, || match meal {
            Some(meal) => render_meal(meal),
            None => "Aucun repas de remplacement trouvé, réessayez.".to_string(),
        })
    }

    pub fn explanation(&self, title: &str, text: &str) -> Result<(), anyhow::Error> {
        let value = serde_json::json!({ "title": title, "explanation": text });
        self.emit(&value, || format!("{}\n{}", title, text))
    }
}

pub fn meal_plan_json(
    batch: &MealBatch,
    entries: &[ShoppingListEntry],
) -> Result<serde_json::Value, serde_json::Error> {
    Ok(serde_json::json!({
        "batch": serde_json::to_value(batch)?,
        "shopping_list": serde_json::to_value(entries)?,
    }))
}

fn category_label(category: MealCategory) -> &'static str {
    match category {
        MealCategory::Green => "VERT",
        MealCategory::Orange => "ORANGE",
        MealCategory::Red => "ROUGE",
    }
}

fn subscription_label(status: SubscriptionStatus) -> &'static str {
    match status {
        SubscriptionStatus::Trial => "essai gratuit",
        SubscriptionStatus::Active => "abonnement actif",
        SubscriptionStatus::Expired => "essai terminé",
    }
}

fn join_or_none(labels: &[String]) -> String {
    if labels.is_empty() {
        "aucun".to_string()
    } else {
        labels.join(", ")
    }
}

pub fn render_profile(profile: &UserProfile) -> String {
    let visibility = match profile.visibility {
        Visibility::City => format!("ville ({})", profile.approx_location.city),
        Visibility::Off => "masquée".to_string(),
    };

    let mut lines = vec![
        format!("Pseudo : {}", profile.pseudo),
        format!("Statut : {}", profile.status.as_str()),
        format!("Régimes : {}", join_or_none(&profile.diet_tags)),
        format!("Exclusions : {}", join_or_none(&profile.excluded_ingredients)),
        format!("Foyer : {} personne(s)", profile.household_size),
        format!("Visibilité : {}", visibility),
        format!("Abonnement : {}", subscription_label(profile.subscription_status)),
    ];
    if let Some(avatar_url) = &profile.avatar_url {
        lines.insert(1, format!("Avatar : {}", avatar_url));
    }

    lines.join("\n")
}

pub fn render_status(
    profile: &UserProfile,
    access: GenerationAccess,
    remaining_days: Option<i64>,
) -> String {
    let mut lines = vec![
        format!("Bonjour {} !", profile.pseudo),
        format!("Abonnement : {}", subscription_label(profile.subscription_status)),
    ];
    if let Some(days) = remaining_days {
        lines.push(format!("Jours d'essai restants : {}", days));
    }
    lines.push(access_message(access).to_string());
    lines.join("\n")
}

pub fn access_message(access: GenerationAccess) -> &'static str {
    match access {
        GenerationAccess::Allowed => "Génération de repas disponible.",
        GenerationAccess::NoProfile => {
            "Aucun profil : lancez `endoserenite onboard` pour commencer."
        }
        GenerationAccess::Expired => {
            "Votre essai est terminé : lancez `endoserenite subscribe` pour continuer."
        }
    }
}

pub fn render_meal(meal: &GeneratedMeal) -> String {
    format!(
        "[{} {:.1}/10] {}\n  {}\n  Ingrédients : {}",
        category_label(meal.category),
        meal.score,
        meal.title,
        meal.description,
        meal.ingredients.join(", ")
    )
}

pub fn render_batch(batch: &MealBatch) -> String {
    if batch.is_empty() {
        return "Impossible de générer des repas pour le moment, réessayez.".to_string();
    }

    let mut blocks: Vec<String> = batch.accepted.iter().map(render_meal).collect();
    for rejected in &batch.rejected {
        let RejectionReason::ExcludedIngredient(ingredient) = &rejected.reason;
        blocks.push(format!(
            "Écarté : {} (contient « {} »)",
            rejected.meal.title, ingredient
        ));
    }

    blocks.join("\n\n")
}

pub fn render_shopping_list(entries: &[ShoppingListEntry]) -> String {
    if entries.is_empty() {
        return "Liste de courses indisponible.".to_string();
    }

    entries
        .iter()
        .map(|entry| {
            let items: Vec<String> = entry.items.iter().map(|i| format!("  - {}", i)).collect();
            format!("{}\n{}", entry.category, items.join("\n"))
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
