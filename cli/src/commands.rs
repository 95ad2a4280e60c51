use anyhow::{Context, bail};
use chrono::{DateTime, Utc};
use endoserenite_core::{
    application::AppState,
    domain::{
        meal_plan::{
            policies::GenerationAccess,
            ports::LLMClient,
            value_objects::{ExplainMealInput, GenerateMealsInput, MealDistribution, ReplaceMealInput},
        },
        profile::{
            entities::ApproxLocation,
            ports::ProfileRepository,
            value_objects::{OnboardingInput, UpdateProfileInput},
        },
    },
};

use crate::{
    args::{Command, GenerateArgs, MealsCommand, OnboardArgs, ProfileCommand, ProfileSetArgs},
    output::{Output, access_message},
};

pub async fn run<P, LLM>(
    state: &mut AppState<P, LLM>,
    command: Command,
    json: bool,
    now: DateTime<Utc>,
) -> Result<(), anyhow::Error>
where
    P: ProfileRepository,
    LLM: LLMClient,
{
    let out = Output::new(json);
    state.boot(now).await.context("failed to load the profile")?;

    match command {
        Command::Onboard(args) => {
            if state.profile().is_some() {
                bail!("a profile already exists, run `endoserenite reset` first");
            }
            let profile = state.onboard(onboarding_input(args), now).await?;
            out.profile(profile)
        }
        Command::Status => {
            let Some(profile) = state.profile() else {
                return out.message(access_message(GenerationAccess::NoProfile));
            };
            out.status(profile, state.generation_access(), state.remaining_trial_days(now))
        }
        Command::Profile { action } => match action {
            ProfileCommand::Show => match state.profile() {
                Some(profile) => out.profile(profile),
                None => out.message(access_message(GenerationAccess::NoProfile)),
            },
            ProfileCommand::Set(args) => {
                ensure_onboarded(state)?;
                let profile = state.edit_profile(update_input(args)).await?;
                out.profile(profile)
            }
        },
        Command::Subscribe => {
            ensure_onboarded(state)?;
            let profile = state.confirm_payment().await?;
            tracing::info!("payment confirmed");
            out.profile(profile)
        }
        Command::Meals { action } => {
            ensure_access(state)?;
            match action {
                MealsCommand::Generate(args) => generate(state, args, out).await,
                MealsCommand::Replace(args) => {
                    let input = ReplaceMealInput {
                        query: args.query,
                        category: args.category.into(),
                        diet_tags: non_empty(args.diets),
                        household_size: args.household,
                    };
                    let meal = state.replace(input, None).await?;
                    out.replacement(meal.as_ref())
                }
                MealsCommand::Explain(args) => {
                    let title = args.title.clone();
                    let text = state
                        .explain(ExplainMealInput {
                            title: args.title,
                            ingredients: args.ingredients,
                        })
                        .await;
                    out.explanation(&title, &text)
                }
            }
        }
        Command::Reset => {
            state.reset().await?;
            out.message("Profil supprimé.")
        }
    }
}

async fn generate<P, LLM>(
    state: &mut AppState<P, LLM>,
    args: GenerateArgs,
    out: Output,
) -> Result<(), anyhow::Error>
where
    P: ProfileRepository,
    LLM: LLMClient,
{
    let input = GenerateMealsInput {
        distribution: MealDistribution::new(args.green, args.orange, args.red),
        diet_tags: non_empty(args.diets),
        household_size: args.household,
    };

    let batch = state.generate(input).await?;

    if !args.shopping_list {
        return out.batch(&batch);
    }

    let list = if batch.accepted.is_empty() {
        Vec::new()
    } else {
        state.shopping_list().await?
    };
    out.meal_plan(&batch, &list)
}

fn ensure_onboarded<P, LLM>(state: &AppState<P, LLM>) -> Result<(), anyhow::Error>
where
    P: ProfileRepository,
    LLM: LLMClient,
{
    if state.needs_onboarding() {
        bail!(access_message(GenerationAccess::NoProfile));
    }
    Ok(())
}

fn ensure_access<P, LLM>(state: &AppState<P, LLM>) -> Result<(), anyhow::Error>
where
    P: ProfileRepository,
    LLM: LLMClient,
{
    match state.generation_access() {
        GenerationAccess::Allowed => Ok(()),
        denied => bail!(access_message(denied)),
    }
}

fn non_empty(labels: Vec<String>) -> Option<Vec<String>> {
    if labels.is_empty() { None } else { Some(labels) }
}

fn onboarding_input(args: OnboardArgs) -> OnboardingInput {
    let location = match (args.city, args.department, args.lat, args.lng) {
        (Some(city), Some(department), Some(lat), Some(lng)) => {
            Some(ApproxLocation::new(lat, lng, city, department))
        }
        _ => None,
    };

    OnboardingInput {
        pseudo: args.pseudo,
        status: args.status.into(),
        diet_tags: non_empty(args.diets),
        location,
    }
}

fn update_input(args: ProfileSetArgs) -> UpdateProfileInput {
    UpdateProfileInput {
        pseudo: args.pseudo,
        avatar_url: args.avatar_url,
        status: args.status.map(Into::into),
        visibility: args.visibility.map(Into::into),
        household_size: args.household,
        household_delta: args.household_delta,
        toggle_diet_tags: args.toggle_diets,
        add_diet_tags: args.add_diets,
        remove_diet_tags: args.remove_diets,
        add_excluded_ingredients: args.exclude,
        remove_excluded_ingredients: args.include,
    }
}
