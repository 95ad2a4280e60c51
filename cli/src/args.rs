use std::path::PathBuf;
use std::time::Duration;

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use endoserenite_core::domain::{
    common::{EndoConfig, LLMConfig, StorageConfig},
    meal_plan::entities::MealCategory,
    profile::entities::{ProfileStatus, Visibility},
};

#[derive(Debug, Clone, Parser)]
#[command(
    name = "endoserenite",
    version,
    about = "Anti-inflammatory meal planning for people living with endometriosis"
)]
pub struct Args {
    #[command(flatten)]
    pub llm: LLMArgs,

    #[command(flatten)]
    pub storage: StorageArgs,

    #[command(flatten)]
    pub log: LogArgs,

    /// Print results as JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, ClapArgs)]
pub struct LLMArgs {
    #[arg(long, env = "GEMINI_API_KEY", default_value = "", hide_env_values = true)]
    pub gemini_api_key: String,

    #[arg(long, env = "GEMINI_MEAL_MODEL", default_value = "gemini-3-pro-preview")]
    pub meal_model: String,

    #[arg(long, env = "GEMINI_FAST_MODEL", default_value = "gemini-3-flash-preview")]
    pub fast_model: String,

    /// Seconds to wait for the generator before giving up
    #[arg(long, env = "ENDO_LLM_TIMEOUT_SECS", default_value_t = 20)]
    pub llm_timeout_secs: u64,
}

#[derive(Debug, Clone, ClapArgs)]
pub struct StorageArgs {
    /// Directory holding the local profile store
    #[arg(long, env = "ENDO_DATA_DIR")]
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, ClapArgs)]
pub struct LogArgs {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[arg(long, env = "RUST_LOG", default_value = "warn", global = true)]
    pub log_filter: String,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Create the profile and start the 30-day trial
    Onboard(OnboardArgs),

    /// Greeting, subscription state and trial days left
    Status,

    /// Show or edit the profile
    Profile {
        #[command(subcommand)]
        action: ProfileCommand,
    },

    /// Confirm payment and activate the subscription
    Subscribe,

    /// Meal generation
    Meals {
        #[command(subcommand)]
        action: MealsCommand,
    },

    /// Forget the profile and the onboarding flag
    Reset,
}

#[derive(Debug, Clone, ClapArgs)]
pub struct OnboardArgs {
    #[arg(long)]
    pub pseudo: Option<String>,

    #[arg(long, value_enum, default_value_t = StatusArg::Diagnosed)]
    pub status: StatusArg,

    /// Diet label, repeatable. Defaults to "Sans gluten"
    #[arg(long = "diet")]
    pub diets: Vec<String>,

    #[arg(long, requires_all = ["department", "lat", "lng"])]
    pub city: Option<String>,

    #[arg(long)]
    pub department: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    pub lat: Option<f64>,

    #[arg(long, allow_hyphen_values = true)]
    pub lng: Option<f64>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum ProfileCommand {
    Show,
    Set(ProfileSetArgs),
}

#[derive(Debug, Clone, ClapArgs)]
pub struct ProfileSetArgs {
    #[arg(long)]
    pub pseudo: Option<String>,

    /// Avatar URL, an empty value removes it
    #[arg(long)]
    pub avatar_url: Option<String>,

    #[arg(long, value_enum)]
    pub status: Option<StatusArg>,

    #[arg(long, value_enum)]
    pub visibility: Option<VisibilityArg>,

    /// Household size, clamped to 1..=6
    #[arg(long, conflicts_with = "household_delta")]
    pub household: Option<u32>,

    /// Relative household change, e.g. +1 or -1
    #[arg(long, allow_hyphen_values = true)]
    pub household_delta: Option<i32>,

    #[arg(long = "toggle-diet")]
    pub toggle_diets: Vec<String>,

    #[arg(long = "add-diet")]
    pub add_diets: Vec<String>,

    #[arg(long = "remove-diet")]
    pub remove_diets: Vec<String>,

    /// Ingredient to exclude, repeatable
    #[arg(long = "exclude")]
    pub exclude: Vec<String>,

    /// Ingredient to stop excluding, repeatable
    #[arg(long = "include")]
    pub include: Vec<String>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum MealsCommand {
    Generate(GenerateArgs),
    Replace(ReplaceArgs),
    Explain(ExplainArgs),
}

#[derive(Debug, Clone, ClapArgs)]
pub struct GenerateArgs {
    #[arg(long, default_value_t = 3)]
    pub green: u32,

    #[arg(long, default_value_t = 2)]
    pub orange: u32,

    #[arg(long, default_value_t = 1)]
    pub red: u32,

    /// Diet labels for this generation only, replacing the profile's
    #[arg(long = "diet")]
    pub diets: Vec<String>,

    /// Household size for this generation only
    #[arg(long)]
    pub household: Option<u32>,

    /// Also build the shopping list for the accepted meals
    #[arg(long)]
    pub shopping_list: bool,
}

#[derive(Debug, Clone, ClapArgs)]
pub struct ReplaceArgs {
    /// What the replacement should look like, e.g. "poisson"
    #[arg(long)]
    pub query: String,

    #[arg(long, value_enum)]
    pub category: CategoryArg,

    #[arg(long = "diet")]
    pub diets: Vec<String>,

    #[arg(long)]
    pub household: Option<u32>,
}

#[derive(Debug, Clone, ClapArgs)]
pub struct ExplainArgs {
    #[arg(long)]
    pub title: String,

    /// Ingredient, repeatable
    #[arg(long = "ingredient")]
    pub ingredients: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    Diagnosed,
    Suspicion,
    Supporter,
}

impl From<StatusArg> for ProfileStatus {
    fn from(value: StatusArg) -> Self {
        match value {
            StatusArg::Diagnosed => ProfileStatus::Diagnosed,
            StatusArg::Suspicion => ProfileStatus::Suspicion,
            StatusArg::Supporter => ProfileStatus::Supporter,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum VisibilityArg {
    City,
    Off,
}

impl From<VisibilityArg> for Visibility {
    fn from(value: VisibilityArg) -> Self {
        match value {
            VisibilityArg::City => Visibility::City,
            VisibilityArg::Off => Visibility::Off,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CategoryArg {
    Green,
    Orange,
    Red,
}

impl From<CategoryArg> for MealCategory {
    fn from(value: CategoryArg) -> Self {
        match value {
            CategoryArg::Green => MealCategory::Green,
            CategoryArg::Orange => MealCategory::Orange,
            CategoryArg::Red => MealCategory::Red,
        }
    }
}

pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("endoserenite")
}

impl From<Args> for EndoConfig {
    fn from(args: Args) -> Self {
        Self {
            llm: LLMConfig {
                gemini_api_key: args.llm.gemini_api_key,
                meal_model: args.llm.meal_model,
                fast_model: args.llm.fast_model,
                request_timeout: Duration::from_secs(args.llm.llm_timeout_secs),
            },
            storage: StorageConfig {
                data_dir: args.storage.data_dir.unwrap_or_else(default_data_dir),
            },
        }
    }
}
