use crate::{
    domain::{
        common::{EndoConfig, services::Service},
        meal_plan::value_objects::GenerationSettings,
    },
    infrastructure::{llm::GeminiLLMClient, profile::LocalProfileRepository},
};

pub mod state;

pub use state::AppState;

pub type EndoService = Service<LocalProfileRepository, GeminiLLMClient>;

pub async fn create_service(config: EndoConfig) -> Result<EndoService, anyhow::Error> {
    tokio::fs::create_dir_all(&config.storage.data_dir)
        .await
        .map_err(|e| {
            anyhow::anyhow!(
                "cannot create data directory {}: {}",
                config.storage.data_dir.display(),
                e
            )
        })?;

    if config.llm.gemini_api_key.is_empty() {
        tracing::warn!("GEMINI_API_KEY is not set, meal generation will return empty results");
    }

    let profile_repository = LocalProfileRepository::new(&config.storage.data_dir);
    let llm_client = GeminiLLMClient::new(config.llm.gemini_api_key.clone());
    let settings = GenerationSettings::from(&config.llm);

    tracing::debug!(
        store = %profile_repository.path().display(),
        meal_model = %settings.meal_model,
        fast_model = %settings.fast_model,
        "service created"
    );

    Ok(Service::new(profile_repository, llm_client, settings))
}
