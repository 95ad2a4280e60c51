use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use crate::domain::{
    common::entities::app_errors::CoreError,
    meal_plan::{ports::LLMClient, value_objects::GenerationRequest},
};

/// Replays canned responses in order and records every request it receives.
#[derive(Debug, Default)]
pub struct ScriptedLLMClient {
    responses: Mutex<VecDeque<Result<String, CoreError>>>,
    requests: Mutex<Vec<GenerationRequest>>,
    delay: Option<Duration>,
}

impl ScriptedLLMClient {
    pub fn with_responses(responses: Vec<Result<String, CoreError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            ..Default::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl LLMClient for ScriptedLLMClient {
    async fn generate(&self, request: GenerationRequest) -> Result<String, CoreError> {
        self.requests.lock().unwrap().push(request);
        let next = self.responses.lock().unwrap().pop_front();

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        next.unwrap_or_else(|| Err(CoreError::ExternalServiceError("no scripted response".into())))
    }
}
