use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::domain::{
    common::entities::app_errors::CoreError,
    meal_plan::{ports::LLMClient, value_objects::GenerationSettings},
    profile::ports::ProfileRepository,
};

/// Carries the collaborators every domain service needs. Each domain module
/// implements its service trait on this struct.
#[derive(Clone)]
pub struct Service<P, LLM>
where
    P: ProfileRepository,
    LLM: LLMClient,
{
    pub(crate) profile_repository: P,
    pub(crate) llm_client: LLM,
    pub(crate) settings: GenerationSettings,
    in_flight: Arc<AtomicBool>,
}

impl<P, LLM> Service<P, LLM>
where
    P: ProfileRepository,
    LLM: LLMClient,
{
    pub fn new(profile_repository: P, llm_client: LLM, settings: GenerationSettings) -> Self {
        Self {
            profile_repository,
            llm_client,
            settings,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    pub fn is_generating(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Claims the single generation slot. The slot is released when the
    /// returned guard is dropped.
    pub(crate) fn begin_generation(&self) -> Result<InFlightGuard, CoreError> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| CoreError::GenerationInProgress)?;

        Ok(InFlightGuard {
            flag: Arc::clone(&self.in_flight),
        })
    }
}

pub(crate) struct InFlightGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
