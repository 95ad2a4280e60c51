use std::sync::Mutex;

use crate::domain::{
    common::entities::app_errors::CoreError,
    profile::{entities::UserProfile, ports::ProfileRepository},
};

#[derive(Debug, Default)]
struct Slots {
    onboarding_seen: bool,
    profile: Option<UserProfile>,
}

#[derive(Debug, Default)]
pub struct InMemoryProfileRepository {
    slots: Mutex<Slots>,
}

impl ProfileRepository for InMemoryProfileRepository {
    async fn load(&self) -> Result<Option<UserProfile>, CoreError> {
        Ok(self.slots.lock().unwrap().profile.clone())
    }

    async fn save(&self, profile: UserProfile) -> Result<(), CoreError> {
        self.slots.lock().unwrap().profile = Some(profile);
        Ok(())
    }

    async fn is_onboarding_completed(&self) -> Result<bool, CoreError> {
        Ok(self.slots.lock().unwrap().onboarding_seen)
    }

    async fn mark_onboarding_completed(&self) -> Result<(), CoreError> {
        self.slots.lock().unwrap().onboarding_seen = true;
        Ok(())
    }

    async fn clear(&self) -> Result<(), CoreError> {
        *self.slots.lock().unwrap() = Slots::default();
        Ok(())
    }
}
