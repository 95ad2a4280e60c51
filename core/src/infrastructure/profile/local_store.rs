use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use tokio::sync::Mutex;

use crate::domain::{
    common::entities::app_errors::CoreError,
    profile::{entities::UserProfile, ports::ProfileRepository},
};

pub const STORE_FILE_NAME: &str = "store.json";
pub const ONBOARDING_SEEN_KEY: &str = "endo_onboarding_seen";
pub const USER_PROFILE_KEY: &str = "endo_user_profile";

type Slots = BTreeMap<String, String>;

/// String key/value store persisted as a single JSON object on disk. The
/// profile is kept as a serialized JSON string under its own key, the
/// onboarding flag as the string `"true"`.
#[derive(Debug)]
pub struct LocalProfileRepository {
    path: PathBuf,
    lock: Mutex<()>,
}

impl LocalProfileRepository {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(STORE_FILE_NAME),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_slots(&self) -> Result<Slots, CoreError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Slots::new()),
            Err(e) => {
                tracing::error!(path = %self.path.display(), "failed to read local store: {}", e);
                return Err(CoreError::StorageError(e.to_string()));
            }
        };

        match serde_json::from_str(&raw) {
            Ok(slots) => Ok(slots),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "local store is unreadable, starting empty: {}", e);
                Ok(Slots::new())
            }
        }
    }

    async fn write_slots(&self, slots: &Slots) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| CoreError::StorageError(e.to_string()))?;
        }

        let raw = serde_json::to_string_pretty(slots)
            .map_err(|e| CoreError::StorageError(e.to_string()))?;

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, raw)
            .await
            .map_err(|e| CoreError::StorageError(e.to_string()))?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(|e| {
            tracing::error!(path = %self.path.display(), "failed to persist local store: {}", e);
            CoreError::StorageError(e.to_string())
        })
    }

    async fn update<F>(&self, edit: F) -> Result<(), CoreError>
    where
        F: FnOnce(&mut Slots),
    {
        let _guard = self.lock.lock().await;
        let mut slots = self.read_slots().await?;
        edit(&mut slots);
        self.write_slots(&slots).await
    }
}

impl ProfileRepository for LocalProfileRepository {
    async fn load(&self) -> Result<Option<UserProfile>, CoreError> {
        let _guard = self.lock.lock().await;
        let slots = self.read_slots().await?;

        let Some(raw) = slots.get(USER_PROFILE_KEY) else {
            return Ok(None);
        };

        match serde_json::from_str(raw) {
            Ok(profile) => Ok(Some(profile)),
            Err(e) => {
                tracing::warn!("stored profile is unreadable, ignoring it: {}", e);
                Ok(None)
            }
        }
    }

    async fn save(&self, profile: UserProfile) -> Result<(), CoreError> {
        let raw = serde_json::to_string(&profile)
            .map_err(|e| CoreError::StorageError(e.to_string()))?;
        self.update(|slots| {
            slots.insert(USER_PROFILE_KEY.to_string(), raw);
        })
        .await
    }

    async fn is_onboarding_completed(&self) -> Result<bool, CoreError> {
        let _guard = self.lock.lock().await;
        let slots = self.read_slots().await?;
        Ok(slots.get(ONBOARDING_SEEN_KEY).is_some_and(|v| v == "true"))
    }

    async fn mark_onboarding_completed(&self) -> Result<(), CoreError> {
        self.update(|slots| {
            slots.insert(ONBOARDING_SEEN_KEY.to_string(), "true".to_string());
        })
        .await
    }

    async fn clear(&self) -> Result<(), CoreError> {
        self.update(|slots| {
            slots.remove(ONBOARDING_SEEN_KEY);
            slots.remove(USER_PROFILE_KEY);
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::profile::entities::{
        ApproxLocation, ProfileStatus, SubscriptionStatus, Visibility,
    };
    use chrono::{TimeZone, Utc};

    fn profile() -> UserProfile {
        UserProfile::new(
            "Lina".into(),
            ProfileStatus::Diagnosed,
            vec!["Sans gluten".into()],
            vec!["Arachide".into()],
            2,
            Visibility::City,
            ApproxLocation::paris(),
            Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let repo = LocalProfileRepository::new(dir.path());

        assert_eq!(repo.load().await.unwrap(), None);
        assert!(!repo.is_onboarding_completed().await.unwrap());
    }

    #[tokio::test]
    async fn test_profile_survives_new_instance() {
        let dir = tempfile::tempdir().unwrap();
        let repo = LocalProfileRepository::new(dir.path());
        let profile = profile();
        repo.save(profile.clone()).await.unwrap();
        repo.mark_onboarding_completed().await.unwrap();

        let reopened = LocalProfileRepository::new(dir.path());
        assert_eq!(reopened.load().await.unwrap(), Some(profile));
        assert!(reopened.is_onboarding_completed().await.unwrap());
    }

    #[tokio::test]
    async fn test_profile_is_stored_as_json_string() {
        let dir = tempfile::tempdir().unwrap();
        let repo = LocalProfileRepository::new(dir.path());
        repo.save(profile()).await.unwrap();

        let raw = std::fs::read_to_string(repo.path()).unwrap();
        let slots: Slots = serde_json::from_str(&raw).unwrap();
        let stored: serde_json::Value =
            serde_json::from_str(slots.get(USER_PROFILE_KEY).unwrap()).unwrap();

        assert_eq!(stored["pseudo"], "Lina");
        assert_eq!(stored["subscriptionStatus"], "trial");
        assert!(stored.get("trialStartDate").is_some());
    }

    #[tokio::test]
    async fn test_corrupt_profile_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let repo = LocalProfileRepository::new(dir.path());
        let mut slots = Slots::new();
        slots.insert(USER_PROFILE_KEY.into(), "{not json".into());
        slots.insert(ONBOARDING_SEEN_KEY.into(), "true".into());
        std::fs::write(repo.path(), serde_json::to_string(&slots).unwrap()).unwrap();

        assert_eq!(repo.load().await.unwrap(), None);
        assert!(repo.is_onboarding_completed().await.unwrap());
    }

    #[tokio::test]
    async fn test_corrupt_store_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let repo = LocalProfileRepository::new(dir.path());
        std::fs::write(repo.path(), "garbage").unwrap();

        assert_eq!(repo.load().await.unwrap(), None);
        let profile = profile();
        repo.save(profile.clone()).await.unwrap();
        assert_eq!(repo.load().await.unwrap(), Some(profile));
    }

    #[tokio::test]
    async fn test_zero_household_in_store_loads_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let repo = LocalProfileRepository::new(dir.path());
        let mut stored = profile();
        stored.household_size = 0;
        repo.save(stored).await.unwrap();

        let loaded = repo.load().await.unwrap().unwrap();
        assert_eq!(loaded.household_size, 1);
    }

    #[tokio::test]
    async fn test_clear_removes_both_slots() {
        let dir = tempfile::tempdir().unwrap();
        let repo = LocalProfileRepository::new(dir.path());
        let mut expired = profile();
        expired.subscription_status = SubscriptionStatus::Expired;
        repo.save(expired).await.unwrap();
        repo.mark_onboarding_completed().await.unwrap();

        repo.clear().await.unwrap();

        assert_eq!(repo.load().await.unwrap(), None);
        assert!(!repo.is_onboarding_completed().await.unwrap());
    }

    #[tokio::test]
    async fn test_creates_missing_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let repo = LocalProfileRepository::new(dir.path().join("nested").join("endo"));
        repo.mark_onboarding_completed().await.unwrap();
        assert!(repo.path().exists());
    }
}
