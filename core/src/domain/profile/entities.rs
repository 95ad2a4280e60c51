use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::domain::common::generate_uuid_v7;

pub const MIN_HOUSEHOLD_SIZE: u32 = 1;
pub const MAX_HOUSEHOLD_SIZE: u32 = 6;

/// The local user record. Field names follow the keys already written to
/// existing installations' stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub pseudo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub status: ProfileStatus,
    #[serde(default)]
    pub diet_tags: Vec<String>,
    #[serde(default)]
    pub excluded_ingredients: Vec<String>,
    #[serde(deserialize_with = "deserialize_household_size")]
    pub household_size: u32,
    pub visibility: Visibility,
    #[serde(rename = "approxLocation")]
    pub approx_location: ApproxLocation,
    #[serde(rename = "subscriptionStatus")]
    pub subscription_status: SubscriptionStatus,
    #[serde(rename = "trialStartDate")]
    pub trial_start_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileStatus {
    Diagnosed,
    Suspicion,
    Supporter,
}

impl ProfileStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ProfileStatus::Diagnosed => "diagnosed",
            ProfileStatus::Suspicion => "suspicion",
            ProfileStatus::Supporter => "supporter",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    City,
    Off,
}

impl Visibility {
    pub fn toggled(self) -> Self {
        match self {
            Visibility::City => Visibility::Off,
            Visibility::Off => Visibility::City,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Trial,
    Active,
    Expired,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &str {
        match self {
            SubscriptionStatus::Trial => "trial",
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Expired => "expired",
        }
    }

    /// trial -> expired happens on the clock, trial/expired -> active on
    /// payment. Nothing leaves active.
    pub fn can_transition_to(self, next: SubscriptionStatus) -> bool {
        matches!(
            (self, next),
            (SubscriptionStatus::Trial, SubscriptionStatus::Expired)
                | (SubscriptionStatus::Trial, SubscriptionStatus::Active)
                | (SubscriptionStatus::Expired, SubscriptionStatus::Active)
        )
    }
}

/// City-level position. Coordinates are rounded to two decimals on
/// construction and never refined afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApproxLocation {
    pub lat: f64,
    pub lng: f64,
    pub city: String,
    pub department: String,
}

impl ApproxLocation {
    pub fn new(lat: f64, lng: f64, city: String, department: String) -> Self {
        Self {
            lat: coarsen(lat),
            lng: coarsen(lng),
            city,
            department,
        }
    }

    pub fn paris() -> Self {
        Self::new(48.8566, 2.3522, "Paris".to_string(), "75".to_string())
    }
}

fn coarsen(coordinate: f64) -> f64 {
    (coordinate * 100.0).round() / 100.0
}

impl UserProfile {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        pseudo: String,
        status: ProfileStatus,
        diet_tags: Vec<String>,
        excluded_ingredients: Vec<String>,
        household_size: u32,
        visibility: Visibility,
        approx_location: ApproxLocation,
        trial_start_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: generate_uuid_v7(),
            pseudo,
            avatar_url: None,
            status,
            diet_tags: normalize_labels(diet_tags),
            excluded_ingredients: normalize_labels(excluded_ingredients),
            household_size: clamp_household_size(household_size),
            visibility,
            approx_location,
            subscription_status: SubscriptionStatus::Trial,
            trial_start_date,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.subscription_status == SubscriptionStatus::Expired
    }
}

pub fn clamp_household_size(size: u32) -> u32 {
    size.clamp(MIN_HOUSEHOLD_SIZE, MAX_HOUSEHOLD_SIZE)
}

/// Stored sizes are clamped on the way in, so an edited or older store
/// cannot carry a household of zero.
fn deserialize_household_size<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    u32::deserialize(deserializer).map(clamp_household_size)
}

/// Trims labels, drops blanks and removes case-insensitive duplicates while
/// keeping the first spelling and the original order.
pub fn normalize_labels<I, S>(labels: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = Vec::<String>::new();
    let mut out = Vec::new();

    for label in labels {
        let trimmed = label.as_ref().trim();
        if trimmed.is_empty() {
            continue;
        }
        let key = trimmed.to_lowercase();
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);
        out.push(trimmed.to_string());
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_is_coarsened() {
        let location = ApproxLocation::new(48.856613, 2.352222, "Paris".into(), "75".into());
        assert_eq!(location.lat, 48.86);
        assert_eq!(location.lng, 2.35);
    }

    #[test]
    fn test_normalize_labels_dedupes_case_insensitively() {
        let labels = normalize_labels(["Sans gluten", "  sans GLUTEN ", "", "Vegan"]);
        assert_eq!(labels, vec!["Sans gluten".to_string(), "Vegan".to_string()]);
    }

    #[test]
    fn test_subscription_transitions() {
        use SubscriptionStatus::*;
        assert!(Trial.can_transition_to(Expired));
        assert!(Trial.can_transition_to(Active));
        assert!(Expired.can_transition_to(Active));
        assert!(!Active.can_transition_to(Expired));
        assert!(!Active.can_transition_to(Trial));
        assert!(!Expired.can_transition_to(Trial));
    }

    #[test]
    fn test_profile_json_uses_stored_field_names() {
        let profile = UserProfile::new(
            "Rose".into(),
            ProfileStatus::Diagnosed,
            vec!["Sans gluten".into()],
            vec![],
            2,
            Visibility::City,
            ApproxLocation::paris(),
            Utc::now(),
        );
        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(value["subscriptionStatus"], "trial");
        assert!(value.get("trialStartDate").is_some());
        assert!(value.get("approxLocation").is_some());
        assert_eq!(value["visibility"], "city");
        assert_eq!(value["household_size"], 2);
    }

    #[test]
    fn test_stored_household_size_is_clamped() {
        let profile = UserProfile::new(
            "Rose".into(),
            ProfileStatus::Diagnosed,
            vec![],
            vec![],
            2,
            Visibility::Off,
            ApproxLocation::paris(),
            Utc::now(),
        );
        let mut value = serde_json::to_value(&profile).unwrap();

        value["household_size"] = 0.into();
        let loaded: UserProfile = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(loaded.household_size, MIN_HOUSEHOLD_SIZE);

        value["household_size"] = 12.into();
        let loaded: UserProfile = serde_json::from_value(value).unwrap();
        assert_eq!(loaded.household_size, MAX_HOUSEHOLD_SIZE);
    }
}
