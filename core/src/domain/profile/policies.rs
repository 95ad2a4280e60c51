use chrono::{DateTime, Duration, Utc};

use crate::domain::profile::entities::{SubscriptionStatus, UserProfile};

pub const TRIAL_WINDOW_DAYS: i64 = 30;

/// Length of one day in the trial arithmetic. Every elapsed-day computation
/// goes through this constant.
pub const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

pub fn trial_window() -> Duration {
    Duration::seconds(TRIAL_WINDOW_DAYS * SECONDS_PER_DAY)
}

/// Moves a trial profile to `expired` once strictly more than the trial
/// window has elapsed since `trial_start_date`. Any other profile is
/// returned unchanged.
pub fn refresh_subscription_status(profile: &UserProfile, now: DateTime<Utc>) -> UserProfile {
    let mut refreshed = profile.clone();

    if profile.subscription_status == SubscriptionStatus::Trial
        && now - profile.trial_start_date > trial_window()
    {
        refreshed.subscription_status = SubscriptionStatus::Expired;
    }

    refreshed
}

/// Whole days elapsed since the trial started, floored. Negative spans
/// (clock moved backwards) count as zero.
pub fn elapsed_trial_days(profile: &UserProfile, now: DateTime<Utc>) -> i64 {
    let elapsed = (now - profile.trial_start_date).num_seconds().max(0);
    elapsed / SECONDS_PER_DAY
}

pub fn remaining_trial_days(profile: &UserProfile, now: DateTime<Utc>) -> i64 {
    (TRIAL_WINDOW_DAYS - elapsed_trial_days(profile, now)).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::profile::entities::{ApproxLocation, ProfileStatus, Visibility};
    use chrono::TimeZone;

    fn trial_profile(start: DateTime<Utc>) -> UserProfile {
        UserProfile::new(
            "Rose".into(),
            ProfileStatus::Diagnosed,
            vec![],
            vec![],
            1,
            Visibility::City,
            ApproxLocation::paris(),
            start,
        )
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 8, 0, 0).unwrap()
    }

    #[test]
    fn test_day_constant_matches_calendar_day() {
        let a = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap();
        assert_eq!((b - a).num_seconds(), SECONDS_PER_DAY);
        assert_eq!(trial_window(), Duration::days(30));
    }

    #[test]
    fn test_exactly_thirty_days_is_still_trial() {
        let profile = trial_profile(start());
        let now = start() + Duration::days(30);
        let refreshed = refresh_subscription_status(&profile, now);
        assert_eq!(refreshed.subscription_status, SubscriptionStatus::Trial);
    }

    #[test]
    fn test_thirty_days_and_one_second_expires() {
        let profile = trial_profile(start());
        let now = start() + Duration::days(30) + Duration::seconds(1);
        let refreshed = refresh_subscription_status(&profile, now);
        assert_eq!(refreshed.subscription_status, SubscriptionStatus::Expired);
    }

    #[test]
    fn test_refresh_is_idempotent() {
        let profile = trial_profile(start());
        for offset in [Duration::days(3), Duration::days(35)] {
            let now = start() + offset;
            let once = refresh_subscription_status(&profile, now);
            let twice = refresh_subscription_status(&once, now);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_active_and_expired_are_left_alone() {
        let mut profile = trial_profile(start());
        profile.subscription_status = SubscriptionStatus::Active;
        let now = start() + Duration::days(400);
        assert_eq!(refresh_subscription_status(&profile, now), profile);

        profile.subscription_status = SubscriptionStatus::Expired;
        assert_eq!(refresh_subscription_status(&profile, now), profile);
    }

    #[test]
    fn test_remaining_days() {
        let profile = trial_profile(start());
        assert_eq!(remaining_trial_days(&profile, start()), 30);
        assert_eq!(
            remaining_trial_days(&profile, start() + Duration::hours(23)),
            30
        );
        assert_eq!(remaining_trial_days(&profile, start() + Duration::days(1)), 29);
        assert_eq!(remaining_trial_days(&profile, start() + Duration::days(45)), 0);
        assert_eq!(
            remaining_trial_days(&profile, start() - Duration::days(2)),
            30
        );
    }
}
