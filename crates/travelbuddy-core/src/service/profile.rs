use base64::{engine::general_purpose, Engine as _};
use serde_json::Value;
use tracing::{info, warn};

use super::{keys, TravelBuddy};
use crate::error::ValidationError;
use crate::models::{Achievement, ProfileExport, ProfileUpdate, UserProfile};

/// Largest accepted avatar image.
const MAX_AVATAR_BYTES: usize = 5 * 1024 * 1024;

const TRIP_MASTER_TARGET: u32 = 10;
const GLOBE_TROTTER_TARGET: u32 = 5;
const SOCIAL_GROUP_SIZE: u32 = 4;

fn count_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

impl TravelBuddy {
    /// The stored profile, or `None` when it is missing or unreadable.
    pub fn get_user_profile(&self) -> Option<UserProfile> {
        self.store.get_opt(keys::USER_PROFILE)
    }

    /// Merge `update` onto the stored profile (or the defaults) and save it.
    pub fn update_user_profile(&self, update: ProfileUpdate) -> UserProfile {
        let mut profile = self.get_user_profile().unwrap_or_default();
        update.apply_to(&mut profile);
        if !self.store.set(keys::USER_PROFILE, &profile) {
            warn!("Profile update was not saved");
        }
        profile
    }

    /// Validate form input, then merge it like `update_user_profile`.
    pub fn save_user_profile(&self, update: ProfileUpdate) -> Result<UserProfile, ValidationError> {
        update.validate()?;
        Ok(self.update_user_profile(update))
    }

    /// Put the default name, email, bio and preferences back. Settings and
    /// the avatar are kept.
    pub fn reset_user_profile(&self) -> UserProfile {
        let defaults = UserProfile::default();
        self.update_user_profile(ProfileUpdate {
            name: Some(defaults.name),
            email: Some(defaults.email),
            bio: Some(defaults.bio),
            preferences: Some(defaults.preferences),
            ..ProfileUpdate::default()
        })
    }

    pub fn save_setting(&self, name: &str, value: Value) -> UserProfile {
        let mut settings = self
            .get_user_profile()
            .map(|p| p.settings)
            .unwrap_or_default();
        settings.insert(name.to_string(), value);
        self.update_user_profile(ProfileUpdate {
            settings: Some(settings),
            ..ProfileUpdate::default()
        })
    }

    /// Store an uploaded image as the avatar data URL.
    pub fn set_avatar(&self, mime_type: &str, bytes: &[u8]) -> Result<UserProfile, ValidationError> {
        let mime_type = mime_type.trim().to_ascii_lowercase();
        if !mime_type.starts_with("image/") {
            return Err(ValidationError::NotAnImage);
        }
        if bytes.len() > MAX_AVATAR_BYTES {
            return Err(ValidationError::ImageTooLarge);
        }

        let data_url = format!(
            "data:{};base64,{}",
            mime_type,
            general_purpose::STANDARD.encode(bytes)
        );
        Ok(self.update_user_profile(ProfileUpdate {
            avatar: Some(data_url),
            ..ProfileUpdate::default()
        }))
    }

    pub fn achievements(&self) -> Vec<Achievement> {
        let trips = self.get_trips();
        let total = count_u32(trips.len());
        let countries = count_u32(self.get_trip_statistics().countries_visited);
        let social = trips.iter().any(|t| t.travelers >= SOCIAL_GROUP_SIZE);

        vec![
            Achievement {
                id: "first-trip",
                title: "First Adventure",
                description: "Plan your first trip",
                icon: "🎯",
                unlocked: total >= 1,
                progress: total.min(1),
                target: 1,
            },
            Achievement {
                id: "trip-master",
                title: "Trip Master",
                description: "Plan 10 trips",
                icon: "🏆",
                unlocked: total >= TRIP_MASTER_TARGET,
                progress: total.min(TRIP_MASTER_TARGET),
                target: TRIP_MASTER_TARGET,
            },
            Achievement {
                id: "globe-trotter",
                title: "Globe Trotter",
                description: "Visit 5 different countries",
                icon: "🌍",
                unlocked: countries >= GLOBE_TROTTER_TARGET,
                progress: countries.min(GLOBE_TROTTER_TARGET),
                target: GLOBE_TROTTER_TARGET,
            },
            Achievement {
                id: "budget-wise",
                title: "Budget Wise",
                description: "Stay within budget on 3 trips",
                icon: "💰",
                unlocked: false,
                progress: 0,
                target: 3,
            },
            Achievement {
                id: "early-bird",
                title: "Early Bird",
                description: "Plan a trip 6 months in advance",
                icon: "🐦",
                unlocked: false,
                progress: 0,
                target: 1,
            },
            Achievement {
                id: "social-traveler",
                title: "Social Traveler",
                description: "Plan a group trip with 4+ people",
                icon: "👥",
                unlocked: social,
                progress: u32::from(social),
                target: 1,
            },
        ]
    }

    /// The profile with its achievements and an `exportDate`, as pretty JSON.
    pub fn export_profile(&self) -> String {
        let export = ProfileExport {
            profile: self.get_user_profile().unwrap_or_default(),
            achievements: self.achievements(),
            export_date: self.clock.now(),
        };
        serde_json::to_string_pretty(&export).unwrap_or_else(|e| {
            warn!(error = %e, "Failed to export profile");
            "{}".to_string()
        })
    }

    /// Wipe every stored record, then seed first-run defaults again.
    pub fn delete_account(&self) -> bool {
        let cleared = self.store.clear();
        self.initialize_storage();
        info!(cleared, "Account data deleted");
        cleared
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::models::{Preferences, TripDraft};

    #[test]
    fn test_update_merges_onto_stored_profile() {
        let (core, _) = core();
        let updated = core.update_user_profile(ProfileUpdate {
            name: Some("Ana Silva".to_string()),
            location: Some("Lisbon".to_string()),
            ..ProfileUpdate::default()
        });

        assert_eq!(updated.name, "Ana Silva");
        assert_eq!(updated.email, "john.doe@example.com");
        assert_eq!(core.get_user_profile(), Some(updated));
    }

    #[test]
    fn test_reset_keeps_settings() {
        let (core, _) = core();
        core.update_user_profile(ProfileUpdate {
            name: Some("Ana".to_string()),
            preferences: Some(Preferences {
                currency: "EUR".to_string(),
                ..Preferences::default()
            }),
            ..ProfileUpdate::default()
        });
        core.save_setting("notifications", Value::Bool(false));

        let profile = core.reset_user_profile();
        assert_eq!(profile.name, "John Doe");
        assert_eq!(profile.preferences.currency, "USD");
        assert_eq!(profile.settings["notifications"], Value::Bool(false));
    }

    #[test]
    fn test_set_avatar_validation() {
        let (core, _) = core();
        assert_eq!(
            core.set_avatar("text/plain", b"hello"),
            Err(ValidationError::NotAnImage)
        );
        let too_big = vec![0u8; MAX_AVATAR_BYTES + 1];
        assert_eq!(
            core.set_avatar("image/png", &too_big),
            Err(ValidationError::ImageTooLarge)
        );

        let profile = core.set_avatar("image/png", b"png").unwrap();
        assert_eq!(profile.avatar.as_deref(), Some("data:image/png;base64,cG5n"));
    }

    #[test]
    fn test_achievements() {
        let (core, _) = core();
        assert!(core.achievements().iter().all(|a| !a.unlocked));

        for (name, destination) in [
            ("A", "Rome, Italy"),
            ("B", "Tokyo, Japan"),
            ("C", "Lima, Peru"),
            ("D", "Cairo, Egypt"),
            ("E", "Quito, Ecuador"),
        ] {
            core.save_trip(TripDraft::new(name).destination(destination));
        }
        core.save_trip(TripDraft::new("Family").destination("Rome, Italy").travelers(4));

        let achievements = core.achievements();
        let by_id = |id: &str| achievements.iter().find(|a| a.id == id).unwrap();
        assert!(by_id("first-trip").unlocked);
        assert!(!by_id("trip-master").unlocked);
        assert_eq!(by_id("trip-master").progress, 6);
        assert!(by_id("globe-trotter").unlocked);
        assert!(by_id("social-traveler").unlocked);
        assert!(!by_id("budget-wise").unlocked);
        assert_eq!(by_id("trip-master").percent(), 60.0);
    }

    #[test]
    fn test_save_user_profile_checks_email() {
        let (core, _) = core();
        let rejected = core.save_user_profile(ProfileUpdate {
            name: Some("Ana".to_string()),
            email: Some("not-an-email".to_string()),
            ..ProfileUpdate::default()
        });
        assert_eq!(rejected, Err(ValidationError::InvalidEmail));
        assert_eq!(core.get_user_profile(), Some(UserProfile::default()));

        let saved = core
            .save_user_profile(ProfileUpdate {
                email: Some("ana@example.com".to_string()),
                ..ProfileUpdate::default()
            })
            .unwrap();
        assert_eq!(saved.email, "ana@example.com");
    }

    #[test]
    fn test_export_profile() {
        let (core, _) = core();
        core.update_user_profile(ProfileUpdate {
            name: Some("Ana Silva".to_string()),
            ..ProfileUpdate::default()
        });
        core.save_trip(TripDraft::new("Rome Trip").destination("Rome, Italy"));

        let text = core.export_profile();
        assert!(text.contains('\n'));
        let doc: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(doc["name"], "Ana Silva");
        assert_eq!(doc["email"], "john.doe@example.com");
        assert_eq!(doc["preferences"]["currency"], "USD");
        assert_eq!(doc["achievements"].as_array().unwrap().len(), 6);
        assert_eq!(doc["achievements"][0]["id"], "first-trip");
        assert_eq!(doc["achievements"][0]["unlocked"], true);
        assert_eq!(doc["exportDate"], "2025-01-15T12:00:00Z");
    }

    #[test]
    fn test_delete_account() {
        let (core, _) = core();
        core.save_trip(TripDraft::new("Gone"));
        core.toggle_favorite(1);
        core.update_user_profile(ProfileUpdate {
            name: Some("Ana".to_string()),
            ..ProfileUpdate::default()
        });

        assert!(core.delete_account());
        assert!(core.get_trips().is_empty());
        assert!(core.favorites().is_empty());
        assert_eq!(core.get_user_profile(), Some(UserProfile::default()));
    }
}
