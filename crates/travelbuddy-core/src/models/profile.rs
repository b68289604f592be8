use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationError;
use crate::utils::is_valid_email;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Preferences {
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_travel_style")]
    pub travel_style: String,
    #[serde(default)]
    pub activities: Vec<String>,
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_travel_style() -> String {
    "comfort".to_string()
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            language: default_language(),
            travel_style: default_travel_style(),
            activities: vec!["culture".to_string(), "adventure".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct UserProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthdate: Option<String>,
    #[serde(default)]
    pub preferences: Preferences,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub settings: BTreeMap<String, Value>,
    /// Image data URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            name: "John Doe".to_string(),
            email: "john.doe@example.com".to_string(),
            bio: "Passionate traveler exploring the world one city at a time".to_string(),
            phone: None,
            location: None,
            birthdate: None,
            preferences: Preferences::default(),
            settings: BTreeMap::new(),
            avatar: None,
        }
    }
}

impl UserProfile {
    /// "JD" for "John Doe"
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .take(2)
            .flat_map(char::to_uppercase)
            .collect()
    }
}

/// Partial profile update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub birthdate: Option<String>,
    pub preferences: Option<Preferences>,
    pub settings: Option<BTreeMap<String, Value>>,
    pub avatar: Option<String>,
}

impl ProfileUpdate {
    /// Every field of `profile`, so applying it replaces the whole record.
    pub fn from_profile(profile: UserProfile) -> Self {
        Self {
            name: Some(profile.name),
            email: Some(profile.email),
            bio: Some(profile.bio),
            phone: profile.phone,
            location: profile.location,
            birthdate: profile.birthdate,
            preferences: Some(profile.preferences),
            settings: Some(profile.settings),
            avatar: profile.avatar,
        }
    }

    /// The checks the profile form makes: name and email, when given, must
    /// not be blank and the email must look like one.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(ValidationError::MissingField("Name"));
        }
        if let Some(email) = self.email.as_deref().map(str::trim) {
            if email.is_empty() {
                return Err(ValidationError::MissingField("Email"));
            }
            if !is_valid_email(email) {
                return Err(ValidationError::InvalidEmail);
            }
        }
        Ok(())
    }

    pub(crate) fn apply_to(self, profile: &mut UserProfile) {
        if let Some(name) = self.name {
            profile.name = name;
        }
        if let Some(email) = self.email {
            profile.email = email;
        }
        if let Some(bio) = self.bio {
            profile.bio = bio;
        }
        if let Some(phone) = self.phone {
            profile.phone = Some(phone);
        }
        if let Some(location) = self.location {
            profile.location = Some(location);
        }
        if let Some(birthdate) = self.birthdate {
            profile.birthdate = Some(birthdate);
        }
        if let Some(preferences) = self.preferences {
            profile.preferences = preferences;
        }
        if let Some(settings) = self.settings {
            profile.settings = settings;
        }
        if let Some(avatar) = self.avatar {
            profile.avatar = Some(avatar);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub unlocked: bool,
    pub progress: u32,
    pub target: u32,
}

/// The downloadable profile document: every profile field, the current
/// achievements and when it was produced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileExport {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub achievements: Vec<Achievement>,
    pub export_date: DateTime<Utc>,
}

impl Achievement {
    pub fn percent(&self) -> f64 {
        if self.target == 0 {
            return 0.0;
        }
        f64::from(self.progress) * 100.0 / f64::from(self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile() {
        let profile = UserProfile::default();
        assert_eq!(profile.name, "John Doe");
        assert_eq!(profile.preferences.currency, "USD");
        assert_eq!(profile.preferences.activities, vec!["culture", "adventure"]);
        assert_eq!(profile.initials(), "JD");
    }

    #[test]
    fn test_update_is_shallow() {
        let mut profile = UserProfile::default();
        ProfileUpdate {
            bio: Some("Backpacker".to_string()),
            phone: Some("555-0100".to_string()),
            ..ProfileUpdate::default()
        }
        .apply_to(&mut profile);

        assert_eq!(profile.bio, "Backpacker");
        assert_eq!(profile.phone.as_deref(), Some("555-0100"));
        assert_eq!(profile.name, "John Doe");
        assert_eq!(profile.preferences, Preferences::default());
    }

    #[test]
    fn test_parse_stored_profile() {
        let json = r#"{"name": "Ana", "email": "ana@example.com", "bio": "",
            "preferences": {"currency": "EUR", "travelStyle": "budget"},
            "settings": {"notifications": true}}"#;
        let profile: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.preferences.currency, "EUR");
        assert_eq!(profile.preferences.language, "en");
        assert_eq!(profile.preferences.travel_style, "budget");
        assert!(profile.preferences.activities.is_empty());
        assert_eq!(profile.settings["notifications"], Value::Bool(true));
    }

    #[test]
    fn test_update_validation() {
        assert!(ProfileUpdate::default().validate().is_ok());

        let bad_email = ProfileUpdate {
            email: Some("ana@example".to_string()),
            ..ProfileUpdate::default()
        };
        assert_eq!(bad_email.validate(), Err(ValidationError::InvalidEmail));

        let blank_name = ProfileUpdate {
            name: Some("  ".to_string()),
            ..ProfileUpdate::default()
        };
        assert_eq!(blank_name.validate(), Err(ValidationError::MissingField("Name")));

        let good = ProfileUpdate {
            name: Some("Ana".to_string()),
            email: Some(" ana@example.com ".to_string()),
            ..ProfileUpdate::default()
        };
        assert!(good.validate().is_ok());
    }
}
