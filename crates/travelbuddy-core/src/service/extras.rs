use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{keys, TravelBuddy};
use crate::error::ValidationError;
use crate::models::{IntoId, Suggestions, TripDraft};
use crate::utils::is_valid_email;

/// A message from the about page's contact form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ContactSubmission {
    #[serde(flatten)]
    form: ContactForm,
    timestamp: DateTime<Utc>,
}

impl ContactForm {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("Name"));
        }
        if self.email.trim().is_empty() {
            return Err(ValidationError::MissingField("Email"));
        }
        if !is_valid_email(self.email.trim()) {
            return Err(ValidationError::InvalidEmail);
        }
        if self.message.trim().is_empty() {
            return Err(ValidationError::MissingField("Message"));
        }
        Ok(())
    }
}

impl TravelBuddy {
    /// Favorite destination ids, in the order they were added.
    pub fn favorites(&self) -> Vec<i64> {
        self.store.get(keys::FAVORITES, Vec::new())
    }

    pub fn is_favorite(&self, destination_id: impl IntoId) -> bool {
        destination_id
            .into_id()
            .is_some_and(|id| self.favorites().contains(&id))
    }

    /// Returns whether the destination is a favorite afterwards.
    pub fn toggle_favorite(&self, destination_id: impl IntoId) -> bool {
        let Some(id) = destination_id.into_id() else {
            return false;
        };
        let mut favorites = self.favorites();
        let now_favorite = match favorites.iter().position(|f| *f == id) {
            Some(index) => {
                favorites.remove(index);
                false
            }
            None => {
                favorites.push(id);
                true
            }
        };
        self.store.set(keys::FAVORITES, &favorites);
        debug!(id, now_favorite, "Favorite toggled");
        now_favorite
    }

    /// True the first time it is called against a store, false afterwards.
    pub fn first_visit(&self) -> bool {
        if self.store.contains(keys::HAS_VISITED) {
            return false;
        }
        self.store.set(keys::HAS_VISITED, "true");
        true
    }

    pub fn submit_contact(&self, form: ContactForm) -> Result<(), ValidationError> {
        form.validate()?;

        let mut submissions: Vec<ContactSubmission> =
            self.store.get(keys::CONTACT_SUBMISSIONS, Vec::new());
        submissions.push(ContactSubmission {
            form,
            timestamp: self.clock.now(),
        });
        self.store.set(keys::CONTACT_SUBMISSIONS, &submissions);
        info!(total = submissions.len(), "Contact form submitted");
        Ok(())
    }

    /// Canned activity, restaurant and accommodation ideas, delivered after
    /// a short delay. The trip is not consulted.
    pub async fn get_ai_suggestions(&self, _trip: &TripDraft) -> Suggestions {
        tokio::time::sleep(self.suggestion_delay).await;
        Suggestions::canned()
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::super::test_support::*;
    use super::*;
    use crate::models::Trip;

    #[test]
    fn test_toggle_favorite() {
        let (core, _) = core();
        assert!(core.toggle_favorite(2));
        assert!(core.toggle_favorite("3"));
        assert!(core.is_favorite("2"));
        assert_eq!(core.favorites(), vec![2, 3]);

        assert!(!core.toggle_favorite(2));
        assert!(!core.is_favorite(2));
        assert_eq!(core.favorites(), vec![3]);
        assert!(!core.toggle_favorite("none"));
    }

    #[test]
    fn test_first_visit_only_once() {
        let (core, _) = core();
        assert!(core.first_visit());
        assert!(!core.first_visit());
    }

    #[test]
    fn test_submit_contact() {
        let (core, clock) = core();
        let form = ContactForm {
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            subject: "Hello".to_string(),
            message: "Love the app".to_string(),
        };
        core.submit_contact(form.clone()).unwrap();

        let stored: Vec<ContactSubmission> = core.store.get(keys::CONTACT_SUBMISSIONS, Vec::new());
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].form, form);
        assert_eq!(stored[0].timestamp, crate::clock::Clock::now(clock.as_ref()));

        let bad_email = ContactForm {
            email: "ana@example".to_string(),
            ..form.clone()
        };
        assert_eq!(core.submit_contact(bad_email), Err(ValidationError::InvalidEmail));

        let no_message = ContactForm {
            message: " ".to_string(),
            ..form
        };
        assert_eq!(
            core.submit_contact(no_message),
            Err(ValidationError::MissingField("Message"))
        );
    }

    #[test]
    fn test_contact_submission_wire_format() {
        let submission = ContactSubmission {
            form: ContactForm {
                name: "Ana".to_string(),
                email: "ana@example.com".to_string(),
                subject: String::new(),
                message: "Hi".to_string(),
            },
            timestamp: chrono::TimeZone::with_ymd_and_hms(&Utc, 2025, 1, 1, 0, 0, 0).unwrap(),
        };
        let json = serde_json::to_value(&submission).unwrap();
        assert_eq!(json["name"], "Ana");
        assert_eq!(json["timestamp"], "2025-01-01T00:00:00Z");
    }

    #[tokio::test]
    async fn test_suggestions_after_delay() {
        let (core, _) = core();
        let core = core.with_suggestion_delay(Duration::from_millis(20));
        let started = Instant::now();

        let suggestions = core.get_ai_suggestions(&TripDraft::default()).await;
        assert!(started.elapsed() >= Duration::from_millis(20));
        assert_eq!(suggestions.activities.len(), 4);
        assert_eq!(suggestions.restaurants[2].name, "Fine Dining Restaurant");
        assert_eq!(suggestions.accommodations[1].price, "$$");

        let mut trip: Trip = TripDraft::new("Rome Trip").into_trip(1, chrono::Utc::now());
        trip.add_day();
        assert_eq!(trip.apply_suggestion(&suggestions.activities[0]), Some(1));
    }
}
