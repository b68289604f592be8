//! Bundled catalog data served when the network is unavailable.

use serde_json::{json, Value};
use tracing::warn;

use crate::models::{Activity, Destination};

pub const DESTINATIONS: &str = "destinations";
pub const ACTIVITIES: &str = "activities";

/// Fallback document for `endpoint`; an empty list for unknown endpoints.
pub fn fallback_for(endpoint: &str) -> Value {
    match endpoint {
        DESTINATIONS => json!([
            {
                "id": 1,
                "name": "Paris",
                "country": "France",
                "continent": "Europe",
                "description": "The City of Light, famous for its art, fashion, and cuisine.",
                "image": "https://images.pexels.com/photos/338515/pexels-photo-338515.jpeg?auto=compress&cs=tinysrgb&w=800",
                "rating": 4.8,
                "budget": "Mid-range",
                "types": ["Culture", "City"],
                "attractions": ["Eiffel Tower", "Louvre Museum", "Notre-Dame Cathedral"],
                "bestTime": "April to October",
                "averageCost": 150
            },
            {
                "id": 2,
                "name": "Tokyo",
                "country": "Japan",
                "continent": "Asia",
                "description": "A bustling metropolis blending tradition and modernity.",
                "image": "https://images.pexels.com/photos/248195/pexels-photo-248195.jpeg?auto=compress&cs=tinysrgb&w=800",
                "rating": 4.9,
                "budget": "Mid-range",
                "types": ["Culture", "City", "Food"],
                "attractions": ["Tokyo Tower", "Senso-ji Temple", "Shibuya Crossing"],
                "bestTime": "March to May, September to November",
                "averageCost": 180
            },
            {
                "id": 3,
                "name": "Bali",
                "country": "Indonesia",
                "continent": "Asia",
                "description": "Tropical paradise with stunning beaches and rich culture.",
                "image": "https://images.pexels.com/photos/2474691/pexels-photo-2474691.jpeg?auto=compress&cs=tinysrgb&w=800",
                "rating": 4.7,
                "budget": "Budget",
                "types": ["Beach", "Nature", "Culture"],
                "attractions": ["Tanah Lot Temple", "Ubud Rice Terraces", "Mount Batur"],
                "bestTime": "April to October",
                "averageCost": 80
            }
        ]),
        ACTIVITIES => json!([
            { "id": 1, "name": "City Walking Tour", "type": "Culture", "duration": "3 hours", "cost": 25 },
            { "id": 2, "name": "Museum Visit", "type": "Culture", "duration": "2 hours", "cost": 15 },
            { "id": 3, "name": "Local Food Tour", "type": "Food", "duration": "4 hours", "cost": 60 },
            { "id": 4, "name": "Beach Day", "type": "Beach", "duration": "Full day", "cost": 30 }
        ]),
        _ => Value::Array(Vec::new()),
    }
}

/// Typed view of the fallback for `endpoint`.
pub fn fallback_list<T: serde::de::DeserializeOwned>(endpoint: &str) -> Vec<T> {
    serde_json::from_value(fallback_for(endpoint)).unwrap_or_else(|e| {
        warn!(endpoint, error = %e, "Bundled fallback data does not match its model");
        Vec::new()
    })
}

pub fn destinations() -> Vec<Destination> {
    fallback_list(DESTINATIONS)
}

pub fn activities() -> Vec<Activity> {
    fallback_list(ACTIVITIES)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BudgetTier;

    #[test]
    fn test_destinations_fallback() {
        let destinations = destinations();
        let names: Vec<&str> = destinations.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Paris", "Tokyo", "Bali"]);

        let bali = &destinations[2];
        assert_eq!(bali.budget, BudgetTier::Budget);
        assert_eq!(bali.average_cost, 80.0);
        assert_eq!(bali.best_time, "April to October");
    }

    #[test]
    fn test_activities_fallback() {
        let activities = activities();
        assert_eq!(activities.len(), 4);
        assert_eq!(activities[3].name, "Beach Day");
        assert_eq!(activities[3].duration, "Full day");
    }

    #[test]
    fn test_unknown_endpoint_is_empty() {
        assert_eq!(fallback_for("hotels"), json!([]));
    }
}
