use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct SuggestedActivity {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub activity_type: String,
    pub time: String,
}

/// A restaurant or an accommodation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Venue {
    pub name: String,
    #[serde(rename = "type")]
    pub venue_type: String,
    pub rating: f64,
    pub price: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Suggestions {
    pub activities: Vec<SuggestedActivity>,
    pub restaurants: Vec<Venue>,
    pub accommodations: Vec<Venue>,
}

fn activity(name: &str, description: &str, activity_type: &str, time: &str) -> SuggestedActivity {
    SuggestedActivity {
        name: name.to_string(),
        description: description.to_string(),
        activity_type: activity_type.to_string(),
        time: time.to_string(),
    }
}

fn venue(name: &str, venue_type: &str, rating: f64, price: &str) -> Venue {
    Venue {
        name: name.to_string(),
        venue_type: venue_type.to_string(),
        rating,
        price: price.to_string(),
    }
}

impl Suggestions {
    /// The canned suggestion set handed out for every trip.
    pub fn canned() -> Self {
        Self {
            activities: vec![
                activity(
                    "Morning City Walk",
                    "Start your day exploring the historic downtown area",
                    "Culture",
                    "09:00",
                ),
                activity(
                    "Local Market Visit",
                    "Experience local culture at the main marketplace",
                    "Culture",
                    "11:00",
                ),
                activity(
                    "Traditional Lunch",
                    "Try authentic local cuisine at a recommended restaurant",
                    "Food",
                    "13:00",
                ),
                activity(
                    "Museum Tour",
                    "Visit the most popular museum in the area",
                    "Culture",
                    "15:00",
                ),
            ],
            restaurants: vec![
                venue("Local Bistro", "Traditional", 4.5, "$$"),
                venue("Street Food Market", "Casual", 4.3, "$"),
                venue("Fine Dining Restaurant", "Upscale", 4.8, "$$$"),
            ],
            accommodations: vec![
                venue("Downtown Hotel", "Hotel", 4.4, "$$$"),
                venue("Cozy B&B", "Bed & Breakfast", 4.6, "$$"),
                venue("Modern Hostel", "Hostel", 4.2, "$"),
            ],
        }
    }
}
