use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::utils::contains_ignore_case;

/// Price band of a destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub enum BudgetTier {
    Budget,
    #[serde(rename = "Mid-range")]
    MidRange,
    Luxury,
}

impl BudgetTier {
    pub fn label(&self) -> &'static str {
        match self {
            BudgetTier::Budget => "Budget",
            BudgetTier::MidRange => "Mid-range",
            BudgetTier::Luxury => "Luxury",
        }
    }
}

impl fmt::Display for BudgetTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for BudgetTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "budget" => Ok(BudgetTier::Budget),
            "mid-range" | "midrange" | "mid" => Ok(BudgetTier::MidRange),
            "luxury" => Ok(BudgetTier::Luxury),
            other => Err(format!("unknown budget tier: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Destination {
    pub id: i64,
    pub name: String,
    pub country: String,
    pub continent: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub rating: f64,
    pub budget: BudgetTier,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub attractions: Vec<String>,
    #[serde(default)]
    pub best_time: String,
    #[serde(default)]
    pub average_cost: f64,
}

impl Destination {
    /// Case-insensitive match of `query` against name, country or description.
    pub fn matches_query(&self, query: &str) -> bool {
        contains_ignore_case(&self.name, query)
            || contains_ignore_case(&self.country, query)
            || contains_ignore_case(&self.description, query)
    }

    pub fn has_type(&self, tag: &str) -> bool {
        self.types.iter().any(|t| t == tag)
    }

    /// "Paris, France"
    pub fn display_name(&self) -> String {
        format!("{}, {}", self.name, self.country)
    }

    pub fn rating_display(&self) -> String {
        format!("{:.1}", self.rating)
    }
}

/// Exact-match filters applied after the text search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DestinationFilters {
    pub continent: Option<String>,
    pub budget: Option<BudgetTier>,
    pub destination_type: Option<String>,
}

impl DestinationFilters {
    pub fn matches(&self, destination: &Destination) -> bool {
        if let Some(ref continent) = self.continent {
            if &destination.continent != continent {
                return false;
            }
        }
        if let Some(budget) = self.budget {
            if destination.budget != budget {
                return false;
            }
        }
        if let Some(ref tag) = self.destination_type {
            if !destination.has_type(tag) {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Activity {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub activity_type: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub cost: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paris() -> Destination {
        Destination {
            id: 1,
            name: "Paris".to_string(),
            country: "France".to_string(),
            continent: "Europe".to_string(),
            description: "The City of Light".to_string(),
            image: String::new(),
            rating: 4.8,
            budget: BudgetTier::MidRange,
            types: vec!["Culture".to_string(), "City".to_string()],
            attractions: vec![],
            best_time: "April to October".to_string(),
            average_cost: 150.0,
        }
    }

    #[test]
    fn test_budget_tier_wire_names() {
        assert_eq!(
            serde_json::to_string(&BudgetTier::MidRange).unwrap(),
            "\"Mid-range\""
        );
        let tier: BudgetTier = serde_json::from_str("\"Luxury\"").unwrap();
        assert_eq!(tier, BudgetTier::Luxury);
    }

    #[test]
    fn test_budget_tier_from_str() {
        assert_eq!("mid-range".parse::<BudgetTier>(), Ok(BudgetTier::MidRange));
        assert_eq!("BUDGET".parse::<BudgetTier>(), Ok(BudgetTier::Budget));
        assert!("cheap".parse::<BudgetTier>().is_err());
    }

    #[test]
    fn test_matches_query_any_field() {
        let dest = paris();
        assert!(dest.matches_query("pari"));
        assert!(dest.matches_query("FRANCE"));
        assert!(dest.matches_query("light"));
        assert!(!dest.matches_query("tokyo"));
    }

    #[test]
    fn test_filters() {
        let dest = paris();
        let mut filters = DestinationFilters::default();
        assert!(filters.matches(&dest));

        filters.continent = Some("Europe".to_string());
        filters.destination_type = Some("City".to_string());
        assert!(filters.matches(&dest));

        filters.budget = Some(BudgetTier::Budget);
        assert!(!filters.matches(&dest));
    }

    #[test]
    fn test_parse_catalog_json() {
        let json = r#"{"id": 2, "name": "Tokyo", "country": "Japan", "continent": "Asia",
            "description": "A bustling metropolis", "image": "x.jpg", "rating": 4.9,
            "budget": "Mid-range", "types": ["Culture", "City", "Food"],
            "attractions": ["Tokyo Tower"], "bestTime": "March to May", "averageCost": 180}"#;
        let dest: Destination = serde_json::from_str(json).unwrap();
        assert_eq!(dest.best_time, "March to May");
        assert_eq!(dest.average_cost, 180.0);
        assert!(dest.has_type("Food"));

        let activity: Activity = serde_json::from_str(
            r#"{"id": 3, "name": "Local Food Tour", "type": "Food", "duration": "4 hours", "cost": 60}"#,
        )
        .unwrap();
        assert_eq!(activity.activity_type, "Food");
    }
}
