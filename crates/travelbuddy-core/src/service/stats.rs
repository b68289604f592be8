use std::collections::HashSet;

use serde::Serialize;

use super::TravelBuddy;
use crate::models::TripStatus;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripStatistics {
    pub total_trips: usize,
    /// Starting after now and not marked completed
    pub upcoming_trips: usize,
    /// Stored status `completed`; dates are not consulted
    pub completed_trips: usize,
    pub countries_visited: usize,
    /// Every expense in every budget, whichever trip it belongs to
    pub total_spent: f64,
}

/// Country part of a free-text destination: the second comma-separated
/// token, trimmed. "Rome, Italy" gives "Italy"; "Rome" gives nothing.
///
/// This is a heuristic over free text. "Paris, Texas, USA" yields "Texas".
pub fn country_from_destination(destination: &str) -> Option<&str> {
    destination
        .split(',')
        .nth(1)
        .map(str::trim)
        .filter(|country| !country.is_empty())
}

impl TravelBuddy {
    pub fn get_trip_statistics(&self) -> TripStatistics {
        let trips = self.get_trips();
        let budgets = self.get_budgets();
        let now = self.clock.now();

        let countries: HashSet<&str> = trips
            .iter()
            .filter_map(|t| country_from_destination(&t.destination))
            .collect();

        TripStatistics {
            total_trips: trips.len(),
            upcoming_trips: trips
                .iter()
                .filter(|t| t.starts_after(now) && t.status != TripStatus::Completed)
                .count(),
            completed_trips: trips
                .iter()
                .filter(|t| t.status == TripStatus::Completed)
                .count(),
            countries_visited: countries.len(),
            total_spent: budgets.iter().map(|b| b.expense_total()).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::models::{BudgetDraft, Expense, TripDraft};

    #[test]
    fn test_country_from_destination() {
        assert_eq!(country_from_destination("Rome, Italy"), Some("Italy"));
        assert_eq!(country_from_destination("Kyoto ,  Japan , Asia"), Some("Japan"));
        assert_eq!(country_from_destination("Rome"), None);
        assert_eq!(country_from_destination("Rome, "), None);
    }

    #[test]
    fn test_empty_statistics() {
        let (core, _) = core();
        assert_eq!(core.get_trip_statistics(), TripStatistics::default());
    }

    #[test]
    fn test_statistics() {
        let (core, _) = core();
        core.save_trip(
            TripDraft::new("Rome")
                .destination("Rome, Italy")
                .dates(date(2025, 6, 1), date(2025, 6, 5)),
        );
        core.save_trip(
            TripDraft::new("Milan")
                .destination("Milan, Italy")
                .dates(date(2025, 7, 1), date(2025, 7, 2))
                .status(TripStatus::Completed),
        );
        core.save_trip(TripDraft::new("Somewhere").destination("Tokyo"));
        core.save_trip(
            TripDraft::new("Past")
                .destination("Lima, Peru")
                .dates(date(2024, 1, 1), date(2024, 1, 2)),
        );

        let expense = |id, amount| Expense {
            id,
            description: "x".to_string(),
            amount,
            category: "Unlisted".to_string(),
            date: date(2025, 1, 1),
        };
        core.save_budget(BudgetDraft {
            trip_id: 1,
            categories: None,
            expenses: Some(vec![expense(1, 12.5), expense(2, 7.5)]),
        });
        core.save_budget(BudgetDraft {
            trip_id: 2,
            categories: None,
            expenses: Some(vec![expense(1, 100.0)]),
        });

        let stats = core.get_trip_statistics();
        assert_eq!(stats.total_trips, 4);
        assert_eq!(stats.upcoming_trips, 1);
        assert_eq!(stats.completed_trips, 1);
        assert_eq!(stats.countries_visited, 2);
        assert_eq!(stats.total_spent, 120.0);
    }
}
