use tracing::debug;

use super::TravelBuddy;
use crate::cache::fallback::{ACTIVITIES, DESTINATIONS};
use crate::models::{Activity, Destination, DestinationFilters, IntoId};

impl TravelBuddy {
    pub async fn get_destinations(&self) -> Vec<Destination> {
        self.catalog.fetch_list(DESTINATIONS).await
    }

    pub async fn get_destination(&self, id: impl IntoId) -> Option<Destination> {
        let id = id.into_id()?;
        self.get_destinations()
            .await
            .into_iter()
            .find(|d| d.id == id)
    }

    /// Text match on name, country or description, then the exact filters.
    /// A blank query matches everything.
    pub async fn search_destinations(
        &self,
        query: &str,
        filters: &DestinationFilters,
    ) -> Vec<Destination> {
        let query = query.trim();
        let results: Vec<Destination> = self
            .get_destinations()
            .await
            .into_iter()
            .filter(|d| query.is_empty() || d.matches_query(query))
            .filter(|d| filters.matches(d))
            .collect();
        debug!(query, results = results.len(), "Destination search");
        results
    }

    pub async fn get_activities(&self) -> Vec<Activity> {
        self.catalog.fetch_list(ACTIVITIES).await
    }

    pub async fn get_activities_by_type(&self, activity_type: &str) -> Vec<Activity> {
        self.get_activities()
            .await
            .into_iter()
            .filter(|a| a.activity_type == activity_type)
            .collect()
    }

    /// Forget the cached destinations so the next read refetches them.
    pub async fn refresh_destinations(&self) -> bool {
        self.catalog.evict(DESTINATIONS).await
    }

    /// "5m ago" for the cached destinations, `None` when nothing is cached.
    pub async fn destinations_age(&self) -> Option<String> {
        self.catalog.age_display(DESTINATIONS).await
    }
}
