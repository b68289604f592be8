//! The data access context shared by every front end.
//!
//! `TravelBuddy` owns the persistent store, the catalog fetch cache and the
//! clock. It is built once at startup and passed around by reference.
//! Operations never surface storage or network errors: missing records come
//! back as `None` or empty lists, corrupt data is replaced by defaults, and
//! only user-input problems are reported, as `ValidationError`.

mod budgets;
mod catalog;
mod extras;
mod ids;
mod profile;
mod stats;
mod trips;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::info;

use crate::api::{HttpJsonSource, JsonSource};
use crate::cache::FetchCache;
use crate::clock::{Clock, SystemClock};
use crate::config::{Config, DEFAULT_SUGGESTION_DELAY_MS};
use crate::models::{Budget, Trip, UserProfile};
use crate::storage::{FileStorage, MemoryStorage, PersistentStore, Records};

use ids::IdGenerator;

pub use budgets::BudgetSession;
pub use extras::ContactForm;
pub use stats::{country_from_destination, TripStatistics};
pub use trips::{StatusCounts, TripQuery, TripSort};

/// Storage keys. The names match the browser app's localStorage keys.
pub mod keys {
    pub const TRIPS: &str = "travelbuddy_trips";
    pub const USER_PROFILE: &str = "travelbuddy_user_profile";
    pub const BUDGETS: &str = "travelbuddy_budgets";
    pub const FAVORITES: &str = "favorites";
    pub const HAS_VISITED: &str = "hasVisited";
    pub const CONTACT_SUBMISSIONS: &str = "contact_submissions";
}

pub struct TravelBuddy {
    store: PersistentStore,
    catalog: FetchCache,
    clock: Arc<dyn Clock>,
    ids: IdGenerator,
    suggestion_delay: Duration,
}

impl TravelBuddy {
    pub fn new(store: PersistentStore, source: Arc<dyn JsonSource>) -> Self {
        Self::with_clock(store, source, Arc::new(SystemClock))
    }

    pub fn with_clock(
        store: PersistentStore,
        source: Arc<dyn JsonSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let core = Self {
            store,
            catalog: FetchCache::new(source, Arc::clone(&clock)),
            clock,
            ids: IdGenerator::default(),
            suggestion_delay: Duration::from_millis(DEFAULT_SUGGESTION_DELAY_MS),
        };
        core.initialize_storage();
        core.seed_ids();
        core
    }

    pub fn with_suggestion_delay(mut self, delay: Duration) -> Self {
        self.suggestion_delay = delay;
        self
    }

    /// File-backed store in the configured data directory, catalog over HTTP.
    pub fn open(config: &Config) -> Result<Self> {
        let data_dir = config.data_dir()?;
        let backend = FileStorage::open(&data_dir)
            .with_context(|| format!("Failed to open data directory {}", data_dir.display()))?;
        let source = HttpJsonSource::new(config.catalog_base_url())
            .context("Failed to create catalog client")?;

        info!(data_dir = %data_dir.display(), catalog = config.catalog_base_url(), "Opening TravelBuddy");
        Ok(Self::new(PersistentStore::new(backend), Arc::new(source))
            .with_suggestion_delay(config.suggestion_delay()))
    }

    /// Nothing is written to disk; used by tests and `--ephemeral` runs.
    pub fn in_memory(source: Arc<dyn JsonSource>) -> Self {
        Self::new(PersistentStore::new(MemoryStorage::new()), source)
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.now().date_naive()
    }

    /// First-run defaults: empty trip and budget lists, the default profile.
    fn initialize_storage(&self) {
        if !self.store.contains(keys::TRIPS) {
            self.store.set(keys::TRIPS, &Vec::<Trip>::new());
        }
        if !self.store.contains(keys::USER_PROFILE) {
            self.store.set(keys::USER_PROFILE, &UserProfile::default());
        }
        if !self.store.contains(keys::BUDGETS) {
            self.store.set(keys::BUDGETS, &Vec::<Budget>::new());
        }
    }

    fn seed_ids(&self) {
        let trips: Records<Trip> = self.store.get_records(keys::TRIPS);
        let budgets: Records<Budget> = self.store.get_records(keys::BUDGETS);
        let ids = trips
            .items
            .iter()
            .map(|t| t.id)
            .chain(trips.unreadable_ids())
            .chain(budgets.items.iter().map(|b| b.id))
            .chain(budgets.unreadable_ids());
        for id in ids {
            self.ids.observe(id);
        }
    }

    fn next_id(&self) -> i64 {
        self.ids.next(self.clock.now())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::{NaiveDate, TimeZone, Utc};
    use serde_json::Value;

    use super::TravelBuddy;
    use crate::api::{ApiError, JsonSource};
    use crate::clock::FixedClock;
    use crate::storage::{MemoryStorage, PersistentStore, StorageBackend};

    /// Catalog that is always down.
    pub struct OfflineSource;

    #[async_trait]
    impl JsonSource for OfflineSource {
        async fn fetch(&self, endpoint: &str) -> Result<Value, ApiError> {
            Err(ApiError::NotFound(endpoint.to_string()))
        }
    }

    /// Catalog serving fixed documents.
    pub struct StaticSource(pub Vec<(&'static str, Value)>);

    #[async_trait]
    impl JsonSource for StaticSource {
        async fn fetch(&self, endpoint: &str) -> Result<Value, ApiError> {
            self.0
                .iter()
                .find(|(name, _)| *name == endpoint)
                .map(|(_, value)| value.clone())
                .ok_or_else(|| ApiError::NotFound(endpoint.to_string()))
        }
    }

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Offline core with its clock at 2025-01-15 12:00 UTC.
    pub fn core() -> (TravelBuddy, Arc<FixedClock>) {
        core_with(Arc::new(OfflineSource))
    }

    pub fn core_with(source: Arc<dyn JsonSource>) -> (TravelBuddy, Arc<FixedClock>) {
        open(MemoryStorage::new(), source)
    }

    /// Offline core opened over a store that already holds `entries`.
    pub fn core_over(entries: &[(&str, Value)]) -> (TravelBuddy, Arc<FixedClock>) {
        let backend = MemoryStorage::new();
        for (key, value) in entries {
            backend.set_item(key, &value.to_string()).unwrap();
        }
        open(backend, Arc::new(OfflineSource))
    }

    fn open(backend: MemoryStorage, source: Arc<dyn JsonSource>) -> (TravelBuddy, Arc<FixedClock>) {
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap(),
        ));
        let core = TravelBuddy::with_clock(PersistentStore::new(backend), source, clock.clone());
        (core, clock)
    }
}
