use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt, Shared};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::api::JsonSource;
use crate::clock::Clock;

use super::fallback;

#[derive(Debug, Clone)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T, cached_at: DateTime<Utc>) -> Self {
        Self { data, cached_at }
    }

    pub fn age_minutes(&self, now: DateTime<Utc>) -> i64 {
        (now - self.cached_at).num_minutes()
    }

    pub fn age_display(&self, now: DateTime<Utc>) -> String {
        let minutes = self.age_minutes(now);
        if minutes < 1 {
            // Also covers clock skew
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            let hours = minutes / 60;
            if minutes % 60 >= 30 {
                format!("{}h ago", hours + 1)
            } else {
                format!("{}h ago", hours)
            }
        } else {
            let days = minutes / 1440;
            if (minutes % 1440) / 60 >= 12 {
                format!("{}d ago", days + 1)
            } else {
                format!("{}d ago", days)
            }
        }
    }
}

/// Errors are stringified so the shared output stays `Clone`.
type InFlight = Shared<BoxFuture<'static, Result<Value, String>>>;

/// Endpoint-keyed document cache over a `JsonSource`.
///
/// Lock order is `pending` then `entries` whenever both are held.
pub struct FetchCache {
    source: Arc<dyn JsonSource>,
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<String, CachedData<Value>>>,
    pending: Mutex<HashMap<String, InFlight>>,
}

impl FetchCache {
    pub fn new(source: Arc<dyn JsonSource>, clock: Arc<dyn Clock>) -> Self {
        Self {
            source,
            clock,
            entries: Mutex::new(HashMap::new()),
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Cached document for `endpoint`, fetching it on first use.
    ///
    /// Never fails: on any fetch error the bundled fallback is returned and
    /// nothing is cached.
    pub async fn fetch_json(&self, endpoint: &str) -> Value {
        if let Some(hit) = self.entries.lock().await.get(endpoint) {
            debug!(endpoint, "Catalog cache hit");
            return hit.data.clone();
        }

        let fetch = {
            let mut pending = self.pending.lock().await;
            // Another caller may have finished between the two locks.
            if let Some(hit) = self.entries.lock().await.get(endpoint) {
                return hit.data.clone();
            }
            match pending.get(endpoint) {
                Some(in_flight) => {
                    debug!(endpoint, "Joining in-flight catalog fetch");
                    in_flight.clone()
                }
                None => {
                    let source = Arc::clone(&self.source);
                    let owned = endpoint.to_string();
                    let in_flight = async move { source.fetch(&owned).await.map_err(|e| e.to_string()) }
                        .boxed()
                        .shared();
                    pending.insert(endpoint.to_string(), in_flight.clone());
                    in_flight
                }
            }
        };

        let result = fetch.clone().await;

        if let Ok(ref value) = result {
            let now = self.clock.now();
            self.entries
                .lock()
                .await
                .entry(endpoint.to_string())
                .or_insert_with(|| CachedData::new(value.clone(), now));
        }

        {
            let mut pending = self.pending.lock().await;
            if pending
                .get(endpoint)
                .is_some_and(|in_flight| in_flight.ptr_eq(&fetch))
            {
                pending.remove(endpoint);
            }
        }

        match result {
            Ok(value) => value,
            Err(e) => {
                warn!(endpoint, error = %e, "Catalog fetch failed, serving fallback data");
                fallback::fallback_for(endpoint)
            }
        }
    }

    /// `fetch_json` parsed as a list of `T`.
    ///
    /// A document that does not match the model is evicted and the typed
    /// fallback is returned.
    pub async fn fetch_list<T: DeserializeOwned>(&self, endpoint: &str) -> Vec<T> {
        let value = self.fetch_json(endpoint).await;
        match serde_json::from_value(value) {
            Ok(items) => items,
            Err(e) => {
                warn!(endpoint, error = %e, "Catalog document has unexpected shape, serving fallback data");
                self.evict(endpoint).await;
                fallback::fallback_list(endpoint)
            }
        }
    }

    /// Drop the cached document so the next call refetches. Returns whether
    /// anything was cached.
    pub async fn evict(&self, endpoint: &str) -> bool {
        self.entries.lock().await.remove(endpoint).is_some()
    }

    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }

    pub async fn is_cached(&self, endpoint: &str) -> bool {
        self.entries.lock().await.contains_key(endpoint)
    }

    /// "just now", "5m ago", ... for a cached endpoint.
    pub async fn age_display(&self, endpoint: &str) -> Option<String> {
        let now = self.clock.now();
        self.entries
            .lock()
            .await
            .get(endpoint)
            .map(|entry| entry.age_display(now))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;
    use crate::api::ApiError;
    use crate::clock::FixedClock;
    use crate::models::Destination;

    struct CountingSource {
        calls: AtomicUsize,
        response: Option<Value>,
        delay: Duration,
    }

    impl CountingSource {
        fn ok(response: Value) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                response: Some(response),
                delay: Duration::from_millis(20),
            }
        }

        fn failing() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                response: None,
                delay: Duration::ZERO,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl JsonSource for CountingSource {
        async fn fetch(&self, endpoint: &str) -> Result<Value, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.response
                .clone()
                .ok_or_else(|| ApiError::NotFound(endpoint.to_string()))
        }
    }

    fn clock() -> Arc<FixedClock> {
        Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()))
    }

    #[tokio::test]
    async fn test_second_fetch_is_served_from_cache() {
        let source = Arc::new(CountingSource::ok(json!([{"id": 1}])));
        let cache = FetchCache::new(source.clone(), clock());

        assert_eq!(cache.fetch_json("activities").await, json!([{"id": 1}]));
        assert_eq!(cache.fetch_json("activities").await, json!([{"id": 1}]));
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_fetches_share_one_request() {
        let source = Arc::new(CountingSource::ok(json!(["shared"])));
        let cache = FetchCache::new(source.clone(), clock());

        let (a, b, c) = tokio::join!(
            cache.fetch_json("destinations"),
            cache.fetch_json("destinations"),
            cache.fetch_json("destinations"),
        );

        assert_eq!(source.calls(), 1);
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert!(cache.pending.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_failure_serves_fallback_and_is_not_cached() {
        let source = Arc::new(CountingSource::failing());
        let cache = FetchCache::new(source.clone(), clock());

        let destinations: Vec<Destination> = cache.fetch_list("destinations").await;
        let names: Vec<&str> = destinations.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Paris", "Tokyo", "Bali"]);

        assert_eq!(cache.fetch_json("hotels").await, json!([]));
        assert!(!cache.is_cached("destinations").await);

        cache.fetch_json("destinations").await;
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test]
    async fn test_malformed_document_is_evicted() {
        let source = Arc::new(CountingSource::ok(json!({"unexpected": true})));
        let cache = FetchCache::new(source.clone(), clock());

        let destinations: Vec<Destination> = cache.fetch_list("destinations").await;
        assert_eq!(destinations.len(), 3);
        assert!(!cache.is_cached("destinations").await);
    }

    #[tokio::test]
    async fn test_evict_forces_refetch() {
        let source = Arc::new(CountingSource::ok(json!([])));
        let clock = clock();
        let cache = FetchCache::new(source.clone(), clock.clone());

        cache.fetch_json("destinations").await;
        clock.advance(chrono::Duration::minutes(90));
        assert_eq!(cache.age_display("destinations").await.as_deref(), Some("2h ago"));

        assert!(cache.evict("destinations").await);
        assert!(!cache.evict("destinations").await);
        cache.fetch_json("destinations").await;
        assert_eq!(source.calls(), 2);
    }

    #[test]
    fn test_age_display() {
        let cached_at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let entry = CachedData::new((), cached_at);
        let at = |minutes| cached_at + chrono::Duration::minutes(minutes);

        assert_eq!(entry.age_display(at(-5)), "just now");
        assert_eq!(entry.age_display(at(0)), "just now");
        assert_eq!(entry.age_display(at(5)), "5m ago");
        assert_eq!(entry.age_display(at(85)), "1h ago");
        assert_eq!(entry.age_display(at(36 * 60)), "2d ago");
    }
}
