use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::{keys, TravelBuddy};
use crate::error::ValidationError;
use crate::models::{DerivedStatus, IntoId, Trip, TripDraft, TripStatus};
use crate::storage::Records;
use crate::utils::contains_ignore_case;

/// Dashboard sort orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TripSort {
    /// Insertion order
    #[default]
    None,
    DateDesc,
    DateAsc,
    NameAsc,
    NameDesc,
}

impl TripSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripSort::None => "none",
            TripSort::DateDesc => "date-desc",
            TripSort::DateAsc => "date-asc",
            TripSort::NameAsc => "name-asc",
            TripSort::NameDesc => "name-desc",
        }
    }

    fn compare(&self, a: &Trip, b: &Trip) -> Ordering {
        match self {
            TripSort::None => Ordering::Equal,
            TripSort::DateDesc => b.sort_timestamp().cmp(&a.sort_timestamp()),
            TripSort::DateAsc => a.sort_timestamp().cmp(&b.sort_timestamp()),
            TripSort::NameAsc => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            TripSort::NameDesc => b.name.to_lowercase().cmp(&a.name.to_lowercase()),
        }
    }
}

impl fmt::Display for TripSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for TripSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "none" => Ok(TripSort::None),
            "date-desc" => Ok(TripSort::DateDesc),
            "date-asc" => Ok(TripSort::DateAsc),
            "name-asc" => Ok(TripSort::NameAsc),
            "name-desc" => Ok(TripSort::NameDesc),
            other => Err(format!("unknown sort order: {}", other)),
        }
    }
}

/// Dashboard filter. `status: None` means all trips.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripQuery {
    pub status: Option<DerivedStatus>,
    pub search: String,
    pub sort: TripSort,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub all: usize,
    pub upcoming: usize,
    pub ongoing: usize,
    pub completed: usize,
    pub draft: usize,
}

impl StatusCounts {
    pub fn get(&self, status: DerivedStatus) -> usize {
        match status {
            DerivedStatus::Upcoming => self.upcoming,
            DerivedStatus::Ongoing => self.ongoing,
            DerivedStatus::Completed => self.completed,
            DerivedStatus::Draft => self.draft,
        }
    }
}

impl TravelBuddy {
    /// Every trip, in the order they were created.
    pub fn get_trips(&self) -> Vec<Trip> {
        self.store.get_records::<Trip>(keys::TRIPS).items
    }

    pub fn get_trip(&self, id: impl IntoId) -> Option<Trip> {
        let id = id.into_id()?;
        self.get_trips().into_iter().find(|t| t.id == id)
    }

    /// Update the trip named by `draft.id`, or create a new one.
    ///
    /// Updates merge only the fields the draft sets. A draft without an id,
    /// or with an id no stored trip has, becomes a new trip with a fresh id
    /// and status `draft` unless the draft says otherwise.
    pub fn save_trip(&self, draft: TripDraft) -> i64 {
        let mut records: Records<Trip> = self.store.get_records(keys::TRIPS);
        let trips = &mut records.items;
        let now = self.clock.now();

        let existing = draft
            .id
            .and_then(|id| trips.iter().position(|t| t.id == id));
        let id = match existing {
            Some(index) => {
                let trip = &mut trips[index];
                draft.apply_to(trip);
                trip.updated_at = Some(now);
                debug!(id = trip.id, "Trip updated");
                trip.id
            }
            None => {
                if let Some(stale) = draft.id {
                    warn!(id = stale, "No trip with this id, saving as a new trip");
                }
                let trip = draft.into_trip(self.next_id(), now);
                let id = trip.id;
                trips.push(trip);
                info!(id, "Trip created");
                id
            }
        };

        self.store.set_records(keys::TRIPS, &records);
        id
    }

    /// Removes the trip if present. Returns whether anything was removed.
    pub fn delete_trip(&self, id: impl IntoId) -> bool {
        let Some(id) = id.into_id() else {
            return false;
        };
        let mut records: Records<Trip> = self.store.get_records(keys::TRIPS);
        let before = records.items.len();
        records.items.retain(|t| t.id != id);
        if records.items.len() == before {
            return false;
        }
        self.store.set_records(keys::TRIPS, &records);
        true
    }

    /// Validate a complete trip and save it as `planned`.
    ///
    /// Name, destination and both dates are required, the start may not be
    /// in the past and the end must follow the start. Nothing is saved when
    /// validation fails.
    pub fn plan_trip(&self, draft: TripDraft) -> Result<i64, ValidationError> {
        let now = self.clock.now();
        let preview = match draft.id.and_then(|id| self.get_trip(id)) {
            Some(mut existing) => {
                draft.clone().apply_to(&mut existing);
                existing
            }
            None => draft.clone().into_trip(0, now),
        };
        preview.check_ready(self.today())?;

        Ok(self.save_trip(draft.status(TripStatus::Planned)))
    }

    /// Save a copy of a trip as a new draft.
    pub fn duplicate_trip(&self, id: impl IntoId) -> Option<i64> {
        let trip = self.get_trip(id)?;
        Some(self.save_trip(trip.duplicate()))
    }

    pub fn export_trip(&self, id: impl IntoId) -> Option<String> {
        let trip = self.get_trip(id)?;
        serde_json::to_string_pretty(&trip).ok()
    }

    pub fn export_trips(&self) -> String {
        serde_json::to_string_pretty(&self.get_trips()).unwrap_or_else(|e| {
            warn!(error = %e, "Failed to export trips");
            "[]".to_string()
        })
    }

    /// Save an exported trip document as a new draft.
    pub fn import_trip(&self, json: &str) -> Result<i64, ValidationError> {
        let mut draft: TripDraft = serde_json::from_str(json)
            .map_err(|e| ValidationError::InvalidImport(e.to_string()))?;
        if draft.name.as_deref().map_or(true, |n| n.trim().is_empty()) {
            return Err(ValidationError::MissingField("Trip name"));
        }
        draft.id = None;
        draft.status = Some(TripStatus::Draft);
        Ok(self.save_trip(draft))
    }

    pub fn list_trips(&self, query: &TripQuery) -> Vec<Trip> {
        let now = self.clock.now();
        let search = query.search.trim();

        let mut trips: Vec<Trip> = self
            .get_trips()
            .into_iter()
            .filter(|t| query.status.map_or(true, |s| t.derived_status(now) == s))
            .filter(|t| {
                search.is_empty()
                    || contains_ignore_case(&t.name, search)
                    || contains_ignore_case(&t.destination, search)
            })
            .collect();

        // Stable, so ties keep insertion order
        trips.sort_by(|a, b| query.sort.compare(a, b));
        trips
    }

    pub fn status_counts(&self) -> StatusCounts {
        let now = self.clock.now();
        let mut counts = StatusCounts::default();
        for trip in self.get_trips() {
            counts.all += 1;
            match trip.derived_status(now) {
                DerivedStatus::Upcoming => counts.upcoming += 1,
                DerivedStatus::Ongoing => counts.ongoing += 1,
                DerivedStatus::Completed => counts.completed += 1,
                DerivedStatus::Draft => counts.draft += 1,
            }
        }
        counts
    }
}
