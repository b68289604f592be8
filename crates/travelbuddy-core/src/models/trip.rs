use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::lenient;
use super::suggestion::SuggestedActivity;
use crate::error::ValidationError;

pub(crate) const DEFAULT_TRAVELERS: u32 = 1;

/// Suggestions are placed on the first day holding fewer activities than this.
const MAX_SUGGESTED_PER_DAY: usize = 4;

/// Status as stored on the record. Front ends only ever write `Draft` or
/// `Planned`; the other two survive from imported data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub enum TripStatus {
    #[default]
    Draft,
    Planned,
    Ongoing,
    Completed,
}

/// Status shown to the user, derived from the stored status and the dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub enum DerivedStatus {
    Draft,
    Upcoming,
    Ongoing,
    Completed,
}

impl DerivedStatus {
    pub const ALL: [DerivedStatus; 4] = [
        DerivedStatus::Upcoming,
        DerivedStatus::Ongoing,
        DerivedStatus::Completed,
        DerivedStatus::Draft,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DerivedStatus::Draft => "draft",
            DerivedStatus::Upcoming => "upcoming",
            DerivedStatus::Ongoing => "ongoing",
            DerivedStatus::Completed => "completed",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DerivedStatus::Draft => "Draft",
            DerivedStatus::Upcoming => "Upcoming",
            DerivedStatus::Ongoing => "Ongoing",
            DerivedStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for DerivedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for DerivedStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DerivedStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown trip status: {}", s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ItineraryActivity {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ItineraryActivity {
    /// Trims every field; blank optional fields become `None`.
    pub fn new(name: &str, time: Option<&str>, description: Option<&str>) -> Self {
        fn non_blank(value: Option<&str>) -> Option<String> {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        }

        Self {
            name: name.trim().to_string(),
            time: non_blank(time),
            description: non_blank(description),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Day {
    pub day_number: u32,
    #[serde(default)]
    pub activities: Vec<ItineraryActivity>,
}

impl Day {
    pub fn new(day_number: u32) -> Self {
        Self {
            day_number,
            activities: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Trip {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub destination: String,
    #[serde(
        default,
        deserialize_with = "lenient::optional_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_date: Option<NaiveDate>,
    #[serde(
        default,
        deserialize_with = "lenient::optional_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_date: Option<NaiveDate>,
    #[serde(default = "default_travelers", deserialize_with = "lenient::count")]
    pub travelers: u32,
    #[serde(
        default,
        deserialize_with = "lenient::optional_amount",
        skip_serializing_if = "Option::is_none"
    )]
    pub budget: Option<f64>,
    #[serde(default)]
    pub status: TripStatus,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub days: Vec<Day>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_travelers() -> u32 {
    DEFAULT_TRAVELERS
}

/// Calendar dates compare as midnight UTC.
fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::default()).and_utc()
}

impl Trip {
    pub fn derived_status(&self, now: DateTime<Utc>) -> DerivedStatus {
        if self.status == TripStatus::Draft {
            return DerivedStatus::Draft;
        }

        let start = self.start_date.map(start_of_day);
        let end = self.end_date.map(start_of_day);

        if let Some(start) = start {
            if now < start {
                return DerivedStatus::Upcoming;
            }
        }

        // A missing date fails every comparison and lands on completed
        match (start, end) {
            (Some(start), Some(end)) if now >= start && now <= end => DerivedStatus::Ongoing,
            _ => DerivedStatus::Completed,
        }
    }

    /// Starts strictly after `now`.
    pub fn starts_after(&self, now: DateTime<Utc>) -> bool {
        self.start_date
            .map(start_of_day)
            .is_some_and(|start| start > now)
    }

    /// Inclusive number of calendar days between start and end.
    pub fn duration_days(&self) -> Option<i64> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) if end >= start => Some((end - start).num_days() + 1),
            _ => None,
        }
    }

    /// Sort key used by the date sorts: creation time, else start date.
    pub fn sort_timestamp(&self) -> Option<DateTime<Utc>> {
        self.created_at.or_else(|| self.start_date.map(start_of_day))
    }

    /// Name and destination are required, then the date rules apply.
    pub fn check_ready(&self, today: NaiveDate) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("Trip name"));
        }
        if self.destination.trim().is_empty() {
            return Err(ValidationError::MissingField("Destination"));
        }
        let start = self
            .start_date
            .ok_or(ValidationError::MissingField("Start date"))?;
        let end = self
            .end_date
            .ok_or(ValidationError::MissingField("End date"))?;
        validate_trip_dates(start, end, today)
    }

    // ===== Itinerary editing =====

    pub fn add_day(&mut self) -> u32 {
        let day_number = self.days.len() as u32 + 1;
        self.days.push(Day::new(day_number));
        day_number
    }

    pub fn remove_day(&mut self, index: usize) -> Result<Day, ValidationError> {
        if index >= self.days.len() {
            return Err(ValidationError::NoSuchDay(index));
        }
        if self.days.len() <= 1 {
            return Err(ValidationError::LastDay);
        }
        let removed = self.days.remove(index);
        self.renumber_days();
        Ok(removed)
    }

    fn renumber_days(&mut self) {
        for (index, day) in self.days.iter_mut().enumerate() {
            day.day_number = index as u32 + 1;
        }
    }

    pub fn add_activity(
        &mut self,
        day_index: usize,
        activity: ItineraryActivity,
    ) -> Result<(), ValidationError> {
        if activity.name.trim().is_empty() {
            return Err(ValidationError::MissingField("Activity name"));
        }
        let day = self
            .days
            .get_mut(day_index)
            .ok_or(ValidationError::NoSuchDay(day_index))?;
        day.activities.push(activity);
        Ok(())
    }

    pub fn remove_activity(
        &mut self,
        day_index: usize,
        activity_index: usize,
    ) -> Result<ItineraryActivity, ValidationError> {
        let day = self
            .days
            .get_mut(day_index)
            .ok_or(ValidationError::NoSuchDay(day_index))?;
        if activity_index >= day.activities.len() {
            return Err(ValidationError::NoSuchActivity(activity_index));
        }
        Ok(day.activities.remove(activity_index))
    }

    /// Grow or shrink the day list to cover the date range. Returns `false`
    /// (and leaves the days alone) unless both dates are set and the end is
    /// after the start.
    pub fn sync_days_to_dates(&mut self) -> bool {
        let (Some(start), Some(end)) = (self.start_date, self.end_date) else {
            return false;
        };
        if end <= start {
            return false;
        }

        let wanted = ((end - start).num_days() + 1) as usize;
        while self.days.len() < wanted {
            self.add_day();
        }
        self.days.truncate(wanted);
        true
    }

    /// Add a suggested activity to the first day with room, or to day 1 when
    /// every day is full. Returns the day number used; `None` without days.
    pub fn apply_suggestion(&mut self, suggestion: &SuggestedActivity) -> Option<u32> {
        if self.days.is_empty() {
            return None;
        }

        let target = self
            .days
            .iter()
            .position(|day| day.activities.len() < MAX_SUGGESTED_PER_DAY)
            .unwrap_or(0);

        let day = &mut self.days[target];
        day.activities.push(ItineraryActivity::new(
            &suggestion.name,
            Some(&suggestion.time),
            Some(&suggestion.description),
        ));
        Some(day.day_number)
    }

    /// A fresh draft copying this trip's content.
    pub fn duplicate(&self) -> TripDraft {
        TripDraft {
            id: None,
            name: Some(format!("{} (Copy)", self.name)),
            destination: Some(self.destination.clone()),
            start_date: self.start_date,
            end_date: self.end_date,
            travelers: Some(self.travelers),
            budget: self.budget,
            status: Some(TripStatus::Draft),
            types: Some(self.types.clone()),
            days: Some(self.days.clone()),
        }
    }
}

/// The start may not be before `today`, and the end must come after the start.
pub fn validate_trip_dates(
    start: NaiveDate,
    end: NaiveDate,
    today: NaiveDate,
) -> Result<(), ValidationError> {
    if start < today {
        return Err(ValidationError::StartInPast);
    }
    if end <= start {
        return Err(ValidationError::EndBeforeStart);
    }
    Ok(())
}

/// Fields to create or update a trip with. `None` leaves a field untouched
/// on update.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TripDraft {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub destination: Option<String>,
    #[serde(deserialize_with = "lenient::optional_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(deserialize_with = "lenient::optional_date")]
    pub end_date: Option<NaiveDate>,
    #[serde(deserialize_with = "lenient::optional_count")]
    pub travelers: Option<u32>,
    #[serde(deserialize_with = "lenient::optional_amount")]
    pub budget: Option<f64>,
    pub status: Option<TripStatus>,
    pub types: Option<Vec<String>>,
    pub days: Option<Vec<Day>>,
}

impl TripDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    pub fn dates(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    pub fn travelers(mut self, travelers: u32) -> Self {
        self.travelers = Some(travelers);
        self
    }

    pub fn status(mut self, status: TripStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn types(mut self, types: Vec<String>) -> Self {
        self.types = Some(types);
        self
    }

    pub fn days(mut self, days: Vec<Day>) -> Self {
        self.days = Some(days);
        self
    }

    /// Shallow merge onto an existing record. The id is never changed.
    pub(crate) fn apply_to(self, trip: &mut Trip) {
        if let Some(name) = self.name {
            trip.name = name;
        }
        if let Some(destination) = self.destination {
            trip.destination = destination;
        }
        if let Some(start) = self.start_date {
            trip.start_date = Some(start);
        }
        if let Some(end) = self.end_date {
            trip.end_date = Some(end);
        }
        if let Some(travelers) = self.travelers {
            trip.travelers = travelers;
        }
        if let Some(budget) = self.budget {
            trip.budget = Some(budget);
        }
        if let Some(status) = self.status {
            trip.status = status;
        }
        if let Some(types) = self.types {
            trip.types = types;
        }
        if let Some(days) = self.days {
            trip.days = days;
        }
    }

    pub(crate) fn into_trip(self, id: i64, now: DateTime<Utc>) -> Trip {
        Trip {
            id,
            name: self.name.unwrap_or_default(),
            destination: self.destination.unwrap_or_default(),
            start_date: self.start_date,
            end_date: self.end_date,
            travelers: self.travelers.unwrap_or(DEFAULT_TRAVELERS),
            budget: self.budget,
            status: self.status.unwrap_or_default(),
            types: self.types.unwrap_or_default(),
            days: self.days.unwrap_or_default(),
            created_at: Some(now),
            updated_at: Some(now),
        }
    }
}
