//! Data models for TravelBuddy records.
//!
//! - `Destination`, `Activity`: read-only catalog entries
//! - `Trip`, `Day`, `ItineraryActivity`: user itineraries
//! - `Budget`, `Category`, `Expense`: per-trip spend tracking
//! - `UserProfile`, `Preferences`, `Achievement`: the profile singleton
//! - `Suggestions`: canned trip suggestions
//!
//! Field names are camelCase on disk so existing browser data loads as-is.

pub mod budget;
pub mod destination;
pub mod id;
mod lenient;
pub mod profile;
pub mod suggestion;
pub mod trip;

pub use budget::{Budget, BudgetDraft, BudgetSummary, Category, Expense, NewCategory, NewExpense};
pub use destination::{Activity, BudgetTier, Destination, DestinationFilters};
pub use id::{parse_id, IntoId};
pub use profile::{Achievement, Preferences, ProfileExport, ProfileUpdate, UserProfile};
pub use suggestion::{SuggestedActivity, Suggestions, Venue};
pub use trip::{
    validate_trip_dates, Day, DerivedStatus, ItineraryActivity, Trip, TripDraft, TripStatus,
};
