//! TravelBuddy core library.
//!
//! Everything the front ends need to browse the destination catalog, plan
//! trips, track budgets and keep a user profile:
//!
//! - `api`: catalog client plus the optional photo and country integrations
//! - `cache`: in-memory fetch cache with static fallbacks
//! - `storage`: typed key-value store over a durable backend
//! - `models`: destinations, trips, budgets, profile
//! - `service`: the `TravelBuddy` data access context

pub mod api;
pub mod cache;
pub mod clock;
pub mod config;
pub mod credentials;
pub mod error;
pub mod models;
pub mod service;
pub mod storage;
pub mod utils;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use error::{StoreError, ValidationError};
pub use service::TravelBuddy;
