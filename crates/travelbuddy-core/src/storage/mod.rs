//! Local persistence for user-owned records.
//!
//! This module provides:
//! - `StorageBackend`: string key-value backend (`FileStorage`, `MemoryStorage`)
//! - `PersistentStore`: typed JSON get/set/remove/clear that never fails loudly
//! - `Records`: a stored list read per element, keeping the ones that don't parse
//!
//! Trips, budgets, the user profile, favorites and first-visit flags all
//! live under their own key. There is no cross-key transaction.

pub mod backend;
pub mod store;

pub use backend::{FileStorage, MemoryStorage, StorageBackend};
pub use store::{PersistentStore, Records};
