//! In-memory cache for catalog documents.
//!
//! `FetchCache` keeps every successfully fetched endpoint for the life of
//! the process and shares in-flight requests between concurrent callers.
//! When a fetch fails, the bundled data in `fallback` is served instead and
//! nothing is cached, so the next call tries the network again.

pub mod fallback;
pub mod manager;

pub use manager::{CachedData, FetchCache};
