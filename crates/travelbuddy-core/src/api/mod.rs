//! HTTP access to the catalog and the optional third-party services.
//!
//! - `client`: the `JsonSource` seam and its reqwest implementation, used by
//!   the fetch cache to load `<base>/<endpoint>.json`
//! - `gallery`: travel photos from Unsplash with a bundled fallback
//! - `countries`: country facts from REST Countries with a bundled fallback
//!
//! Nothing here is required for correctness; callers degrade to static data.

pub mod client;
pub mod countries;
pub mod error;
pub mod gallery;

pub use client::{HttpJsonSource, JsonSource};
pub use countries::{CountriesClient, CountryInfo};
pub use error::ApiError;
pub use gallery::{GalleryClient, GalleryPhoto};
