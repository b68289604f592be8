//! Travel photo gallery backed by the Unsplash search API.
//!
//! The gallery is decoration: without a usable access key, or when Unsplash
//! returns nothing, the bundled Pexels set is shown instead.

use std::time::Duration;

use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::ApiError;

const UNSPLASH_SEARCH_URL: &str = "https://api.unsplash.com/search/photos";

/// Placeholder shipped in sample configs.
const PLACEHOLDER_KEY: &str = "YOUR_UNSPLASH_ACCESS_KEY";

const MIN_KEY_LENGTH: usize = 10;

const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Only the first few queries are searched, one photo each.
const MAX_PHOTOS: usize = 6;

/// Search query and the location title shown for it.
const SEARCHES: &[(&str, &str)] = &[
    ("paris eiffel tower", "Paris"),
    ("santorini greece", "Santorini"),
    ("tokyo japan", "Tokyo"),
    ("bali indonesia", "Bali"),
    ("new york city", "New York"),
    ("iceland northern lights", "Iceland"),
    ("maldives beach", "Maldives"),
    ("norway fjords", "Norway"),
    ("thailand temple", "Thailand"),
    ("australia sydney", "Sydney"),
    ("dubai skyline", "Dubai"),
    ("peru machu picchu", "Machu Picchu"),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryPhoto {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub thumbnail_url: String,
    pub location: String,
    pub photographer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photographer_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unsplash_url: Option<String>,
    pub is_unsplash: bool,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<UnsplashPhoto>,
}

#[derive(Debug, Deserialize)]
struct UnsplashPhoto {
    id: String,
    description: Option<String>,
    alt_description: Option<String>,
    urls: PhotoUrls,
    user: Photographer,
    links: Links,
}

#[derive(Debug, Deserialize)]
struct PhotoUrls {
    regular: String,
    small: String,
}

#[derive(Debug, Deserialize)]
struct Photographer {
    name: String,
    links: Links,
}

#[derive(Debug, Deserialize)]
struct Links {
    html: String,
}

/// A key is usable when it is longer than 10 characters and is not the
/// sample placeholder.
pub fn is_usable_key(key: &str) -> bool {
    let key = key.trim();
    key != PLACEHOLDER_KEY && key.chars().count() > MIN_KEY_LENGTH
}

/// First 8 and last 4 characters, for logs.
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 12 {
        return "***".to_string();
    }
    let head: String = chars[..8].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Title for a search term; unknown terms use their first word.
fn location_name(query: &str) -> String {
    SEARCHES
        .iter()
        .find(|(q, _)| *q == query)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| query.split(' ').next().unwrap_or(query).to_string())
}

fn photo_from_result(query: &str, photo: UnsplashPhoto) -> GalleryPhoto {
    let location = location_name(query);
    GalleryPhoto {
        id: photo.id,
        title: location.clone(),
        description: photo
            .description
            .or(photo.alt_description)
            .unwrap_or_else(|| query.to_string()),
        image_url: photo.urls.regular,
        thumbnail_url: photo.urls.small,
        location,
        photographer: photo.user.name,
        photographer_url: Some(photo.user.links.html),
        unsplash_url: Some(photo.links.html),
        is_unsplash: true,
    }
}

pub struct GalleryClient {
    client: Client,
    access_key: Option<String>,
}

impl GalleryClient {
    /// Unusable keys are dropped here, so the client falls back without
    /// touching the network.
    pub fn new(access_key: Option<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        let access_key = access_key
            .map(|k| k.trim().to_string())
            .filter(|k| is_usable_key(k));
        if access_key.is_none() {
            debug!("No valid Unsplash access key, gallery will use bundled photos");
        }

        Ok(Self { client, access_key })
    }

    pub fn has_key(&self) -> bool {
        self.access_key.is_some()
    }

    /// Never fails: any error ends in the bundled gallery.
    pub async fn photos(&self) -> Vec<GalleryPhoto> {
        let Some(ref key) = self.access_key else {
            return fallback_photos();
        };
        info!(key = %mask_key(key), "Fetching gallery photos from Unsplash");

        let mut photos = Vec::new();
        for (query, _) in SEARCHES.iter().take(MAX_PHOTOS) {
            match self.search(key, query).await {
                Ok(Some(photo)) => photos.push(photo),
                Ok(None) => debug!(query, "No Unsplash results"),
                Err(ApiError::Unauthorized) => {
                    warn!("Unsplash rejected the access key, skipping remaining searches");
                    break;
                }
                Err(e) => warn!(query, error = %e, "Unsplash search failed"),
            }
        }

        if photos.is_empty() {
            return fallback_photos();
        }
        photos
    }

    async fn search(&self, key: &str, query: &str) -> Result<Option<GalleryPhoto>, ApiError> {
        let response = self
            .client
            .get(UNSPLASH_SEARCH_URL)
            .query(&[
                ("query", query),
                ("per_page", "1"),
                ("orientation", "landscape"),
                ("order_by", "popular"),
            ])
            .header(header::AUTHORIZATION, format!("Client-ID {}", key))
            .header("Accept-Version", "v1")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, &body));
        }

        let body = response.text().await?;
        let parsed: SearchResponse = serde_json::from_str(&body)?;
        Ok(parsed
            .results
            .into_iter()
            .next()
            .map(|photo| photo_from_result(query, photo)))
    }
}

fn pexels(id: u32, n: u32, title: &str, description: &str, location: &str) -> GalleryPhoto {
    let url = |w: u32| {
        format!(
            "https://images.pexels.com/photos/{id}/pexels-photo-{id}.jpeg?auto=compress&cs=tinysrgb&w={w}"
        )
    };
    GalleryPhoto {
        id: format!("gallery-{}", n),
        title: title.to_string(),
        description: description.to_string(),
        image_url: url(800),
        thumbnail_url: url(400),
        location: location.to_string(),
        photographer: "Pexels".to_string(),
        photographer_url: None,
        unsplash_url: None,
        is_unsplash: false,
    }
}

pub fn fallback_photos() -> Vec<GalleryPhoto> {
    vec![
        pexels(417074, 1, "Swiss Alps", "Majestic mountain peaks and pristine alpine lakes", "Swiss Alps, Switzerland"),
        pexels(1933239, 2, "Aurora Borealis", "Dancing northern lights over snowy landscapes", "Finnish Lapland"),
        pexels(3601425, 3, "Tropical Paradise", "Crystal clear waters and overwater bungalows", "Tropical Island"),
        pexels(1583339, 4, "Ancient Wonders", "Historic temples and ancient architecture", "Ancient Temple"),
        pexels(2422588, 5, "Desert Dunes", "Golden sand dunes under starry skies", "Sahara Desert"),
        pexels(1659437, 6, "Coastal Cliffs", "Dramatic coastal cliffs and crashing waves", "Coastal Cliffs"),
        pexels(2070033, 7, "Cherry Blossoms", "Beautiful spring cherry blossoms in full bloom", "Cherry Blossom Park"),
        pexels(1840295, 8, "Mountain Lake", "Serene mountain lake reflecting snow-capped peaks", "Mountain Lake"),
        pexels(1427107, 9, "Rainforest Canopy", "Lush green rainforest canopy from above", "Amazon Rainforest"),
        pexels(1519088, 10, "City Skyline", "Modern city skyline illuminated at night", "Modern City"),
        pexels(2422917, 11, "Volcanic Landscape", "Dramatic volcanic landscape with flowing lava", "Volcanic Island"),
        pexels(1571442, 12, "Frozen Wilderness", "Pristine frozen wilderness with ice formations", "Arctic Wilderness"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_validity() {
        assert!(!is_usable_key(""));
        assert!(!is_usable_key("short"));
        assert!(!is_usable_key("0123456789"));
        assert!(!is_usable_key(PLACEHOLDER_KEY));
        assert!(is_usable_key("abcdefghijk"));
    }

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key("abcdefgh1234567890wxyz"), "abcdefgh...wxyz");
        assert_eq!(mask_key("abcdefghijk"), "***");
    }

    #[test]
    fn test_location_name() {
        assert_eq!(location_name("peru machu picchu"), "Machu Picchu");
        assert_eq!(location_name("lisbon trams"), "lisbon");
    }

    #[test]
    fn test_parse_search_result() {
        let json = r#"{"total": 1, "results": [{
            "id": "abc",
            "description": null,
            "alt_description": "eiffel tower at dusk",
            "urls": {"regular": "https://img/r.jpg", "small": "https://img/s.jpg"},
            "user": {"name": "Jane", "links": {"html": "https://unsplash.com/@jane"}},
            "links": {"html": "https://unsplash.com/photos/abc"}
        }]}"#;
        let parsed: SearchResponse = serde_json::from_str(json).unwrap();
        let photo = photo_from_result("paris eiffel tower", parsed.results.into_iter().next().unwrap());

        assert_eq!(photo.title, "Paris");
        assert_eq!(photo.description, "eiffel tower at dusk");
        assert_eq!(photo.photographer, "Jane");
        assert!(photo.is_unsplash);
    }

    #[tokio::test]
    async fn test_no_key_uses_fallback() {
        let client = GalleryClient::new(Some(PLACEHOLDER_KEY.to_string())).unwrap();
        assert!(!client.has_key());

        let photos = client.photos().await;
        assert_eq!(photos.len(), 12);
        assert!(photos.iter().all(|p| !p.is_unsplash));
        assert_eq!(photos[0].id, "gallery-1");
        assert_eq!(
            photos[0].thumbnail_url,
            "https://images.pexels.com/photos/417074/pexels-photo-417074.jpeg?auto=compress&cs=tinysrgb&w=400"
        );
    }
}
