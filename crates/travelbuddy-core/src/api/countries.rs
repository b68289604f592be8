//! Country facts from the REST Countries API.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::ApiError;
use crate::cache::fallback;

const REST_COUNTRIES_URL: &str = "https://restcountries.com/v3.1/name";

const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryInfo {
    pub name: String,
    pub region: String,
    pub capital: Option<String>,
    pub population: Option<u64>,
    pub currencies: Vec<String>,
    pub languages: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RestCountry {
    name: RestName,
    #[serde(default)]
    region: String,
    #[serde(default)]
    capital: Vec<String>,
    population: Option<u64>,
    #[serde(default)]
    currencies: BTreeMap<String, RestCurrency>,
    #[serde(default)]
    languages: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct RestName {
    common: String,
}

#[derive(Debug, Deserialize)]
struct RestCurrency {
    name: String,
}

impl From<RestCountry> for CountryInfo {
    fn from(country: RestCountry) -> Self {
        Self {
            name: country.name.common,
            region: country.region,
            capital: country.capital.into_iter().next(),
            population: country.population,
            currencies: country.currencies.into_values().map(|c| c.name).collect(),
            languages: country.languages.into_values().collect(),
        }
    }
}

/// Continent recorded for `country` in the bundled destinations.
fn fallback_info(country: &str) -> Option<CountryInfo> {
    fallback::destinations()
        .into_iter()
        .find(|d| d.country.eq_ignore_ascii_case(country.trim()))
        .map(|d| CountryInfo {
            name: d.country,
            region: d.continent,
            capital: None,
            population: None,
            currencies: Vec::new(),
            languages: Vec::new(),
        })
}

pub struct CountriesClient {
    client: Client,
    base_url: String,
}

impl CountriesClient {
    pub fn new() -> Result<Self, ApiError> {
        Self::with_base_url(REST_COUNTRIES_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Best effort: falls back to the bundled continent, or `None`.
    pub async fn lookup(&self, country: &str) -> Option<CountryInfo> {
        match self.fetch(country).await {
            Ok(Some(info)) => Some(info),
            Ok(None) => {
                debug!(country, "Country not found");
                fallback_info(country)
            }
            Err(e) => {
                warn!(country, error = %e, "Country lookup failed, using bundled data");
                fallback_info(country)
            }
        }
    }

    async fn fetch(&self, country: &str) -> Result<Option<CountryInfo>, ApiError> {
        let url = format!("{}/{}", self.base_url, country.trim());
        let response = self
            .client
            .get(&url)
            .query(&[
                ("fullText", "true"),
                ("fields", "name,region,capital,population,currencies,languages"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, &body));
        }

        let body = response.text().await?;
        let countries: Vec<RestCountry> = serde_json::from_str(&body)?;
        Ok(countries.into_iter().next().map(CountryInfo::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rest_country() {
        let json = r#"[{
            "name": {"common": "Japan", "official": "Japan"},
            "region": "Asia",
            "capital": ["Tokyo"],
            "population": 125836021,
            "currencies": {"JPY": {"name": "Japanese yen", "symbol": "¥"}},
            "languages": {"jpn": "Japanese"}
        }]"#;
        let parsed: Vec<RestCountry> = serde_json::from_str(json).unwrap();
        let info = CountryInfo::from(parsed.into_iter().next().unwrap());

        assert_eq!(info.name, "Japan");
        assert_eq!(info.capital.as_deref(), Some("Tokyo"));
        assert_eq!(info.currencies, vec!["Japanese yen"]);
        assert_eq!(info.languages, vec!["Japanese"]);
    }

    #[test]
    fn test_fallback_info() {
        let info = fallback_info(" indonesia ").unwrap();
        assert_eq!(info.name, "Indonesia");
        assert_eq!(info.region, "Asia");
        assert!(fallback_info("Peru").is_none());
    }

    #[tokio::test]
    async fn test_unreachable_service_falls_back() {
        let client = CountriesClient::with_base_url("http://127.0.0.1:9").unwrap();
        let info = client.lookup("France").await.unwrap();
        assert_eq!(info.region, "Europe");
        assert!(client.lookup("Atlantis").await.is_none());
    }
}
