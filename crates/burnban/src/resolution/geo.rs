//! ZIP code to county resolution.
//!
//! Two sequential lookups: a geocoder turns the ZIP into coordinates, then an
//! administrative boundary service names the county containing that point.
//! Each stage is a trait so the HTTP clients can be swapped for fakes.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::normalizer::strip_county_suffix;
use super::zip::ZipCode;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeoError {
    #[error("no county found for ZIP code")]
    NotFound,
    #[error("geo lookup failed: {0}")]
    Network(String),
}

impl From<reqwest::Error> for GeoError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

/// Forward geocoding of a postal code. `Ok(None)` means the ZIP is unknown, not a fault.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn locate(&self, zip: &ZipCode) -> Result<Option<Coordinates>, GeoError>;
}

/// Reverse lookup of the county containing a point. `Ok(None)` when no county is reported.
#[async_trait]
pub trait BoundaryLookup: Send + Sync {
    async fn county_at(&self, point: Coordinates) -> Result<Option<String>, GeoError>;
}

pub struct GeoResolver {
    geocoder: Arc<dyn Geocoder>,
    boundaries: Arc<dyn BoundaryLookup>,
}

impl GeoResolver {
    pub fn new(geocoder: Arc<dyn Geocoder>, boundaries: Arc<dyn BoundaryLookup>) -> Self {
        Self {
            geocoder,
            boundaries,
        }
    }

    /// Single attempt per stage; failures are returned, never retried.
    pub async fn resolve_county(&self, zip: &ZipCode) -> Result<String, GeoError> {
        let point = self
            .geocoder
            .locate(zip)
            .await?
            .ok_or(GeoError::NotFound)?;

        debug!(%zip, latitude = point.latitude, longitude = point.longitude, "geocoded ZIP");

        let raw = self
            .boundaries
            .county_at(point)
            .await?
            .ok_or(GeoError::NotFound)?;

        let county = strip_county_suffix(&raw);
        if county.is_empty() {
            return Err(GeoError::NotFound);
        }

        Ok(county)
    }
}

fn http_client(user_agent: &str, timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .build()
}

/// Nominatim `/search` client scoped to the USA.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new(
        base_url: impl Into<String>,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: http_client(user_agent, timeout)?,
            base_url: base_url.into(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

fn first_place(places: &[NominatimPlace]) -> Option<Coordinates> {
    let place = places.first()?;
    Some(Coordinates {
        latitude: place.lat.trim().parse().ok()?,
        longitude: place.lon.trim().parse().ok()?,
    })
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn locate(&self, zip: &ZipCode) -> Result<Option<Coordinates>, GeoError> {
        let places: Vec<NominatimPlace> = self
            .client
            .get(&self.base_url)
            .query(&[
                ("postalcode", zip.as_str()),
                ("country", "USA"),
                ("format", "json"),
                ("limit", "1"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(first_place(&places))
    }
}

/// FCC census block API (`/api/census/block/find`).
#[derive(Debug, Clone)]
pub struct FccBoundaryLookup {
    client: reqwest::Client,
    base_url: String,
}

impl FccBoundaryLookup {
    pub fn new(
        base_url: impl Into<String>,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: http_client(user_agent, timeout)?,
            base_url: base_url.into(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct CensusBlock {
    #[serde(rename = "County", default)]
    county: Option<CensusCounty>,
}

#[derive(Debug, Deserialize)]
struct CensusCounty {
    #[serde(default)]
    name: Option<String>,
}

impl CensusBlock {
    fn county_name(self) -> Option<String> {
        self.county
            .and_then(|county| county.name)
            .filter(|name| !name.trim().is_empty())
    }
}

#[async_trait]
impl BoundaryLookup for FccBoundaryLookup {
    async fn county_at(&self, point: Coordinates) -> Result<Option<String>, GeoError> {
        let block: CensusBlock = self
            .client
            .get(&self.base_url)
            .query(&[
                ("format", "json".to_string()),
                ("latitude", point.latitude.to_string()),
                ("longitude", point.longitude.to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(block.county_name())
    }
}
