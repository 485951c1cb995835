//! Geocoding and timezone-resolution collaborators.
//!
//! Both sit behind traits so the orchestrator can be tested with scripted
//! doubles. The shipped implementations talk to OSM Nominatim and the
//! GeoNames timezone service over HTTP.

use std::time::Duration;

use log::debug;
use reqwest::blocking::Client;
use serde::Deserialize;
use urlencoding::encode;

use crate::error::EngineError;

const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/search";
const GEONAMES_URL: &str = "http://api.geonames.org/timezoneJSON";
const USER_AGENT: &str = concat!("natal_core/", env!("CARGO_PKG_VERSION"));

/// A geocoded place.
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub latitude: f64,
    pub longitude: f64,
    pub display_name: String,
}

/// Place name → coordinates. Fails when nothing matches.
pub trait Geocoder: Send + Sync {
    fn geocode(&self, place: &str) -> Result<Place, EngineError>;
}

/// Coordinates → IANA timezone identifier. Fails when none is found.
pub trait TimezoneResolver: Send + Sync {
    fn resolve(&self, latitude: f64, longitude: f64) -> Result<String, EngineError>;
}

// ---------------------------
// ## Nominatim
// ---------------------------

#[derive(Debug, Deserialize)]
struct NominatimHit {
    lat: String,
    lon: String,
    display_name: String,
}

pub struct NominatimGeocoder {
    client: Client,
}

impl NominatimGeocoder {
    pub fn new() -> Result<Self, EngineError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| EngineError::Internal(format!("http client init failed: {}", e)))?;
        Ok(NominatimGeocoder { client })
    }
}

impl Geocoder for NominatimGeocoder {
    fn geocode(&self, place: &str) -> Result<Place, EngineError> {
        let url = format!("{}?q={}&format=json&limit=1", NOMINATIM_URL, encode(place));
        debug!("geocoding '{}'", place);

        let hits: Vec<NominatimHit> = self
            .client
            .get(&url)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.json())
            .map_err(|e| EngineError::Geocode(format!("geocoding request failed: {}", e)))?;

        let hit = hits
            .into_iter()
            .next()
            .ok_or_else(|| EngineError::Geocode(format!("no geocoding match for '{}'", place)))?;

        let latitude: f64 = hit
            .lat
            .parse()
            .map_err(|_| EngineError::Geocode(format!("bad latitude '{}' from geocoder", hit.lat)))?;
        let longitude: f64 = hit
            .lon
            .parse()
            .map_err(|_| EngineError::Geocode(format!("bad longitude '{}' from geocoder", hit.lon)))?;

        Ok(Place { latitude, longitude, display_name: hit.display_name })
    }
}

// ---------------------------
// ## GeoNames
// ---------------------------

#[derive(Debug, Deserialize)]
struct GeoNamesTimezone {
    #[serde(rename = "timezoneId")]
    timezone_id: Option<String>,
}

pub struct GeoNamesTimezoneResolver {
    client: Client,
    username: String,
}

impl GeoNamesTimezoneResolver {
    pub fn new(username: impl Into<String>) -> Result<Self, EngineError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| EngineError::Internal(format!("http client init failed: {}", e)))?;
        Ok(GeoNamesTimezoneResolver { client, username: username.into() })
    }
}

impl TimezoneResolver for GeoNamesTimezoneResolver {
    fn resolve(&self, latitude: f64, longitude: f64) -> Result<String, EngineError> {
        let url = format!(
            "{}?lat={}&lng={}&username={}",
            GEONAMES_URL,
            latitude,
            longitude,
            encode(&self.username)
        );
        debug!("resolving timezone for ({}, {})", latitude, longitude);

        let payload: GeoNamesTimezone = self
            .client
            .get(&url)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.json())
            .map_err(|e| EngineError::TimezoneResolve(format!("timezone lookup failed: {}", e)))?;

        payload.timezone_id.ok_or_else(|| {
            EngineError::TimezoneResolve(format!(
                "no timezone found for ({}, {})",
                latitude, longitude
            ))
        })
    }
}
