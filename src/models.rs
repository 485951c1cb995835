//! Request and error payloads.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::{AspectSet, Ayanamsa, HouseSystem, Zodiac};

/// A chart computation request as received from the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartRequest {
    /// `YYYY-MM-DD`
    pub birth_date: String,
    /// `HH:MM`, 24-hour. Without it houses and the ascendant are undefined.
    #[serde(default)]
    pub birth_time_local: Option<String>,
    #[serde(default)]
    pub time_approx: bool,
    #[serde(default)]
    pub time_tolerance_minutes: u32,
    pub place: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub house_system: HouseSystem,
    #[serde(default)]
    pub zodiac: Zodiac,
    #[serde(default)]
    pub ayanamsa: Ayanamsa,
    #[serde(default = "default_aspect_sets")]
    pub aspect_sets: Vec<AspectSet>,
}

fn default_aspect_sets() -> Vec<AspectSet> {
    vec![AspectSet::Major]
}

impl ChartRequest {
    /// Minimal request with the defaults from the external interface.
    pub fn new(birth_date: impl Into<String>, place: impl Into<String>) -> Self {
        ChartRequest {
            birth_date: birth_date.into(),
            birth_time_local: None,
            time_approx: false,
            time_tolerance_minutes: 0,
            place: place.into(),
            latitude: None,
            longitude: None,
            timezone: None,
            house_system: HouseSystem::default(),
            zodiac: Zodiac::default(),
            ayanamsa: Ayanamsa::default(),
            aspect_sets: default_aspect_sets(),
        }
    }
}

/// The error payload returned for any failed request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl From<&EngineError> for ErrorResponse {
    fn from(err: &EngineError) -> Self {
        ErrorResponse {
            error: err.kind().as_str().to_string(),
            message: err.to_string(),
        }
    }
}
