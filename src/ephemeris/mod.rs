//! Ephemeris collaborator interface.
//!
//! The engine never talks to an ephemeris backend directly; it goes through
//! the [`Ephemeris`] trait. Sidereal mode is a per-call capability (the
//! ayanamsa travels with every request) rather than provider-global state, so
//! concurrent requests with different zodiac modes cannot interfere.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::{Ayanamsa, HouseSystem};

pub mod angles;
pub mod horizons;
pub mod table;

pub use horizons::HorizonsEphemeris;
pub use table::TableEphemeris;

// ---------------------------
// ## Tracked Bodies
// ---------------------------

/// The fixed catalog of tracked bodies, in chart order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Body {
    Sun,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
    TrueNode,
    MeanNode,
    Chiron,
    Lilith,
}

impl Body {
    pub const ALL: [Body; 14] = [
        Body::Sun,
        Body::Moon,
        Body::Mercury,
        Body::Venus,
        Body::Mars,
        Body::Jupiter,
        Body::Saturn,
        Body::Uranus,
        Body::Neptune,
        Body::Pluto,
        Body::TrueNode,
        Body::MeanNode,
        Body::Chiron,
        Body::Lilith,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Body::Sun => "Sun",
            Body::Moon => "Moon",
            Body::Mercury => "Mercury",
            Body::Venus => "Venus",
            Body::Mars => "Mars",
            Body::Jupiter => "Jupiter",
            Body::Saturn => "Saturn",
            Body::Uranus => "Uranus",
            Body::Neptune => "Neptune",
            Body::Pluto => "Pluto",
            Body::TrueNode => "TrueNode",
            Body::MeanNode => "MeanNode",
            Body::Chiron => "Chiron",
            Body::Lilith => "Lilith",
        }
    }

    /// JPL Horizons target identifier for the HTTP-backed provider.
    pub(crate) fn horizons_id(&self) -> &'static str {
        match self {
            Body::Sun => "'10'",
            Body::Moon => "'301'",
            Body::Mercury => "'199'",
            Body::Venus => "'299'",
            Body::Mars => "'499'",
            Body::Jupiter => "'599'",
            Body::Saturn => "'699'",
            Body::Uranus => "'799'",
            Body::Neptune => "'899'",
            Body::Pluto => "'999'",
            // Lunar nodes and apogee are abstract points without a Horizons
            // body record; Chiron is minor planet 2060.
            Body::TrueNode => "'-99'",
            Body::MeanNode => "'-99'",
            Body::Chiron => "'2060;'",
            Body::Lilith => "'-100'",
        }
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ---------------------------
// ## Provider Interface
// ---------------------------

/// Ecliptic longitude and longitudinal speed of a single body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    /// Degrees in [0, 360).
    pub longitude: f64,
    /// Degrees per day; negative means retrograde.
    pub speed_longitude: f64,
}

/// House cusps and angles exactly as the provider returns them.
///
/// `cusps` may have 12 entries (houses 1..12 at indices 0..11) or 13 entries
/// with a placeholder at index 0 (the swisseph convention); the resolver
/// normalizes either shape.
#[derive(Debug, Clone, PartialEq)]
pub struct RawHouses {
    pub cusps: Vec<f64>,
    pub asc: f64,
    pub mc: f64,
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("ephemeris error {code}: {message}")]
pub struct EphemerisError {
    pub code: i32,
    pub message: String,
}

impl EphemerisError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        EphemerisError { code, message: message.into() }
    }
}

/// An ephemeris backend: deterministic and stateless from the caller's point
/// of view. The sidereal toggle is passed per call, never set globally.
pub trait Ephemeris: Send + Sync {
    /// Longitude and speed of one body at `jd_ut`. `ayanamsa` being `Some`
    /// selects the sidereal zodiac with that offset.
    fn body_state(
        &self,
        jd_ut: f64,
        body: Body,
        ayanamsa: Option<Ayanamsa>,
    ) -> Result<BodyState, EphemerisError>;

    /// Twelve house cusps plus ascendant/midheaven for the given instant and
    /// observer coordinates.
    fn houses(
        &self,
        jd_ut: f64,
        latitude: f64,
        longitude: f64,
        system: HouseSystem,
    ) -> Result<RawHouses, EphemerisError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_fourteen_bodies() {
        assert_eq!(Body::ALL.len(), 14);
        assert_eq!(Body::ALL[0].name(), "Sun");
        assert_eq!(Body::ALL[13].name(), "Lilith");
    }

    #[test]
    fn error_display_carries_code_and_message() {
        let e = EphemerisError::new(-2, "no data");
        assert_eq!(e.to_string(), "ephemeris error -2: no data");
    }
}
