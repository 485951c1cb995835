//! Natal chart calculation engine.
//!
//! Computes a natal chart (planetary positions, house cusps, chart angles,
//! inter-planetary aspects) from a birth date, local time, and place. The
//! astronomical collaborators (ephemeris, geocoder, timezone resolver) sit
//! behind traits so the engine itself stays deterministic and testable.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub mod aspects;
pub mod chart;
pub mod config;
pub mod ephemeris;
pub mod error;
pub mod geo;
pub mod houses;
pub mod models;
pub mod planets;
pub mod scan;
pub mod service;
pub mod timeconv;
pub mod zodiac;

pub use chart::{ChartFlags, ChartMeta, ChartResult};
pub use config::EngineConfig;
pub use ephemeris::{Body, BodyState, Ephemeris, EphemerisError, RawHouses};
pub use error::{EngineError, ErrorKind};
pub use geo::{Geocoder, TimezoneResolver};
pub use models::{ChartRequest, ErrorResponse};
pub use scan::{ScanRequest, ScanResult};
pub use service::NatalService;
pub use zodiac::{SignPosition, ZodiacSign};

// ---------------------------
// ## Request Enumerations
// ---------------------------

/// House division method. `Equal` is defined for every latitude and is the
/// orchestrator's fallback when the requested system cannot be computed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum HouseSystem {
    #[default]
    Placidus,
    WholeSign,
    Koch,
    Equal,
}

impl fmt::Display for HouseSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HouseSystem::Placidus => "Placidus",
            HouseSystem::WholeSign => "WholeSign",
            HouseSystem::Koch => "Koch",
            HouseSystem::Equal => "Equal",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for HouseSystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Placidus" => Ok(HouseSystem::Placidus),
            "WholeSign" => Ok(HouseSystem::WholeSign),
            "Koch" => Ok(HouseSystem::Koch),
            "Equal" => Ok(HouseSystem::Equal),
            other => Err(format!("unknown house system '{}'", other)),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Zodiac {
    #[default]
    Tropical,
    Sidereal,
}

impl fmt::Display for Zodiac {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Zodiac::Tropical => write!(f, "Tropical"),
            Zodiac::Sidereal => write!(f, "Sidereal"),
        }
    }
}

impl FromStr for Zodiac {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Tropical" => Ok(Zodiac::Tropical),
            "Sidereal" => Ok(Zodiac::Sidereal),
            other => Err(format!("unknown zodiac '{}'", other)),
        }
    }
}

/// Ayanamsa selector for the sidereal zodiac. `None` keeps a zero offset.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Ayanamsa {
    #[default]
    None,
    Lahiri,
    FaganBradley,
    Krishnamurti,
}

impl Ayanamsa {
    /// Offset in degrees at the given instant: a J2000 base value advanced at
    /// the general precession rate (50.2888 arcsec per Julian year).
    pub fn offset_deg(&self, jd_ut: f64) -> f64 {
        const PRECESSION_DEG_PER_YEAR: f64 = 50.2888 / 3600.0;
        let years = (jd_ut - timeconv::J2000_JD) / 365.25;
        let base = match self {
            Ayanamsa::None => return 0.0,
            Ayanamsa::Lahiri => 23.8531,
            Ayanamsa::FaganBradley => 24.7366,
            Ayanamsa::Krishnamurti => 23.7625,
        };
        base + PRECESSION_DEG_PER_YEAR * years
    }
}

impl fmt::Display for Ayanamsa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Ayanamsa::None => "None",
            Ayanamsa::Lahiri => "Lahiri",
            Ayanamsa::FaganBradley => "FaganBradley",
            Ayanamsa::Krishnamurti => "Krishnamurti",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Ayanamsa {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "None" => Ok(Ayanamsa::None),
            "Lahiri" => Ok(Ayanamsa::Lahiri),
            "FaganBradley" => Ok(Ayanamsa::FaganBradley),
            "Krishnamurti" => Ok(Ayanamsa::Krishnamurti),
            other => Err(format!("unknown ayanamsa '{}'", other)),
        }
    }
}

/// Aspect catalog selector: the five classical aspects, optionally extended
/// with the minor ones.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectSet {
    Major,
    Minor,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn house_system_round_trip() {
        for hs in [
            HouseSystem::Placidus,
            HouseSystem::WholeSign,
            HouseSystem::Koch,
            HouseSystem::Equal,
        ] {
            assert_eq!(hs.to_string().parse::<HouseSystem>().unwrap(), hs);
        }
    }

    #[test]
    fn ayanamsa_none_is_zero() {
        assert_eq!(Ayanamsa::None.offset_deg(timeconv::J2000_JD), 0.0);
        assert_eq!(Ayanamsa::None.offset_deg(2_460_000.0), 0.0);
    }

    #[test]
    fn ayanamsa_grows_with_time() {
        let at_j2000 = Ayanamsa::Lahiri.offset_deg(timeconv::J2000_JD);
        let century_later = Ayanamsa::Lahiri.offset_deg(timeconv::J2000_JD + 36_525.0);
        assert!((at_j2000 - 23.8531).abs() < 1e-9);
        assert!(century_later > at_j2000 + 1.0);
        assert!(century_later < at_j2000 + 2.0);
    }
}
