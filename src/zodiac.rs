//! Ecliptic longitude → zodiac sign and degree-within-sign.

use std::fmt;

use serde::Serialize;

/// The twelve signs in canonical order, each spanning 30° of the ecliptic.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum ZodiacSign {
    Aries = 0,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

impl ZodiacSign {
    pub const ALL: [ZodiacSign; 12] = [
        ZodiacSign::Aries,
        ZodiacSign::Taurus,
        ZodiacSign::Gemini,
        ZodiacSign::Cancer,
        ZodiacSign::Leo,
        ZodiacSign::Virgo,
        ZodiacSign::Libra,
        ZodiacSign::Scorpio,
        ZodiacSign::Sagittarius,
        ZodiacSign::Capricorn,
        ZodiacSign::Aquarius,
        ZodiacSign::Pisces,
    ];

    /// Sign containing the given ecliptic longitude. Total over all reals;
    /// negative and ≥360° inputs wrap via `rem_euclid`.
    pub fn from_longitude(longitude: f64) -> Self {
        let normalized = longitude.rem_euclid(360.0);
        let idx = (normalized / 30.0).floor() as usize;
        // idx is 0..=11; 360.0 itself reduces to 0.0
        Self::ALL[idx.min(11)]
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn name(&self) -> &'static str {
        match self {
            ZodiacSign::Aries => "Aries",
            ZodiacSign::Taurus => "Taurus",
            ZodiacSign::Gemini => "Gemini",
            ZodiacSign::Cancer => "Cancer",
            ZodiacSign::Leo => "Leo",
            ZodiacSign::Virgo => "Virgo",
            ZodiacSign::Libra => "Libra",
            ZodiacSign::Scorpio => "Scorpio",
            ZodiacSign::Sagittarius => "Sagittarius",
            ZodiacSign::Capricorn => "Capricorn",
            ZodiacSign::Aquarius => "Aquarius",
            ZodiacSign::Pisces => "Pisces",
        }
    }
}

impl fmt::Display for ZodiacSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A normalized point on the ecliptic: sign, degree within the sign (two
/// decimals), and the reduced longitude in [0, 360).
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct SignPosition {
    pub sign: ZodiacSign,
    pub deg: f64,
    pub lon: f64,
}

impl SignPosition {
    pub fn from_lon(longitude: f64) -> Self {
        let lon = longitude.rem_euclid(360.0);
        let sign = ZodiacSign::from_longitude(lon);
        let deg = round2(lon - 30.0 * sign.index() as f64);
        SignPosition { sign, deg, lon }
    }
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
