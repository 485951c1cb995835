//! Ephemeris provider backed by the JPL Horizons web API.
//!
//! Horizons returns observer-table ephemerides as plain text inside a JSON
//! envelope; the table rows sit between the `$$SOE` and `$$EOE` markers. Each
//! row carries astrometric RA/Dec, which we convert to ecliptic longitude.
//! Longitudinal speed comes from a second sample one day later.
//!
//! The lunar nodes and the mean apogee (Lilith) have no Horizons body record,
//! so they are computed from their mean-element polynomials instead.

use log::debug;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;
use urlencoding::encode;

use crate::ephemeris::angles;
use crate::ephemeris::{Body, BodyState, Ephemeris, EphemerisError, RawHouses};
use crate::{Ayanamsa, HouseSystem};

const HORIZONS_URL: &str = "https://ssd.jpl.nasa.gov/api/horizons.api";
const J2000_JD: f64 = 2_451_545.0;

#[derive(Debug, Deserialize)]
struct HorizonsResponse {
    result: String,
}

pub struct HorizonsEphemeris {
    client: Client,
}

impl HorizonsEphemeris {
    pub fn new() -> Result<Self, EphemerisError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| EphemerisError::new(-1, format!("http client init failed: {}", e)))?;
        Ok(HorizonsEphemeris { client })
    }

    /// Geocentric ecliptic longitude of `body` at `jd_ut`, tropical frame.
    fn fetch_longitude(&self, jd_ut: f64, body: Body) -> Result<f64, EphemerisError> {
        let command = encode(body.horizons_id());
        let start = format!("'JD{:.6}'", jd_ut);
        let stop = format!("'JD{:.6}'", jd_ut + 0.0001);
        let url = format!(
            "{}?format=json&COMMAND={}&OBJ_DATA=NO&MAKE_EPHEM=YES&EPHEM_TYPE=OBSERVER\
             &CENTER={}&START_TIME={}&STOP_TIME={}&STEP_SIZE={}&QUANTITIES={}",
            HORIZONS_URL,
            command,
            encode("500@399"),
            encode(&start),
            encode(&stop),
            encode("'1m'"),
            encode("'1'"),
        );
        debug!("horizons query for {} at jd {}", body, jd_ut);

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| EphemerisError::new(-1, format!("horizons request failed: {}", e)))?;
        if !response.status().is_success() {
            return Err(EphemerisError::new(
                -1,
                format!("horizons returned status {}", response.status()),
            ));
        }
        let payload: HorizonsResponse = response
            .json()
            .map_err(|e| EphemerisError::new(-1, format!("horizons response malformed: {}", e)))?;

        parse_ephem_longitude(&payload.result)
            .ok_or_else(|| EphemerisError::new(-1, format!("no ephemeris rows for {}", body)))
    }
}

impl Ephemeris for HorizonsEphemeris {
    fn body_state(
        &self,
        jd_ut: f64,
        body: Body,
        ayanamsa: Option<Ayanamsa>,
    ) -> Result<BodyState, EphemerisError> {
        let (lon_now, lon_next) = match body {
            Body::TrueNode | Body::MeanNode => {
                (mean_node_deg(jd_ut), mean_node_deg(jd_ut + 1.0))
            }
            Body::Lilith => (mean_apogee_deg(jd_ut), mean_apogee_deg(jd_ut + 1.0)),
            _ => (
                self.fetch_longitude(jd_ut, body)?,
                self.fetch_longitude(jd_ut + 1.0, body)?,
            ),
        };

        let offset = ayanamsa.map_or(0.0, |a| a.offset_deg(jd_ut));
        let longitude = (lon_now - offset).rem_euclid(360.0);
        let speed_longitude = signed_arc(lon_now, lon_next);
        Ok(BodyState { longitude, speed_longitude })
    }

    fn houses(
        &self,
        jd_ut: f64,
        latitude: f64,
        longitude: f64,
        system: HouseSystem,
    ) -> Result<RawHouses, EphemerisError> {
        angles::compute_houses(jd_ut, latitude, longitude, system)
    }
}

/// First data row between `$$SOE` and `$$EOE`, RA/Dec converted to ecliptic
/// longitude in degrees.
fn parse_ephem_longitude(result: &str) -> Option<f64> {
    let lines: Vec<&str> = result.lines().collect();
    let soe = lines.iter().position(|l| l.contains("$$SOE"))?;
    let eoe = lines.iter().position(|l| l.contains("$$EOE"))?;

    for line in &lines[soe + 1..eoe] {
        // Row shape: date, time, RA h m s, Dec sign+d m s, ...
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 8 {
            continue;
        }
        let ra_deg = parse_hms_to_deg(parts[2], parts[3], parts[4])?;
        let dec_deg = parse_dms_to_deg(parts[5], parts[6], parts[7])?;
        return Some(equatorial_to_ecliptic_lon_deg(ra_deg, dec_deg));
    }
    None
}

fn parse_hms_to_deg(h: &str, m: &str, s: &str) -> Option<f64> {
    let h: f64 = h.parse().ok()?;
    let m: f64 = m.parse().ok()?;
    let s: f64 = s.parse().ok()?;
    Some((h + m / 60.0 + s / 3600.0) * 15.0)
}

fn parse_dms_to_deg(d: &str, m: &str, s: &str) -> Option<f64> {
    let negative = d.starts_with('-');
    let d: f64 = d.trim_start_matches(['+', '-']).parse().ok()?;
    let m: f64 = m.parse().ok()?;
    let s: f64 = s.parse().ok()?;
    let value = d + m / 60.0 + s / 3600.0;
    Some(if negative { -value } else { value })
}

/// `tan λ = (sin α · cos ε + tan δ · sin ε) / cos α`
fn equatorial_to_ecliptic_lon_deg(ra_deg: f64, dec_deg: f64) -> f64 {
    let eps = angles::OBLIQUITY_J2000_RAD;
    let ra = ra_deg.to_radians();
    let dec = dec_deg.to_radians();
    let lambda = (ra.sin() * eps.cos() + dec.tan() * eps.sin()).atan2(ra.cos());
    lambda.to_degrees().rem_euclid(360.0)
}

/// Mean ascending lunar node (Meeus 47.7), degrees. Retrograde ~0.053°/day.
fn mean_node_deg(jd_ut: f64) -> f64 {
    let t = (jd_ut - J2000_JD) / 36_525.0;
    let omega = 125.044_52 - 1_934.136_261 * t + 0.002_070_8 * t * t
        + t * t * t / 450_000.0;
    omega.rem_euclid(360.0)
}

/// Mean lunar apogee ("Black Moon Lilith"), degrees. Direct ~0.111°/day.
fn mean_apogee_deg(jd_ut: f64) -> f64 {
    let t = (jd_ut - J2000_JD) / 36_525.0;
    // Mean perigee (Meeus): apogee = perigee + 180°
    let perigee = 83.353_246_4 + 4_069.013_723_2 * t - 0.010_318_0 * t * t
        - t * t * t / 80_053.0;
    (perigee + 180.0).rem_euclid(360.0)
}

/// Daily motion from two longitudes one day apart, wrapped to (-180, 180].
fn signed_arc(from: f64, to: f64) -> f64 {
    let mut d = (to - from).rem_euclid(360.0);
    if d > 180.0 {
        d -= 360.0;
    }
    d
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn parses_soe_block() {
        let result = "header\n$$SOE\n 2024-Oct-07 12:00     10 15 30.00 +20 30 40.0  extra\n$$EOE\ntrailer";
        let lon = parse_ephem_longitude(result).unwrap();
        assert!((0.0..360.0).contains(&lon));
    }

    #[test]
    fn missing_markers_yield_none() {
        assert!(parse_ephem_longitude("no data here").is_none());
        assert!(parse_ephem_longitude("$$SOE\nonly start").is_none());
    }

    #[test]
    fn negative_declination_parses() {
        let dec = parse_dms_to_deg("-05", "30", "00").unwrap();
        assert_relative_eq!(dec, -5.5, epsilon = 1e-9);
    }

    #[test]
    fn ecliptic_conversion_fixed_points() {
        // A body on the equator at RA 0 sits at ecliptic longitude 0
        assert_relative_eq!(equatorial_to_ecliptic_lon_deg(0.0, 0.0), 0.0, epsilon = 1e-9);
        // RA 90° with the ecliptic's own declination maps to 90°
        let dec = angles::OBLIQUITY_J2000_RAD.to_degrees();
        assert_relative_eq!(equatorial_to_ecliptic_lon_deg(90.0, dec), 90.0, epsilon = 1e-6);
    }

    #[test]
    fn mean_node_regresses() {
        let now = mean_node_deg(J2000_JD);
        let later = signed_arc(now, mean_node_deg(J2000_JD + 1.0));
        assert!(later < 0.0, "node speed {} should be retrograde", later);
        assert!(later > -0.06);
    }

    #[test]
    fn mean_apogee_advances() {
        let speed = signed_arc(mean_apogee_deg(J2000_JD), mean_apogee_deg(J2000_JD + 1.0));
        assert!(speed > 0.10 && speed < 0.12, "apogee speed {}", speed);
    }

    #[test]
    fn signed_arc_wraps() {
        assert_relative_eq!(signed_arc(359.0, 1.0), 2.0, epsilon = 1e-9);
        assert_relative_eq!(signed_arc(1.0, 359.0), -2.0, epsilon = 1e-9);
    }
}
