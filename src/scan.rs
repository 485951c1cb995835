//! Ascendant boundary scanner.
//!
//! Diagnostic sweep over one civil day: find when the ascendant sits within
//! 2° of a sign boundary, or failing that, the first minute where it changes
//! sign. Recomputes the full chart at every sampled minute; correctness over
//! speed.

use log::debug;
use serde::Serialize;

use crate::chart::{self, ChartOptions, ResolvedContext};
use crate::ephemeris::Ephemeris;
use crate::error::EngineError;
use crate::timeconv;
use crate::zodiac::SignPosition;
use crate::{Ayanamsa, HouseSystem, Zodiac};

const MINUTES_PER_DAY: u32 = 1440;
const BOUNDARY_MARGIN_DEG: f64 = 2.0;

/// Scan parameters: a date, a resolved place, and the coarse step size.
#[derive(Debug, Clone)]
pub struct ScanRequest {
    pub birth_date: String,
    pub place: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timezone: Option<String>,
    /// Coarse sweep step; clamped to at least 1 minute.
    pub step_minutes: u32,
}

impl ScanRequest {
    pub fn new(birth_date: impl Into<String>, place: impl Into<String>) -> Self {
        ScanRequest {
            birth_date: birth_date.into(),
            place: place.into(),
            latitude: None,
            longitude: None,
            timezone: None,
            step_minutes: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanMode {
    NearBoundary,
    SignChange,
}

/// Scan outcome. `found = false` means the whole day produced neither a
/// near-boundary ascendant nor a sign change.
#[derive(Debug, Clone, Serialize)]
pub struct ScanResult {
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<ScanMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_local: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asc: Option<SignPosition>,
    /// Ascendant one minute before a sign change.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_asc: Option<SignPosition>,
}

impl ScanResult {
    fn not_found() -> Self {
        ScanResult { found: false, mode: None, time_local: None, asc: None, previous_asc: None }
    }
}

/// Sweep the day for the given resolved place.
///
/// `latitude`, `longitude`, and `timezone` must already be resolved; the
/// orchestrator does that once before calling here.
pub fn run(
    provider: &dyn Ephemeris,
    birth_date: &str,
    place: &str,
    latitude: f64,
    longitude: f64,
    timezone: &str,
    step_minutes: u32,
) -> Result<ScanResult, EngineError> {
    let step = step_minutes.max(1);

    // Coarse pass: first sample with the ascendant near a sign boundary.
    let mut minute = 0;
    while minute < MINUTES_PER_DAY {
        if let Some(asc) = ascendant_at(provider, birth_date, place, latitude, longitude, timezone, minute)? {
            if asc.deg <= BOUNDARY_MARGIN_DEG || asc.deg >= 30.0 - BOUNDARY_MARGIN_DEG {
                debug!("near-boundary ascendant at minute {}", minute);
                return Ok(ScanResult {
                    found: true,
                    mode: Some(ScanMode::NearBoundary),
                    time_local: Some(minute_to_hhmm(minute)),
                    asc: Some(asc),
                    previous_asc: None,
                });
            }
        }
        minute += step;
    }

    // Fine pass: first minute whose ascendant sign differs from the previous
    // minute's.
    let mut previous: Option<SignPosition> = None;
    for minute in 0..MINUTES_PER_DAY {
        let Some(asc) = ascendant_at(provider, birth_date, place, latitude, longitude, timezone, minute)?
        else {
            continue;
        };
        if let Some(prev) = previous {
            if prev.sign != asc.sign {
                return Ok(ScanResult {
                    found: true,
                    mode: Some(ScanMode::SignChange),
                    time_local: Some(minute_to_hhmm(minute)),
                    asc: Some(asc),
                    previous_asc: Some(prev),
                });
            }
        }
        previous = Some(asc);
    }

    Ok(ScanResult::not_found())
}

/// Full chart at one local minute; `None` when that wall-clock minute does
/// not exist (daylight-saving gap).
fn ascendant_at(
    provider: &dyn Ephemeris,
    birth_date: &str,
    place: &str,
    latitude: f64,
    longitude: f64,
    timezone: &str,
    minute: u32,
) -> Result<Option<SignPosition>, EngineError> {
    let time = match timeconv::resolve_local(birth_date, &minute_to_hhmm(minute), timezone) {
        Ok(time) => time,
        Err(EngineError::InvalidTimeInput(_)) => return Ok(None),
        Err(e) => return Err(e),
    };
    let ctx = ResolvedContext {
        place: place.to_string(),
        latitude,
        longitude,
        timezone: timezone.to_string(),
        time,
    };
    let options = ChartOptions {
        house_system: HouseSystem::Equal,
        zodiac: Zodiac::Tropical,
        ayanamsa: Ayanamsa::None,
        include_minor_aspects: false,
        time_approx: false,
    };
    let chart = chart::assemble(provider, &ctx, options)?;
    Ok(Some(chart.asc))
}

fn minute_to_hhmm(minute: u32) -> String {
    format!("{:02}:{:02}", minute / 60, minute % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ephemeris::TableEphemeris;

    #[test]
    fn minute_formatting() {
        assert_eq!(minute_to_hhmm(0), "00:00");
        assert_eq!(minute_to_hhmm(75), "01:15");
        assert_eq!(minute_to_hhmm(1439), "23:59");
    }

    #[test]
    fn a_full_day_finds_a_boundary() {
        // The ascendant sweeps the whole zodiac in a day, so a 5-minute sweep
        // (ascendant moves ~1.25° per step) must hit a 4°-wide window.
        let result = run(
            &TableEphemeris,
            "1990-06-15",
            "Santiago, Chile",
            -33.4378,
            -70.6505,
            "America/Santiago",
            5,
        )
        .unwrap();
        assert!(result.found);
        assert_eq!(result.mode, Some(ScanMode::NearBoundary));
        let asc = result.asc.unwrap();
        assert!(asc.deg <= 2.0 || asc.deg >= 28.0);
        assert!(result.time_local.is_some());
    }

    #[test]
    fn step_is_floored_at_one_minute() {
        let result = run(
            &TableEphemeris,
            "1990-06-15",
            "Santiago, Chile",
            -33.4378,
            -70.6505,
            "America/Santiago",
            0,
        )
        .unwrap();
        assert!(result.found);
    }

    #[test]
    fn mode_serializes_in_snake_case() {
        let json = serde_json::to_value(ScanMode::NearBoundary).unwrap();
        assert_eq!(json, "near_boundary");
        let json = serde_json::to_value(ScanMode::SignChange).unwrap();
        assert_eq!(json, "sign_change");
    }
}
