//! House cusps and chart angles.
//!
//! Wraps the ephemeris provider's house call, normalizes its cusp index
//! convention, applies the sidereal offset when one is in force, and handles
//! the whole-sign derivation (which reuses the Placidus angles but rebuilds
//! the cusps from the ascendant's sign).

use crate::ephemeris::Ephemeris;
use crate::error::EngineError;
use crate::zodiac::{SignPosition, ZodiacSign};
use crate::HouseSystem;

/// Twelve cusps (house 1 at index 0) plus the two chart angles, all
/// normalized to sign positions.
#[derive(Debug, Clone)]
pub struct ResolvedHouses {
    pub cusps: [SignPosition; 12],
    pub asc: SignPosition,
    pub mc: SignPosition,
}

/// Resolve cusps and angles for one instant and observer.
///
/// `sidereal_offset_deg` is subtracted from every longitude before sign
/// normalization; pass 0.0 for the tropical zodiac.
pub fn resolve(
    provider: &dyn Ephemeris,
    jd_ut: f64,
    latitude: f64,
    longitude: f64,
    system: HouseSystem,
    sidereal_offset_deg: f64,
) -> Result<ResolvedHouses, EngineError> {
    // WholeSign keeps the Placidus angles; only the cusps differ.
    let provider_system = match system {
        HouseSystem::WholeSign => HouseSystem::Placidus,
        other => other,
    };

    let raw = provider
        .houses(jd_ut, latitude, longitude, provider_system)
        .map_err(|e| EngineError::HouseComputation(e.to_string()))?;

    let cusp_slice = normalize_cusp_slice(&raw.cusps)?;

    let asc = SignPosition::from_lon(raw.asc - sidereal_offset_deg);
    let mc = SignPosition::from_lon(raw.mc - sidereal_offset_deg);

    let cusps = match system {
        HouseSystem::WholeSign => whole_sign_cusps(asc.sign),
        _ => {
            let mut cusps = [SignPosition::from_lon(0.0); 12];
            for (i, &lon) in cusp_slice.iter().enumerate() {
                cusps[i] = SignPosition::from_lon(lon - sidereal_offset_deg);
            }
            cusps
        }
    };

    Ok(ResolvedHouses { cusps, asc, mc })
}

/// Accept either a 12-element sequence (house 1 at index 0) or a 13-element
/// one with a placeholder at index 0, returning houses 1..12 in order.
fn normalize_cusp_slice(cusps: &[f64]) -> Result<&[f64], EngineError> {
    match cusps.len() {
        12 => Ok(cusps),
        13 => Ok(&cusps[1..]),
        n => Err(EngineError::HouseComputation(format!(
            "provider returned {} cusps, expected 12 or 13",
            n
        ))),
    }
}

/// House k starts at 0° of the sign (k-1) places after the ascendant's sign.
fn whole_sign_cusps(asc_sign: ZodiacSign) -> [SignPosition; 12] {
    let mut cusps = [SignPosition::from_lon(0.0); 12];
    let start = asc_sign.index();
    for (k, cusp) in cusps.iter_mut().enumerate() {
        let sign_index = (start + k) % 12;
        *cusp = SignPosition::from_lon(30.0 * sign_index as f64);
    }
    cusps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ephemeris::TableEphemeris;
    use approx::assert_relative_eq;

    const JD: f64 = 2_448_058.270_833; // 1990-06-15 18:30 UT

    #[test]
    fn twelve_and_thirteen_element_conventions_agree() {
        let twelve: Vec<f64> = (0..12).map(|i| 30.0 * i as f64).collect();
        let mut thirteen = vec![0.0];
        thirteen.extend_from_slice(&twelve);

        let a = normalize_cusp_slice(&twelve).unwrap();
        let b = normalize_cusp_slice(&thirteen).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn wrong_cusp_count_is_a_computation_error() {
        let err = normalize_cusp_slice(&[0.0; 7]).unwrap_err();
        assert_eq!(err.kind().as_str(), "server_error");
    }

    #[test]
    fn equal_houses_start_at_the_ascendant() {
        let eph = TableEphemeris;
        let resolved = resolve(&eph, JD, -33.45, -70.67, HouseSystem::Equal, 0.0).unwrap();
        assert_relative_eq!(resolved.cusps[0].lon, resolved.asc.lon, epsilon = 1e-9);
        for i in 0..12 {
            let next = resolved.cusps[(i + 1) % 12].lon;
            let arc = (next - resolved.cusps[i].lon).rem_euclid(360.0);
            assert_relative_eq!(arc, 30.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn whole_sign_cusps_cover_all_signs_at_zero_degrees() {
        let eph = TableEphemeris;
        let resolved = resolve(&eph, JD, -33.45, -70.67, HouseSystem::WholeSign, 0.0).unwrap();

        assert_eq!(resolved.cusps[0].sign, resolved.asc.sign);
        let mut seen = [false; 12];
        for cusp in &resolved.cusps {
            assert_eq!(cusp.deg, 0.0);
            assert!(!seen[cusp.sign.index()], "sign repeated");
            seen[cusp.sign.index()] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn whole_sign_keeps_the_placidus_angles() {
        let eph = TableEphemeris;
        let placidus = resolve(&eph, JD, -33.45, -70.67, HouseSystem::Placidus, 0.0).unwrap();
        let whole = resolve(&eph, JD, -33.45, -70.67, HouseSystem::WholeSign, 0.0).unwrap();
        assert_relative_eq!(whole.asc.lon, placidus.asc.lon, epsilon = 1e-9);
        assert_relative_eq!(whole.mc.lon, placidus.mc.lon, epsilon = 1e-9);
    }

    #[test]
    fn polar_placidus_propagates_as_house_computation() {
        let eph = TableEphemeris;
        let err = resolve(&eph, JD, 89.0, 0.0, HouseSystem::Placidus, 0.0).unwrap_err();
        assert!(matches!(err, EngineError::HouseComputation(_)));
    }

    #[test]
    fn sidereal_offset_shifts_every_longitude() {
        let eph = TableEphemeris;
        let tropical = resolve(&eph, JD, -33.45, -70.67, HouseSystem::Equal, 0.0).unwrap();
        let sidereal = resolve(&eph, JD, -33.45, -70.67, HouseSystem::Equal, 24.0).unwrap();
        let diff = (tropical.asc.lon - sidereal.asc.lon).rem_euclid(360.0);
        assert_relative_eq!(diff, 24.0, epsilon = 1e-9);
    }
}
