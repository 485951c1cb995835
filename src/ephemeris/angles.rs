//! Spherical astronomy for chart angles and house cusps.
//!
//! Implements the standard formulas for Greenwich/local sidereal time, the
//! ecliptic longitudes of the Ascendant and Midheaven, and the Equal,
//! Placidus, and Koch house divisions.
//!
//! Sources: Meeus, "Astronomical Algorithms" (2nd ed) Ch. 12-13;
//! Capitaine et al. 2003 for the GMST polynomial; standard spherical
//! astronomy (Montenbruck & Pfleger) for semi-arc house division.

use std::f64::consts::{PI, TAU};

use crate::ephemeris::{EphemerisError, RawHouses};
use crate::HouseSystem;

/// Mean obliquity of the ecliptic at J2000.0 (23.4392911°), radians.
pub const OBLIQUITY_J2000_RAD: f64 = 0.409_092_804_222_329_3;

/// Maximum |latitude| (degrees) at which the time-based house systems
/// (Placidus, Koch) are defined.
pub const MAX_LATITUDE_DEG: f64 = 66.5;

const ARCSEC_TO_RAD: f64 = PI / (180.0 * 3600.0);
const J2000_JD: f64 = 2_451_545.0;

/// Earth Rotation Angle at a UT1 Julian Date (IERS Conventions 2010, Eq. 5.15).
pub fn earth_rotation_angle_rad(jd_ut1: f64) -> f64 {
    let du = jd_ut1 - J2000_JD;
    let theta = TAU * (0.779_057_273_264_0 + 1.002_737_811_911_354_6 * du);
    theta.rem_euclid(TAU)
}

/// Greenwich Mean Sidereal Time, radians in [0, 2π).
///
/// GMST = ERA + polynomial(T) with T in Julian centuries from J2000.0
/// (Capitaine et al. 2003, Table 2). UT is treated as UT1; the difference
/// is below a second and irrelevant at chart precision.
pub fn gmst_rad(jd_ut: f64) -> f64 {
    let era = earth_rotation_angle_rad(jd_ut);
    let t = (jd_ut - J2000_JD) / 36_525.0;
    let t2 = t * t;
    let t3 = t2 * t;
    let t4 = t3 * t;
    let t5 = t4 * t;

    let poly_arcsec = 0.014506 + 4612.156534 * t + 1.3915817 * t2 - 0.00000044 * t3
        - 0.000029956 * t4
        - 0.0000000368 * t5;

    (era + poly_arcsec * ARCSEC_TO_RAD).rem_euclid(TAU)
}

/// Local sidereal time for an observer at `longitude_deg` (east positive).
pub fn lst_rad(jd_ut: f64, longitude_deg: f64) -> f64 {
    (gmst_rad(jd_ut) + longitude_deg.to_radians()).rem_euclid(TAU)
}

/// Ascendant ecliptic longitude for a given local sidereal time (= RAMC).
///
/// `Asc = atan2(cos(RAMC), -(sin(RAMC)·cos(ε) + tan(φ)·sin(ε)))`
///
/// Quadrant check: at the equator with RAMC = 0 the Ascendant is 90°
/// (Aries culminating, Cancer rising).
pub fn ascendant_rad(ramc: f64, lat_rad: f64, eps: f64) -> f64 {
    f64::atan2(
        ramc.cos(),
        -(ramc.sin() * eps.cos() + lat_rad.tan() * eps.sin()),
    )
    .rem_euclid(TAU)
}

/// Midheaven ecliptic longitude: `MC = atan2(sin(RAMC), cos(RAMC)·cos(ε))`.
pub fn midheaven_rad(ramc: f64, eps: f64) -> f64 {
    f64::atan2(ramc.sin(), ramc.cos() * eps.cos()).rem_euclid(TAU)
}

/// Compute cusps and angles for the given instant, observer, and system.
///
/// Returned cusps follow the 13-element convention: index 0 is a placeholder,
/// houses 1..12 sit at indices 1..12. Placidus and Koch refuse latitudes
/// beyond [`MAX_LATITUDE_DEG`].
pub fn compute_houses(
    jd_ut: f64,
    latitude_deg: f64,
    longitude_deg: f64,
    system: HouseSystem,
) -> Result<RawHouses, EphemerisError> {
    let ramc = lst_rad(jd_ut, longitude_deg);
    let lat_rad = latitude_deg.to_radians();
    let eps = OBLIQUITY_J2000_RAD;

    let asc = ascendant_rad(ramc, lat_rad, eps).to_degrees();
    let mc = midheaven_rad(ramc, eps).to_degrees();

    let cusps = match system {
        HouseSystem::Equal => equal_cusps(asc),
        // WholeSign angles come from the Placidus call; cusp synthesis
        // happens downstream from the ascendant sign.
        HouseSystem::Placidus | HouseSystem::WholeSign => {
            check_latitude(latitude_deg, "Placidus")?;
            placidus_cusps(asc, mc, ramc, lat_rad, eps)
        }
        HouseSystem::Koch => {
            check_latitude(latitude_deg, "Koch")?;
            koch_cusps(asc, mc, ramc, lat_rad, eps)
        }
    };

    let mut out = Vec::with_capacity(13);
    out.push(0.0); // placeholder, houses are 1-indexed
    out.extend_from_slice(&cusps);

    Ok(RawHouses { cusps: out, asc, mc })
}

fn check_latitude(latitude_deg: f64, system: &str) -> Result<(), EphemerisError> {
    if latitude_deg.abs() > MAX_LATITUDE_DEG {
        return Err(EphemerisError::new(
            -2,
            format!(
                "latitude {:.4} exceeds the {}° limit for {} houses",
                latitude_deg, MAX_LATITUDE_DEG, system
            ),
        ));
    }
    Ok(())
}

/// Equal division: cusp k = Asc + (k-1)·30°.
fn equal_cusps(asc_deg: f64) -> [f64; 12] {
    let mut cusps = [0.0; 12];
    for (i, cusp) in cusps.iter_mut().enumerate() {
        *cusp = (asc_deg + 30.0 * i as f64).rem_euclid(360.0);
    }
    cusps
}

/// Placidus: intermediate cusps by iterative trisection of the diurnal
/// semi-arc on either side of the meridian; the lower hemisphere cusps are
/// the opposites of the upper ones.
fn placidus_cusps(
    asc_deg: f64,
    mc_deg: f64,
    ramc: f64,
    lat_rad: f64,
    eps: f64,
) -> [f64; 12] {
    let mut cusps = [0.0; 12];
    cusps[0] = asc_deg;
    cusps[3] = (mc_deg + 180.0).rem_euclid(360.0);
    cusps[6] = (asc_deg + 180.0).rem_euclid(360.0);
    cusps[9] = mc_deg;

    // East of the meridian: houses 11, 12
    cusps[10] = placidus_cusp(ramc, lat_rad, eps, 1.0 / 3.0, 1.0);
    cusps[11] = placidus_cusp(ramc, lat_rad, eps, 2.0 / 3.0, 1.0);
    // West of the meridian: houses 9, 8
    cusps[8] = placidus_cusp(ramc, lat_rad, eps, 1.0 / 3.0, -1.0);
    cusps[7] = placidus_cusp(ramc, lat_rad, eps, 2.0 / 3.0, -1.0);

    // Opposites below the horizon
    cusps[4] = (cusps[10] + 180.0).rem_euclid(360.0);
    cusps[5] = (cusps[11] + 180.0).rem_euclid(360.0);
    cusps[1] = (cusps[7] + 180.0).rem_euclid(360.0);
    cusps[2] = (cusps[8] + 180.0).rem_euclid(360.0);

    cusps
}

/// One Placidus cusp: solve `RA = RAMC + dir·frac·SA(dec(RA))` by fixed-point
/// iteration, then project the equatorial point to the ecliptic.
fn placidus_cusp(ramc: f64, lat_rad: f64, eps: f64, fraction: f64, dir: f64) -> f64 {
    let mut ra = ramc + dir * fraction * PI / 2.0;
    for _ in 0..50 {
        let dec = (eps.sin() * ra.sin()).asin();
        let new_ra = ramc + dir * fraction * semi_arc_rad(dec, lat_rad, true);
        if (new_ra - ra).abs() < 1e-10 {
            ra = new_ra;
            break;
        }
        ra = new_ra;
    }
    equator_to_ecliptic_deg(ra, eps)
}

/// Koch ("birthplace"): the MC degree's diurnal semi-arc is trisected and
/// each division instant's ascendant becomes a cusp.
fn koch_cusps(asc_deg: f64, mc_deg: f64, ramc: f64, lat_rad: f64, eps: f64) -> [f64; 12] {
    let dec_mc = (eps.sin() * ramc.sin()).asin();
    let sa_d = semi_arc_rad(dec_mc, lat_rad, true);
    let sa_n = PI - sa_d;

    let asc_at = |x: f64| ascendant_rad(x, lat_rad, eps).to_degrees();

    let mut cusps = [0.0; 12];
    cusps[0] = asc_deg;
    cusps[3] = (mc_deg + 180.0).rem_euclid(360.0);
    cusps[6] = (asc_deg + 180.0).rem_euclid(360.0);
    cusps[9] = mc_deg;

    cusps[10] = asc_at(ramc - PI / 2.0 + sa_d / 3.0);
    cusps[11] = asc_at(ramc - PI / 2.0 + 2.0 * sa_d / 3.0);
    cusps[1] = asc_at(ramc - PI / 2.0 + sa_d + sa_n / 3.0);
    cusps[2] = asc_at(ramc - PI / 2.0 + sa_d + 2.0 * sa_n / 3.0);

    cusps[4] = (cusps[10] + 180.0).rem_euclid(360.0);
    cusps[5] = (cusps[11] + 180.0).rem_euclid(360.0);
    cusps[7] = (cusps[1] + 180.0).rem_euclid(360.0);
    cusps[8] = (cusps[2] + 180.0).rem_euclid(360.0);

    cusps
}

/// Diurnal (or nocturnal) semi-arc: `acos(-tan(dec)·tan(lat))`, clamped.
fn semi_arc_rad(dec: f64, lat_rad: f64, diurnal: bool) -> f64 {
    let cos_ha = -(dec.tan() * lat_rad.tan());
    let ha = cos_ha.clamp(-1.0, 1.0).acos();
    if diurnal {
        ha
    } else {
        PI - ha
    }
}

/// Ecliptic longitude of the equatorial point at right ascension `ra` whose
/// declination is induced by the ecliptic (`dec = asin(sin ε · sin RA)`).
fn equator_to_ecliptic_deg(ra: f64, eps: f64) -> f64 {
    let dec = (eps.sin() * ra.sin()).asin();
    let sin_lon = ra.sin() * eps.cos() + dec.tan() * eps.sin();
    f64::atan2(sin_lon, ra.cos()).rem_euclid(TAU).to_degrees()
}
