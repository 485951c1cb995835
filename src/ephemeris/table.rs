//! Deterministic ephemeris built from mean orbital elements.
//!
//! Each body moves linearly at its mean daily rate from a J2000 epoch
//! longitude. Accuracy is a few degrees for the slow planets and worse for
//! the Moon, which is plenty for offline runs and for exercising the engine
//! without network access.

use crate::ephemeris::angles;
use crate::ephemeris::{Body, BodyState, Ephemeris, EphemerisError, RawHouses};
use crate::{Ayanamsa, HouseSystem};

const J2000_JD: f64 = 2_451_545.0;

/// (mean longitude at J2000.0, mean daily motion), degrees.
fn mean_elements(body: Body) -> (f64, f64) {
    match body {
        Body::Sun => (280.460, 0.985_647_4),
        Body::Moon => (218.316, 13.176_396),
        Body::Mercury => (252.251, 4.092_334_4),
        Body::Venus => (181.980, 1.602_130_2),
        Body::Mars => (355.433, 0.524_071_1),
        Body::Jupiter => (34.351, 0.083_091_2),
        Body::Saturn => (50.077, 0.033_459_7),
        Body::Uranus => (314.055, 0.011_725_8),
        Body::Neptune => (304.349, 0.005_995_1),
        Body::Pluto => (238.929, 0.003_968_6),
        Body::TrueNode | Body::MeanNode => (125.045, -0.052_953_9),
        Body::Chiron => (209.368, 0.019_543_0),
        Body::Lilith => (263.353, 0.111_404_1),
    }
}

/// Offline provider. Stateless and infallible for body positions.
#[derive(Debug, Default, Clone, Copy)]
pub struct TableEphemeris;

impl TableEphemeris {
    pub fn new() -> Self {
        TableEphemeris
    }
}

impl Ephemeris for TableEphemeris {
    fn body_state(
        &self,
        jd_ut: f64,
        body: Body,
        ayanamsa: Option<Ayanamsa>,
    ) -> Result<BodyState, EphemerisError> {
        let (epoch_lon, rate) = mean_elements(body);
        let offset = ayanamsa.map_or(0.0, |a| a.offset_deg(jd_ut));
        let longitude = (epoch_lon + rate * (jd_ut - J2000_JD) - offset).rem_euclid(360.0);
        Ok(BodyState { longitude, speed_longitude: rate })
    }

    fn houses(
        &self,
        jd_ut: f64,
        latitude: f64,
        longitude: f64,
        system: HouseSystem,
    ) -> Result<RawHouses, EphemerisError> {
        let raw = angles::compute_houses(jd_ut, latitude, longitude, system)?;
        // 12-element convention, houses 1..12 at indices 0..11
        Ok(RawHouses {
            cusps: raw.cusps[1..].to_vec(),
            asc: raw.asc,
            mc: raw.mc,
        })
    }
}
