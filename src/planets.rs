//! Planetary position collection.
//!
//! Queries the ephemeris for every body in the fixed catalog. Bodies fail
//! independently: an unresolvable body is skipped with a warning, never
//! aborting the rest of the collection.

use log::warn;
use serde::Serialize;

use crate::ephemeris::{Body, Ephemeris};
use crate::zodiac::SignPosition;
use crate::{Ayanamsa, Zodiac};

/// One resolved body: sign placement plus motion state.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PlanetPosition {
    #[serde(flatten)]
    pub position: SignPosition,
    pub retro: bool,
    pub speed: f64,
}

/// Positions in catalog order plus warnings for any bodies that failed.
#[derive(Debug, Default)]
pub struct CollectedPositions {
    pub positions: Vec<(Body, PlanetPosition)>,
    pub warnings: Vec<String>,
}

impl CollectedPositions {
    pub fn get(&self, body: Body) -> Option<&PlanetPosition> {
        self.positions.iter().find(|(b, _)| *b == body).map(|(_, p)| p)
    }

    /// True when every catalog body resolved.
    pub fn complete(&self) -> bool {
        self.positions.len() == Body::ALL.len()
    }
}

/// Collect longitude, speed, and retrograde status for all tracked bodies.
pub fn collect(
    provider: &dyn Ephemeris,
    jd_ut: f64,
    zodiac: Zodiac,
    ayanamsa: Ayanamsa,
) -> CollectedPositions {
    let per_call_ayanamsa = match zodiac {
        Zodiac::Tropical => None,
        Zodiac::Sidereal => Some(ayanamsa),
    };

    let mut out = CollectedPositions::default();
    for body in Body::ALL {
        match provider.body_state(jd_ut, body, per_call_ayanamsa) {
            Ok(state) => {
                out.positions.push((
                    body,
                    PlanetPosition {
                        position: SignPosition::from_lon(state.longitude),
                        retro: state.speed_longitude < 0.0,
                        speed: state.speed_longitude,
                    },
                ));
            }
            Err(e) => {
                warn!("position unavailable for {}: {}", body, e);
                out.warnings.push(format!("{} position unavailable: {}", body, e));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ephemeris::{BodyState, EphemerisError, RawHouses};
    use crate::HouseSystem;

    /// Provider that fails for a chosen body and succeeds for the rest.
    struct OneBadBody(Body);

    impl Ephemeris for OneBadBody {
        fn body_state(
            &self,
            _jd_ut: f64,
            body: Body,
            _ayanamsa: Option<Ayanamsa>,
        ) -> Result<BodyState, EphemerisError> {
            if body == self.0 {
                return Err(EphemerisError::new(-3, "no data file"));
            }
            Ok(BodyState { longitude: 10.0 * body as u8 as f64, speed_longitude: 1.0 })
        }

        fn houses(
            &self,
            _jd_ut: f64,
            _latitude: f64,
            _longitude: f64,
            _system: HouseSystem,
        ) -> Result<RawHouses, EphemerisError> {
            unimplemented!("not used in these tests")
        }
    }

    #[test]
    fn one_failure_does_not_abort_the_rest() {
        let collected = collect(&OneBadBody(Body::Chiron), 2_451_545.0, Zodiac::Tropical, Ayanamsa::None);
        assert_eq!(collected.positions.len(), Body::ALL.len() - 1);
        assert!(collected.get(Body::Chiron).is_none());
        assert!(collected.get(Body::Sun).is_some());
        assert!(!collected.complete());

        assert_eq!(collected.warnings.len(), 1);
        assert!(collected.warnings[0].contains("Chiron"));
        assert!(collected.warnings[0].contains("no data file"));
    }

    #[test]
    fn collection_preserves_catalog_order() {
        let collected = collect(
            &crate::ephemeris::TableEphemeris,
            2_451_545.0,
            Zodiac::Tropical,
            Ayanamsa::None,
        );
        assert!(collected.complete());
        assert!(collected.warnings.is_empty());
        let order: Vec<Body> = collected.positions.iter().map(|(b, _)| *b).collect();
        assert_eq!(order, Body::ALL.to_vec());
    }

    #[test]
    fn retrograde_tracks_negative_speed() {
        let collected = collect(
            &crate::ephemeris::TableEphemeris,
            2_451_545.0,
            Zodiac::Tropical,
            Ayanamsa::None,
        );
        let node = collected.get(Body::MeanNode).unwrap();
        assert!(node.retro);
        let sun = collected.get(Body::Sun).unwrap();
        assert!(!sun.retro);
    }

    #[test]
    fn sidereal_mode_passes_the_ayanamsa_through() {
        let eph = crate::ephemeris::TableEphemeris;
        let tropical = collect(&eph, 2_451_545.0, Zodiac::Tropical, Ayanamsa::Lahiri);
        let sidereal = collect(&eph, 2_451_545.0, Zodiac::Sidereal, Ayanamsa::Lahiri);
        let t = tropical.get(Body::Sun).unwrap().position.lon;
        let s = sidereal.get(Body::Sun).unwrap().position.lon;
        // Tropical ignores the selector; sidereal applies it.
        assert!((t - s).rem_euclid(360.0) > 20.0);
    }
}
