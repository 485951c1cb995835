//! Pairwise aspect detection.
//!
//! Every unordered pair of resolved bodies is tested against the catalog in
//! a fixed order; the first entry within orb wins and later entries are not
//! considered for that pair. This is deliberate: a separation inside two
//! overlapping tolerance windows resolves to the earlier catalog entry, not
//! the smaller orb.

use serde::Serialize;

use crate::ephemeris::Body;
use crate::planets::CollectedPositions;
use crate::zodiac::round2;

/// (name, exact angle, maximum orb)
const MAJOR_ASPECTS: &[(&str, f64, f64)] = &[
    ("conjunction", 0.0, 8.0),
    ("sextile", 60.0, 6.0),
    ("square", 90.0, 8.0),
    ("trine", 120.0, 8.0),
    ("opposition", 180.0, 8.0),
];

const MINOR_ASPECTS: &[(&str, f64, f64)] = &[
    ("quincunx", 150.0, 6.0),
    ("semisquare", 45.0, 6.0),
    ("sesquisquare", 135.0, 6.0),
    ("quintile", 72.0, 6.0),
];

/// A detected aspect between two bodies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aspect {
    pub a: &'static str,
    pub b: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Absolute deviation from the exact angle, two decimals.
    pub orb: f64,
}

/// Angular separation of two longitudes, normalized into [0, 180].
pub fn separation_deg(lon_a: f64, lon_b: f64) -> f64 {
    ((lon_a - lon_b + 180.0).rem_euclid(360.0) - 180.0).abs()
}

/// Detect aspects over all unordered pairs, in catalog-enumeration order.
pub fn detect(positions: &CollectedPositions, include_minor: bool) -> Vec<Aspect> {
    let catalog: Vec<&(&str, f64, f64)> = if include_minor {
        MAJOR_ASPECTS.iter().chain(MINOR_ASPECTS.iter()).collect()
    } else {
        MAJOR_ASPECTS.iter().collect()
    };

    let mut aspects = Vec::new();
    // Pair order follows the fixed body catalog, not insertion happenstance.
    for (i, &body_a) in Body::ALL.iter().enumerate() {
        let Some(pos_a) = positions.get(body_a) else { continue };
        for &body_b in &Body::ALL[i + 1..] {
            let Some(pos_b) = positions.get(body_b) else { continue };
            let separation = separation_deg(pos_a.position.lon, pos_b.position.lon);

            for &&(name, exact, max_orb) in &catalog {
                let orb = (separation - exact).abs();
                if orb <= max_orb {
                    aspects.push(Aspect {
                        a: body_a.name(),
                        b: body_b.name(),
                        kind: name,
                        orb: round2(orb),
                    });
                    break;
                }
            }
        }
    }
    aspects
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planets::PlanetPosition;
    use crate::zodiac::SignPosition;
    use approx::assert_relative_eq;

    fn positions(entries: &[(Body, f64)]) -> CollectedPositions {
        let mut out = CollectedPositions::default();
        for &(body, lon) in entries {
            out.positions.push((
                body,
                PlanetPosition {
                    position: SignPosition::from_lon(lon),
                    retro: false,
                    speed: 1.0,
                },
            ));
        }
        out
    }

    #[test]
    fn separation_is_symmetric_and_bounded() {
        let cases = [(10.0, 350.0), (0.0, 180.0), (359.0, 1.0), (123.4, 321.9)];
        for (a, b) in cases {
            let s = separation_deg(a, b);
            assert!((0.0..=180.0).contains(&s));
            assert_relative_eq!(s, separation_deg(b, a), epsilon = 1e-12);
        }
        assert_relative_eq!(separation_deg(10.0, 350.0), 20.0, epsilon = 1e-12);
    }

    #[test]
    fn exact_square_has_zero_orb() {
        let pos = positions(&[(Body::Sun, 10.0), (Body::Moon, 100.0)]);
        let aspects = detect(&pos, false);
        assert_eq!(aspects.len(), 1);
        assert_eq!(aspects[0].kind, "square");
        assert_eq!(aspects[0].orb, 0.0);
    }

    #[test]
    fn first_match_wins_over_smaller_orb() {
        // Separation 66.0 is 6.0 from sextile (60) and 6.0 from quintile
        // (72), both at their window limits. Sextile is listed first.
        let pos = positions(&[(Body::Sun, 0.0), (Body::Moon, 66.0)]);
        let aspects = detect(&pos, true);
        assert_eq!(aspects.len(), 1);
        assert_eq!(aspects[0].kind, "sextile");
        assert_relative_eq!(aspects[0].orb, 6.0, epsilon = 1e-9);
    }

    #[test]
    fn orb_at_window_edge_is_included() {
        // Separation 8.0 is exactly at conjunction's max orb.
        let pos = positions(&[(Body::Sun, 100.0), (Body::Moon, 108.0)]);
        let aspects = detect(&pos, true);
        assert_eq!(aspects.len(), 1);
        assert_eq!(aspects[0].kind, "conjunction");
    }

    #[test]
    fn minor_aspects_require_the_minor_set() {
        let pos = positions(&[(Body::Sun, 0.0), (Body::Moon, 150.0)]);
        assert!(detect(&pos, false).is_empty());
        let with_minor = detect(&pos, true);
        assert_eq!(with_minor.len(), 1);
        assert_eq!(with_minor[0].kind, "quincunx");
    }

    #[test]
    fn no_aspect_outside_every_window() {
        // 25° is far from every catalog angle.
        let pos = positions(&[(Body::Sun, 0.0), (Body::Moon, 25.0)]);
        assert!(detect(&pos, true).is_empty());
    }

    #[test]
    fn detection_is_idempotent_and_ordered() {
        let pos = positions(&[
            (Body::Sun, 0.0),
            (Body::Moon, 90.0),
            (Body::Mercury, 120.0),
            (Body::Venus, 180.0),
        ]);
        let first = detect(&pos, false);
        let second = detect(&pos, false);
        assert_eq!(first, second);

        // Pairs enumerate in catalog order: Sun pairs first, then Moon pairs.
        assert_eq!(first[0].a, "Sun");
        let sun_pairs = first.iter().take_while(|a| a.a == "Sun").count();
        assert!(sun_pairs >= 2);
    }

    #[test]
    fn orb_rounds_to_two_decimals() {
        let pos = positions(&[(Body::Sun, 0.0), (Body::Moon, 91.234_567)]);
        let aspects = detect(&pos, false);
        assert_eq!(aspects[0].orb, 1.23);
    }
}
