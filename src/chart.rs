//! Chart assembly: one resolved instant and place in, one chart record out.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::aspects::{self, Aspect};
use crate::ephemeris::{Body, Ephemeris};
use crate::error::EngineError;
use crate::houses;
use crate::planets::{self, PlanetPosition};
use crate::timeconv::TimeContext;
use crate::zodiac::SignPosition;
use crate::{Ayanamsa, HouseSystem, Zodiac};

/// Coordinates, timezone, and normalized time for one request. Built once by
/// the orchestrator and immutable afterwards.
#[derive(Debug, Clone)]
pub struct ResolvedContext {
    pub place: String,
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,
    pub time: TimeContext,
}

/// Echoed request configuration plus the resolved place and instant.
#[derive(Debug, Clone, Serialize)]
pub struct ChartMeta {
    pub place: String,
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,
    pub utc_offset_minutes: i32,
    pub dst: bool,
    pub local_time: String,
    pub utc_time: String,
    /// The system actually used, which the fallback path may change.
    pub house_system: HouseSystem,
    pub zodiac: Zodiac,
    pub ayanamsa: Ayanamsa,
}

/// Advisory flags derived during assembly.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ChartFlags {
    /// Echo of the caller's approximate-time input.
    pub time_approx: bool,
    /// Ascendant within 2° of a sign boundary; small clock errors may move
    /// the rising sign.
    pub asc_near_sign_boundary: bool,
    /// |latitude| ≥ 66°: several house systems are ill-conditioned.
    pub house_system_warning: bool,
    /// False when any tracked body failed to resolve.
    pub ephemeris_files_ok: bool,
}

/// One house cusp in the twelve-entry set.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct HouseEntry {
    pub house: u8,
    #[serde(flatten)]
    pub cusp: SignPosition,
}

/// The full chart record returned to the caller.
#[derive(Debug, Serialize)]
pub struct ChartResult {
    pub meta: ChartMeta,
    pub asc: SignPosition,
    pub mc: SignPosition,
    pub houses: Vec<HouseEntry>,
    #[serde(serialize_with = "planets_as_map")]
    pub planets: Vec<(Body, PlanetPosition)>,
    pub aspects: Vec<Aspect>,
    pub flags: ChartFlags,
    pub warnings: Vec<String>,
}

fn planets_as_map<S: Serializer>(
    planets: &[(Body, PlanetPosition)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(planets.len()))?;
    for (body, position) in planets {
        map.serialize_entry(body.name(), position)?;
    }
    map.end()
}

/// Per-chart configuration the orchestrator passes down.
#[derive(Debug, Clone, Copy)]
pub struct ChartOptions {
    pub house_system: HouseSystem,
    pub zodiac: Zodiac,
    pub ayanamsa: Ayanamsa,
    pub include_minor_aspects: bool,
    pub time_approx: bool,
}

/// Assemble a chart for a resolved context. House-computation failures
/// propagate so the orchestrator can retry with its fallback system.
pub fn assemble(
    provider: &dyn Ephemeris,
    ctx: &ResolvedContext,
    options: ChartOptions,
) -> Result<ChartResult, EngineError> {
    let jd_ut = ctx.time.jd_ut;
    let sidereal_offset = match options.zodiac {
        Zodiac::Tropical => 0.0,
        Zodiac::Sidereal => options.ayanamsa.offset_deg(jd_ut),
    };

    let resolved = houses::resolve(
        provider,
        jd_ut,
        ctx.latitude,
        ctx.longitude,
        options.house_system,
        sidereal_offset,
    )?;

    let collected = planets::collect(provider, jd_ut, options.zodiac, options.ayanamsa);
    let aspects = aspects::detect(&collected, options.include_minor_aspects);

    let houses: Vec<HouseEntry> = resolved
        .cusps
        .iter()
        .enumerate()
        .map(|(i, &cusp)| HouseEntry { house: i as u8 + 1, cusp })
        .collect();

    let flags = ChartFlags {
        time_approx: options.time_approx,
        asc_near_sign_boundary: resolved.asc.deg <= 2.0 || resolved.asc.deg >= 28.0,
        house_system_warning: ctx.latitude.abs() >= 66.0,
        ephemeris_files_ok: collected.complete(),
    };

    Ok(ChartResult {
        meta: ChartMeta {
            place: ctx.place.clone(),
            latitude: ctx.latitude,
            longitude: ctx.longitude,
            timezone: ctx.timezone.clone(),
            utc_offset_minutes: ctx.time.offset_minutes,
            dst: ctx.time.dst,
            local_time: ctx.time.local_iso.clone(),
            utc_time: ctx.time.utc_iso.clone(),
            house_system: options.house_system,
            zodiac: options.zodiac,
            ayanamsa: options.ayanamsa,
        },
        asc: resolved.asc,
        mc: resolved.mc,
        houses,
        planets: collected.positions,
        aspects,
        flags,
        warnings: collected.warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ephemeris::TableEphemeris;
    use crate::timeconv;

    fn santiago_context() -> ResolvedContext {
        ResolvedContext {
            place: "Santiago, Chile".into(),
            latitude: -33.4378,
            longitude: -70.6505,
            timezone: "America/Santiago".into(),
            time: timeconv::resolve_local("1990-06-15", "14:30", "America/Santiago").unwrap(),
        }
    }

    fn options(house_system: HouseSystem) -> ChartOptions {
        ChartOptions {
            house_system,
            zodiac: Zodiac::Tropical,
            ayanamsa: Ayanamsa::None,
            include_minor_aspects: false,
            time_approx: false,
        }
    }

    #[test]
    fn chart_has_twelve_houses_numbered_in_order() {
        let chart = assemble(&TableEphemeris, &santiago_context(), options(HouseSystem::Equal))
            .unwrap();
        assert_eq!(chart.houses.len(), 12);
        for (i, entry) in chart.houses.iter().enumerate() {
            assert_eq!(entry.house, i as u8 + 1);
        }
        assert!(chart.flags.ephemeris_files_ok);
        assert!(!chart.flags.house_system_warning);
    }

    #[test]
    fn every_aspect_is_within_its_catalog_orb() {
        let chart = assemble(&TableEphemeris, &santiago_context(), options(HouseSystem::Equal))
            .unwrap();
        for aspect in &chart.aspects {
            let max = match aspect.kind {
                "conjunction" | "square" | "trine" | "opposition" => 8.0,
                "sextile" => 6.0,
                other => panic!("unexpected aspect type {}", other),
            };
            assert!(aspect.orb >= 0.0 && aspect.orb <= max);
        }
    }

    #[test]
    fn polar_latitude_sets_the_house_system_warning() {
        let mut ctx = santiago_context();
        ctx.latitude = 67.5;
        let chart = assemble(&TableEphemeris, &ctx, options(HouseSystem::Equal)).unwrap();
        assert!(chart.flags.house_system_warning);
    }

    #[test]
    fn placidus_failure_propagates_out_of_assembly() {
        let mut ctx = santiago_context();
        ctx.latitude = 89.0;
        let err = assemble(&TableEphemeris, &ctx, options(HouseSystem::Placidus)).unwrap_err();
        assert!(matches!(err, EngineError::HouseComputation(_)));
    }

    #[test]
    fn serialized_chart_uses_body_names_as_planet_keys() {
        let chart = assemble(&TableEphemeris, &santiago_context(), options(HouseSystem::Equal))
            .unwrap();
        let json = serde_json::to_value(&chart).unwrap();
        let planets = json["planets"].as_object().unwrap();
        assert_eq!(planets.len(), 14);
        assert!(planets.contains_key("Sun"));
        assert!(planets["Moon"]["sign"].is_string());
        assert!(json["houses"].as_array().unwrap().len() == 12);
        assert!(json["asc"]["sign"].is_string());
        assert!(json["mc"]["sign"].is_string());
    }
}
