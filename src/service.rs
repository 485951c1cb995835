//! Request orchestration.
//!
//! One service instance owns the collaborators and the process config.
//! A chart request runs through two states at most: the primary attempt with
//! the caller's house system, then a single fallback attempt with Equal,
//! which is defined at every latitude.

use log::{info, warn};

use crate::chart::{self, ChartOptions, ChartResult, ResolvedContext};
use crate::config::EngineConfig;
use crate::ephemeris::Ephemeris;
use crate::error::EngineError;
use crate::geo::{Geocoder, TimezoneResolver};
use crate::models::ChartRequest;
use crate::scan::{self, ScanRequest, ScanResult};
use crate::{timeconv, AspectSet, HouseSystem};

pub struct NatalService {
    ephemeris: Box<dyn Ephemeris>,
    geocoder: Box<dyn Geocoder>,
    timezones: Box<dyn TimezoneResolver>,
    config: EngineConfig,
}

impl NatalService {
    pub fn new(
        ephemeris: Box<dyn Ephemeris>,
        geocoder: Box<dyn Geocoder>,
        timezones: Box<dyn TimezoneResolver>,
        config: EngineConfig,
    ) -> Self {
        NatalService { ephemeris, geocoder, timezones, config }
    }

    /// Availability probe. No side effects.
    pub fn health(&self) -> bool {
        true
    }

    /// Compute a natal chart, retrying once with Equal houses if the
    /// requested system cannot be computed.
    pub fn compute_chart(&self, request: &ChartRequest) -> Result<ChartResult, EngineError> {
        // Fail before any external call: without a clock time there is no
        // ascendant to compute.
        let birth_time = request
            .birth_time_local
            .as_deref()
            .ok_or(EngineError::MissingTimeInput)?;

        let (latitude, longitude, place_label) = self.resolve_coordinates(
            &request.place,
            request.latitude,
            request.longitude,
        )?;
        let timezone = self.resolve_timezone(request.timezone.as_deref(), latitude, longitude)?;
        let time = timeconv::resolve_local(&request.birth_date, birth_time, &timezone)?;

        let ctx = ResolvedContext {
            place: place_label,
            latitude,
            longitude,
            timezone,
            time,
        };
        let options = ChartOptions {
            house_system: request.house_system,
            zodiac: request.zodiac,
            ayanamsa: request.ayanamsa,
            include_minor_aspects: request.aspect_sets.contains(&AspectSet::Minor),
            time_approx: request.time_approx,
        };

        match chart::assemble(self.ephemeris.as_ref(), &ctx, options) {
            Ok(chart) => Ok(chart),
            // Only house computation gets a second chance; client-input
            // errors are never retried.
            Err(EngineError::HouseComputation(primary)) => {
                warn!(
                    "{} houses failed ({}); retrying with Equal",
                    request.house_system, primary
                );
                self.fallback_attempt(&ctx, options, request.house_system, primary)
            }
            Err(other) => Err(other),
        }
    }

    fn fallback_attempt(
        &self,
        ctx: &ResolvedContext,
        options: ChartOptions,
        requested: HouseSystem,
        primary: String,
    ) -> Result<ChartResult, EngineError> {
        let fallback_options = ChartOptions { house_system: HouseSystem::Equal, ..options };
        match chart::assemble(self.ephemeris.as_ref(), ctx, fallback_options) {
            Ok(mut chart) => {
                chart.warnings.insert(
                    0,
                    format!(
                        "{} houses could not be computed ({}); Equal houses used instead",
                        requested, primary
                    ),
                );
                Ok(chart)
            }
            Err(fallback) => Err(EngineError::FallbackFailed {
                primary,
                fallback: fallback.to_string(),
            }),
        }
    }

    /// Boundary-scan diagnostic, gated behind an explicit enable switch.
    pub fn scan_boundary(&self, request: &ScanRequest) -> Result<ScanResult, EngineError> {
        if !self.config.enable_boundary_scan {
            return Err(EngineError::ScanDisabled);
        }
        let (latitude, longitude, place_label) = self.resolve_coordinates(
            &request.place,
            request.latitude,
            request.longitude,
        )?;
        let timezone = self.resolve_timezone(request.timezone.as_deref(), latitude, longitude)?;
        info!("boundary scan for {} on {}", place_label, request.birth_date);

        scan::run(
            self.ephemeris.as_ref(),
            &request.birth_date,
            &place_label,
            latitude,
            longitude,
            &timezone,
            request.step_minutes,
        )
    }

    fn resolve_coordinates(
        &self,
        place: &str,
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> Result<(f64, f64, String), EngineError> {
        if let (Some(lat), Some(lon)) = (latitude, longitude) {
            return Ok((lat, lon, place.to_string()));
        }
        let resolved = self.geocoder.geocode(place)?;
        Ok((resolved.latitude, resolved.longitude, resolved.display_name))
    }

    fn resolve_timezone(
        &self,
        explicit: Option<&str>,
        latitude: f64,
        longitude: f64,
    ) -> Result<String, EngineError> {
        match explicit {
            Some(tz) => Ok(tz.to_string()),
            None => self.timezones.resolve(latitude, longitude),
        }
    }
}
