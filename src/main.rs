use anyhow::Result;
use clap::{Parser, Subcommand};

use natal_core::ephemeris::{HorizonsEphemeris, TableEphemeris};
use natal_core::geo::{GeoNamesTimezoneResolver, NominatimGeocoder};
use natal_core::models::{ChartRequest, ErrorResponse};
use natal_core::scan::ScanRequest;
use natal_core::{
    AspectSet, Ayanamsa, EngineConfig, EngineError, Ephemeris, HouseSystem, NatalService, Zodiac,
};

#[derive(Parser)]
#[command(name = "natal_core", version, about = "Natal chart computation service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compute a natal chart and print it as JSON.
    Chart {
        /// Birth date, YYYY-MM-DD
        #[arg(long)]
        date: String,
        /// Birth local time, HH:MM (required for houses and the ascendant)
        #[arg(long)]
        time: Option<String>,
        /// Place name for geocoding
        #[arg(long)]
        place: String,
        #[arg(long)]
        lat: Option<f64>,
        #[arg(long)]
        lon: Option<f64>,
        /// IANA timezone id; resolved from coordinates when omitted
        #[arg(long)]
        timezone: Option<String>,
        #[arg(long, default_value = "Placidus")]
        house_system: HouseSystem,
        #[arg(long, default_value = "Tropical")]
        zodiac: Zodiac,
        #[arg(long, default_value = "None")]
        ayanamsa: Ayanamsa,
        /// Include the minor aspect catalog
        #[arg(long)]
        minor_aspects: bool,
        /// Mark the birth time as approximate
        #[arg(long)]
        time_approx: bool,
        /// Use the built-in mean-element ephemeris instead of JPL Horizons
        #[arg(long)]
        offline: bool,
    },
    /// Sweep a day for ascendant sign boundaries (requires ENABLE_BOUNDARY_SCAN).
    Scan {
        #[arg(long)]
        date: String,
        #[arg(long)]
        place: String,
        #[arg(long)]
        lat: Option<f64>,
        #[arg(long)]
        lon: Option<f64>,
        #[arg(long)]
        timezone: Option<String>,
        #[arg(long, default_value_t = 5)]
        step_minutes: u32,
        #[arg(long)]
        offline: bool,
    },
    /// Availability probe.
    Health,
}

fn build_service(offline: bool) -> Result<NatalService> {
    let config = EngineConfig::from_env();
    let ephemeris: Box<dyn Ephemeris> = if offline {
        Box::new(TableEphemeris::new())
    } else {
        Box::new(HorizonsEphemeris::new()?)
    };
    let geocoder = Box::new(NominatimGeocoder::new()?);
    let username = config.geonames_username.clone().unwrap_or_default();
    let timezones = Box::new(GeoNamesTimezoneResolver::new(username)?);
    Ok(NatalService::new(ephemeris, geocoder, timezones, config))
}

fn print_error_and_exit(err: &EngineError) -> ! {
    let payload = ErrorResponse::from(err);
    println!("{}", serde_json::to_string(&payload).expect("error payload serializes"));
    std::process::exit(1);
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Chart {
            date,
            time,
            place,
            lat,
            lon,
            timezone,
            house_system,
            zodiac,
            ayanamsa,
            minor_aspects,
            time_approx,
            offline,
        } => {
            let service = build_service(offline)?;
            let mut aspect_sets = vec![AspectSet::Major];
            if minor_aspects {
                aspect_sets.push(AspectSet::Minor);
            }
            let request = ChartRequest {
                birth_date: date,
                birth_time_local: time,
                time_approx,
                time_tolerance_minutes: 0,
                place,
                latitude: lat,
                longitude: lon,
                timezone,
                house_system,
                zodiac,
                ayanamsa,
                aspect_sets,
            };
            match service.compute_chart(&request) {
                Ok(chart) => println!("{}", serde_json::to_string_pretty(&chart)?),
                Err(err) => print_error_and_exit(&err),
            }
        }
        Command::Scan { date, place, lat, lon, timezone, step_minutes, offline } => {
            let service = build_service(offline)?;
            let request = ScanRequest {
                birth_date: date,
                place,
                latitude: lat,
                longitude: lon,
                timezone,
                step_minutes,
            };
            match service.scan_boundary(&request) {
                Ok(result) => println!("{}", serde_json::to_string_pretty(&result)?),
                Err(err) => print_error_and_exit(&err),
            }
        }
        Command::Health => {
            let service = build_service(true)?;
            println!("{}", serde_json::json!({ "ok": service.health() }));
        }
    }

    Ok(())
}
