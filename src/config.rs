//! Process configuration, fixed at startup.

use std::env;
use std::path::PathBuf;

use log::info;

const DEFAULT_EPHE_PATH: &str = "./ephe";

/// Settings read once from the environment.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Ephemeris data directory (`EPHE_PATH`).
    pub ephemeris_path: PathBuf,
    /// Whether the diagnostic boundary-scan operation is exposed
    /// (`ENABLE_BOUNDARY_SCAN`). Off by default.
    pub enable_boundary_scan: bool,
    /// GeoNames account for timezone lookups (`GEONAMES_USERNAME`).
    pub geonames_username: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            ephemeris_path: PathBuf::from(DEFAULT_EPHE_PATH),
            enable_boundary_scan: false,
            geonames_username: None,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        let config = EngineConfig {
            ephemeris_path: env::var("EPHE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_EPHE_PATH)),
            enable_boundary_scan: env::var("ENABLE_BOUNDARY_SCAN")
                .map(|v| is_truthy(&v))
                .unwrap_or(false),
            geonames_username: env::var("GEONAMES_USERNAME").ok().filter(|v| !v.is_empty()),
        };
        info!(
            "config: ephe_path={}, boundary_scan={}",
            config.ephemeris_path.display(),
            config.enable_boundary_scan
        );
        config
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
