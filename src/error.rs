//! Error taxonomy for the chart engine.
//!
//! Every failure carries an [`ErrorKind`] tag so a caller can tell whether to
//! fix its input, retry, or report a bug.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// No local birth time: houses and the ascendant are undefined.
    #[error("birth_time_local is required for houses/ASC")]
    MissingTimeInput,

    /// Unparsable date/time or unrecognized timezone identifier.
    #[error("{0}")]
    InvalidTimeInput(String),

    /// The geocoder found no match for the place name.
    #[error("{0}")]
    Geocode(String),

    /// No IANA timezone could be resolved from the coordinates.
    #[error("{0}")]
    TimezoneResolve(String),

    /// The ephemeris provider could not produce cusps/angles.
    #[error("{0}")]
    HouseComputation(String),

    /// Both the requested house system and the Equal fallback failed.
    #[error("Primary error: {primary} | Fallback error: {fallback}")]
    FallbackFailed { primary: String, fallback: String },

    /// The boundary-scan endpoint is not enabled on this process.
    #[error("boundary scan is disabled")]
    ScanDisabled,

    /// Anything not anticipated above.
    #[error("{0}")]
    Internal(String),
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::MissingTimeInput => ErrorKind::MissingTime,
            EngineError::InvalidTimeInput(_)
            | EngineError::Geocode(_)
            | EngineError::TimezoneResolve(_) => ErrorKind::BadRequest,
            EngineError::HouseComputation(_)
            | EngineError::FallbackFailed { .. }
            | EngineError::Internal(_) => ErrorKind::ServerError,
            EngineError::ScanDisabled => ErrorKind::Disabled,
        }
    }
}

/// Response-level error category.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    MissingTime,
    BadRequest,
    ServerError,
    Disabled,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::MissingTime => "missing_time",
            ErrorKind::BadRequest => "bad_request",
            ErrorKind::ServerError => "server_error",
            ErrorKind::Disabled => "disabled",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_tags() {
        assert_eq!(EngineError::MissingTimeInput.kind().as_str(), "missing_time");
        assert_eq!(
            EngineError::InvalidTimeInput("bad date".into()).kind().as_str(),
            "bad_request"
        );
        assert_eq!(
            EngineError::HouseComputation("polar".into()).kind().as_str(),
            "server_error"
        );
        assert_eq!(EngineError::ScanDisabled.kind().as_str(), "disabled");
    }

    #[test]
    fn fallback_failure_reports_both_messages() {
        let err = EngineError::FallbackFailed {
            primary: "placidus undefined".into(),
            fallback: "equal also failed".into(),
        };
        let text = err.to_string();
        assert!(text.contains("placidus undefined"));
        assert!(text.contains("equal also failed"));
    }
}
