use std::path::PathBuf;

use thiserror::Error;

/// Convenient result alias for the skygraph library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
///
/// Only genuine faults and rejected inputs live here. "No route exists" and
/// "candidate dropped for missing coordinates" are expected outcomes and are
/// expressed as `None` / filtered results instead.
#[derive(Debug, Error)]
pub enum Error {
    /// Snapshot database could not be located at the resolved path.
    #[error("flight snapshot not found at {path}")]
    SnapshotNotFound { path: PathBuf },

    /// Raised when a query omits the source airport code.
    #[error("source airport code is required")]
    MissingSource,

    /// Raised when a query omits the destination airport code.
    #[error("destination airport code is required")]
    MissingDestination,

    /// Raised when an airport code could not be found in the snapshot.
    #[error("unknown airport code: {code}{}", format_suggestions(.suggestions))]
    UnknownAirport {
        code: String,
        suggestions: Vec<String>,
    },

    /// Raised when `max_stops` falls outside the supported `0..=4` range.
    #[error("max_stops must be between 0 and 4, got {value}")]
    InvalidMaxStops { value: usize },

    /// Raised when a caller supplies a negative criterion weight.
    #[error("criterion weights must be non-negative: {reason}")]
    InvalidWeights { reason: String },

    /// Raised when a search mode string is not recognised.
    #[error("unknown search mode: {mode}")]
    UnknownMode { mode: String },

    /// Wrapper for SQLite errors.
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else if suggestions.len() == 1 {
        format!(". Did you mean '{}'?", suggestions[0])
    } else {
        format!(
            ". Did you mean one of: {}?",
            suggestions
                .iter()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_airport_formats_suggestions() {
        let error = Error::UnknownAirport {
            code: "LHX".to_string(),
            suggestions: vec!["LHE".to_string(), "LHR".to_string()],
        };
        let rendered = error.to_string();
        assert!(rendered.contains("LHX"));
        assert!(rendered.contains("'LHE'"));
        assert!(rendered.contains("'LHR'"));
    }

    #[test]
    fn unknown_airport_without_suggestions_is_plain() {
        let error = Error::UnknownAirport {
            code: "ZZZ".to_string(),
            suggestions: Vec::new(),
        };
        assert_eq!(error.to_string(), "unknown airport code: ZZZ");
    }
}
