//! Error types for the fetchmock crate.
//!
//! Every failure an intercepted fetch can produce is a [`FetchMockError`].
//! The messages of [`FetchMockError::AllCallsBlocked`],
//! [`FetchMockError::NoMatchFound`] and [`FetchMockError::InvalidHelperMatcher`]
//! have fixed `Display` output with no category prefix.
//!
//! # Example
//!
//! ```rust,ignore
//! use fetchmock::error::FetchMockError;
//!
//! match fetchmock::fetch_blocking("https://api.example.com", None) {
//!     Err(FetchMockError::NoMatchFound { method, url }) => {
//!         println!("{} {} is not mocked", method, url)
//!     }
//!     other => println!("{:?}", other),
//! }
//! ```

use std::error::Error;
use std::fmt;

/// Error produced by a fallible predicate. It travels through the interceptor
/// untouched and can be downcast back to its concrete type.
pub type PredicateError = Box<dyn Error + Send + Sync + 'static>;

/// Message of [`FetchMockError::InvalidHelperMatcher`].
pub const INVALID_HELPER_MATCHER_MESSAGE: &str =
    "input must be a string or a RegExp when using fetchMock helper";

/// Unified error type for all fetchmock operations.
#[derive(Debug)]
pub enum FetchMockError {
    // ==========================================================================
    // INTERCEPTION ERRORS
    // ==========================================================================
    /// The call blocker is installed and refused this call.
    AllCallsBlocked { url: String },

    /// The mock interceptor is installed but no registered predicate accepted the call.
    NoMatchFound { method: String, url: String },

    /// A fallible predicate returned an error while evaluating the call.
    Predicate(PredicateError),

    // ==========================================================================
    // HELPER ERRORS
    // ==========================================================================
    /// A helper received a URL shape that is neither a string nor a pattern object.
    InvalidHelperMatcher,

    /// A pattern object carried a regular expression that does not compile.
    InvalidPattern { pattern: String, reason: String },

    // ==========================================================================
    // PASSTHROUGH ERRORS
    // ==========================================================================
    /// The real network call failed.
    Network(reqwest::Error),

    /// A passthrough call was polled outside a Tokio runtime, for example
    /// through `fetch_blocking` before any blocker or mock was installed.
    NoRuntime { url: String },

    /// Configuration could not be parsed or applied.
    ConfigError(String),

    /// Anything else.
    Internal { message: String },
}

impl fmt::Display for FetchMockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchMockError::AllCallsBlocked { url } => {
                write!(
                    f,
                    "Unable to fetch \"{}\": it seems that you did block all calls but that you did not mock any call at all by calling `fetchMock`",
                    url
                )
            }
            FetchMockError::NoMatchFound { method, url } => {
                write!(
                    f,
                    "Unable to match the given \"{}\" fetch call to \"{}\"",
                    method, url
                )
            }
            // The predicate's own message, not a wrapped one.
            FetchMockError::Predicate(err) => write!(f, "{}", err),
            FetchMockError::InvalidHelperMatcher => {
                write!(f, "{}", INVALID_HELPER_MATCHER_MESSAGE)
            }
            FetchMockError::InvalidPattern { pattern, reason } => {
                write!(f, "Invalid URL pattern '{}': {}", pattern, reason)
            }
            FetchMockError::Network(err) => write!(f, "Network error: {}", err),
            FetchMockError::NoRuntime { url } => write!(
                f,
                "Unable to fetch \"{}\" through the network: passthrough calls must be awaited on a Tokio runtime",
                url
            ),
            FetchMockError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            FetchMockError::Internal { message } => write!(f, "{}", message),
        }
    }
}

impl Error for FetchMockError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            FetchMockError::Predicate(err) => Some(err.as_ref()),
            FetchMockError::Network(err) => Some(err),
            _ => None,
        }
    }
}

impl FetchMockError {
    /// Returns true for the two errors an interception mode raises on its own
    /// (blocked call, unmatched call).
    pub fn is_interception(&self) -> bool {
        matches!(
            self,
            FetchMockError::AllCallsBlocked { .. } | FetchMockError::NoMatchFound { .. }
        )
    }
}

impl From<reqwest::Error> for FetchMockError {
    fn from(err: reqwest::Error) -> Self {
        FetchMockError::Network(err)
    }
}

impl From<serde_json::Error> for FetchMockError {
    fn from(err: serde_json::Error) -> Self {
        FetchMockError::Internal {
            message: format!("JSON error: {}", err),
        }
    }
}

impl From<String> for FetchMockError {
    fn from(err: String) -> Self {
        FetchMockError::Internal { message: err }
    }
}

impl From<&str> for FetchMockError {
    fn from(err: &str) -> Self {
        FetchMockError::Internal {
            message: err.to_string(),
        }
    }
}
