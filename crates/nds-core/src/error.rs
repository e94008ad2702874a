//! Error types for NDS value parsing.

use thiserror::Error;

/// Unknown key passed to an enumeration lookup.
///
/// The message names both the rejected input and the enumeration it was
/// looked up in, e.g. `'blah' is not a valid ChannelType`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("'{key}' is not a valid {type_name}")]
pub struct LookupError {
    /// The rejected input, rendered as text.
    pub key: String,
    /// Name of the enumeration the key was looked up in.
    pub type_name: &'static str,
}

impl LookupError {
    /// Create a lookup error for `key` in the enumeration `type_name`.
    pub fn new(key: impl Into<String>, type_name: &'static str) -> Self {
        Self {
            key: key.into(),
            type_name,
        }
    }
}

/// Errors converting user-supplied times to GPS seconds.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeError {
    /// The string is neither a number, `now`, nor a recognised date format.
    #[error("Cannot parse '{0}' as a GPS time or date")]
    Unparseable(String),

    /// The date lies before the GPS epoch (1980-01-06).
    #[error("Time '{0}' is before the GPS epoch")]
    BeforeGpsEpoch(String),

    /// A number too large to be a GPS time.
    #[error("Time '{0}' is out of range")]
    OutOfRange(String),

    /// Aligning the interval would leave the `i64` range.
    #[error("Cannot align [{start}, {end}) to the minute-trend grid")]
    Unalignable {
        /// Interval start (GPS seconds)
        start: i64,
        /// Interval end (GPS seconds)
        end: i64,
    },

    /// An interval whose end precedes its start.
    #[error("Invalid interval: end {end} precedes start {start}")]
    InvertedInterval {
        /// Interval start (GPS seconds)
        start: i64,
        /// Interval end (GPS seconds)
        end: i64,
    },
}
