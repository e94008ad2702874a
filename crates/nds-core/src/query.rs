//! Channel query parsing.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::channel_type::ChannelType;
use crate::error::LookupError;
use crate::flags::NdsFlag;

/// A `name[,type]` channel query.
///
/// The type suffix is split at the last comma, so
/// `L1:GDS-CALIB_STRAIN,reduced` yields name `L1:GDS-CALIB_STRAIN` and
/// type [`ChannelType::Rds`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelQuery {
    /// Channel name without the type suffix
    pub name: String,
    /// Suffix exactly as typed, if present
    pub suffix: Option<String>,
    /// Channel type resolved from the suffix
    pub channel_type: Option<ChannelType>,
}

impl ChannelQuery {
    /// Parse a query string.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] if the suffix is not a known channel type.
    pub fn parse(query: &str) -> Result<Self, LookupError> {
        match query.rsplit_once(',') {
            Some((name, suffix)) => {
                let channel_type = ChannelType::find(suffix.trim())?;
                Ok(Self {
                    name: name.to_string(),
                    suffix: Some(suffix.trim().to_string()),
                    channel_type: Some(channel_type),
                })
            }
            None => Ok(Self {
                name: query.to_string(),
                suffix: None,
                channel_type: None,
            }),
        }
    }

    /// Channel type mask for the request, `fallback` when no suffix was given.
    #[must_use]
    pub fn type_mask(&self, fallback: u32) -> u32 {
        self.channel_type.map_or(fallback, ChannelType::value)
    }

    /// Name pattern sent to a server speaking `protocol`.
    ///
    /// NDS1 servers list trend channels under their suffixed names, so for
    /// protocol 1 a trend suffix stays on the pattern.
    #[must_use]
    pub fn request_pattern(&self, protocol: u32) -> Cow<'_, str> {
        match (&self.suffix, self.channel_type) {
            (Some(suffix), Some(ctype)) if protocol == 1 && ctype.is_trend() => {
                Cow::Owned(format!("{},{}", self.name, suffix))
            }
            _ => Cow::Borrowed(self.name.as_str()),
        }
    }
}

impl fmt::Display for ChannelQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.suffix {
            Some(suffix) => write!(f, "{},{}", self.name, suffix),
            None => f.write_str(&self.name),
        }
    }
}

/// Sample-rate filter for channel discovery.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SampleRate {
    /// Exactly this rate (Hz)
    Exact(f64),
    /// Inclusive `(min, max)` range (Hz)
    Range(f64, f64),
}

impl SampleRate {
    /// The `(min, max)` bounds passed to the server.
    #[must_use]
    pub fn bounds(self) -> (f64, f64) {
        match self {
            SampleRate::Exact(rate) => (rate, rate),
            SampleRate::Range(min, max) => (min, max),
        }
    }
}

impl From<f64> for SampleRate {
    fn from(rate: f64) -> Self {
        SampleRate::Exact(rate)
    }
}

impl From<(f64, f64)> for SampleRate {
    fn from((min, max): (f64, f64)) -> Self {
        SampleRate::Range(min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_name() {
        let query = ChannelQuery::parse("X1:TEST").unwrap();
        assert_eq!(query.name, "X1:TEST");
        assert_eq!(query.channel_type, None);
        assert_eq!(query.type_mask(ChannelType::any()), 127);
    }

    #[test]
    fn test_parse_type_suffix() {
        let query = ChannelQuery::parse("X1:TEST,m-trend").unwrap();
        assert_eq!(query.name, "X1:TEST");
        assert_eq!(query.channel_type, Some(ChannelType::MTrend));
        assert_eq!(query.type_mask(ChannelType::any()), 16);
        assert_eq!(query.to_string(), "X1:TEST,m-trend");
    }

    #[test]
    fn test_parse_bad_suffix() {
        let err = ChannelQuery::parse("X1:TEST,blah").unwrap_err();
        assert_eq!(err.to_string(), "'blah' is not a valid ChannelType");
    }

    #[test]
    fn test_request_pattern_keeps_trend_suffix_for_nds1() {
        let trend = ChannelQuery::parse("X1:TEST,m-trend").unwrap();
        assert_eq!(trend.request_pattern(1), "X1:TEST,m-trend");
        assert_eq!(trend.request_pattern(2), "X1:TEST");

        let reduced = ChannelQuery::parse("X1:TEST,reduced").unwrap();
        assert_eq!(reduced.request_pattern(1), "X1:TEST");
    }

    #[test]
    fn test_sample_rate_bounds() {
        assert_eq!(SampleRate::from(16.0).bounds(), (16.0, 16.0));
        assert_eq!(SampleRate::from((1.0, 256.0)).bounds(), (1.0, 256.0));
    }
}
