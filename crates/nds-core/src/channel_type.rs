//! NDS2 channel type flags.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::LookupError;
use crate::flags::{FlagIndex, NdsFlag};

static INDEX: Lazy<FlagIndex<ChannelType>> = Lazy::new(FlagIndex::build);

/// Kind of data product a channel serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ChannelType {
    /// Type not reported by the server
    Unknown,
    /// Live data from the online feed
    Online,
    /// Archived full-rate data
    Raw,
    /// Reduced data set
    Rds,
    /// Second trend
    STrend,
    /// Minute trend
    MTrend,
    /// Excitation test point
    TestPoint,
    /// Static (non time-series) value
    Static,
}

impl ChannelType {
    /// All channel types in flag order.
    pub const ALL: [ChannelType; 8] = [
        ChannelType::Unknown,
        ChannelType::Online,
        ChannelType::Raw,
        ChannelType::Rds,
        ChannelType::STrend,
        ChannelType::MTrend,
        ChannelType::TestPoint,
        ChannelType::Static,
    ];

    /// Returns `true` for second and minute trends.
    #[must_use]
    pub fn is_trend(self) -> bool {
        matches!(self, ChannelType::STrend | ChannelType::MTrend)
    }
}

impl NdsFlag for ChannelType {
    const TYPE_NAME: &'static str = "ChannelType";

    fn members() -> &'static [Self] {
        &Self::ALL
    }

    fn value(self) -> u32 {
        match self {
            ChannelType::Unknown => 0,
            ChannelType::Online => 1,
            ChannelType::Raw => 2,
            ChannelType::Rds => 4,
            ChannelType::STrend => 8,
            ChannelType::MTrend => 16,
            ChannelType::TestPoint => 32,
            ChannelType::Static => 64,
        }
    }

    fn name(self) -> &'static str {
        match self {
            ChannelType::Unknown => "UNKNOWN",
            ChannelType::Online => "ONLINE",
            ChannelType::Raw => "RAW",
            ChannelType::Rds => "RDS",
            ChannelType::STrend => "STREND",
            ChannelType::MTrend => "MTREND",
            ChannelType::TestPoint => "TEST_POINT",
            ChannelType::Static => "STATIC",
        }
    }

    fn nds2name(self) -> &'static str {
        match self {
            ChannelType::Unknown => "UNKNOWN",
            ChannelType::Online => "online",
            ChannelType::Raw => "raw",
            ChannelType::Rds => "reduced",
            ChannelType::STrend => "s-trend",
            ChannelType::MTrend => "m-trend",
            ChannelType::TestPoint => "test-pt",
            ChannelType::Static => "static",
        }
    }

    fn synonyms(self) -> &'static [&'static str] {
        match self {
            ChannelType::Unknown => &["none"],
            ChannelType::STrend => &["second-trend"],
            ChannelType::MTrend => &["minute-trend"],
            _ => &[],
        }
    }

    fn index() -> &'static FlagIndex<Self> {
        &INDEX
    }
}

impl fmt::Display for ChannelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.nds2name())
    }
}

impl FromStr for ChannelType {
    type Err = LookupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::find(s)
    }
}

impl TryFrom<String> for ChannelType {
    type Error = LookupError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::find(&value)
    }
}

impl From<ChannelType> for String {
    fn from(value: ChannelType) -> Self {
        value.nds2name().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any() {
        let max = ChannelType::ALL.iter().map(|c| c.value()).max().unwrap();
        assert_eq!(ChannelType::any(), 2 * max - 1);
        assert_eq!(ChannelType::any(), 127);
    }

    #[test]
    fn test_nds2name() {
        assert_eq!(ChannelType::MTrend.nds2name(), "m-trend");
    }

    #[test]
    fn test_nds2names() {
        let mut names = ChannelType::nds2names();
        names.sort_unstable();
        assert_eq!(
            names,
            vec!["UNKNOWN", "m-trend", "online", "raw", "reduced", "s-trend", "static", "test-pt"]
        );
    }

    #[test]
    fn test_find() {
        let cases: [(&str, ChannelType); 7] = [
            ("MTREND", ChannelType::MTrend),
            ("m-trend", ChannelType::MTrend),
            ("mtrend", ChannelType::MTrend),
            ("rds", ChannelType::Rds),
            ("RDS", ChannelType::Rds),
            ("reduced", ChannelType::Rds),
            ("REDUCED", ChannelType::Rds),
        ];
        for (input, expected) in cases {
            assert_eq!(ChannelType::find(input).unwrap(), expected, "input {input}");
        }
        assert_eq!(
            ChannelType::find(ChannelType::MTrend.value()).unwrap(),
            ChannelType::MTrend
        );
        assert_eq!(ChannelType::find("test_point").unwrap(), ChannelType::TestPoint);
        assert_eq!(ChannelType::find("test-pt").unwrap(), ChannelType::TestPoint);
    }

    #[test]
    fn test_find_errors() {
        let err = ChannelType::find("blah").unwrap_err();
        assert_eq!(err.to_string(), "'blah' is not a valid ChannelType");
    }

    #[test]
    fn test_serde_uses_protocol_names() {
        let json = serde_json::to_string(&ChannelType::STrend).unwrap();
        assert_eq!(json, "\"s-trend\"");
        let parsed: ChannelType = serde_json::from_str("\"MTREND\"").unwrap();
        assert_eq!(parsed, ChannelType::MTrend);
        assert!(serde_json::from_str::<ChannelType>("\"blah\"").is_err());
    }
}
