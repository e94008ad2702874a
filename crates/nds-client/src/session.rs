//! The NDS backend seam.
//!
//! The NDS2 wire protocol (connection, SASL handshake, RPCs) lives in an
//! external client library. [`Connector`] and [`NdsSession`] are the only
//! surface this crate consumes from it; [`crate::mock`] provides a scripted
//! implementation for tests.

use std::fmt;

use nds_core::{ChannelDescriptor, SegmentList};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message fragment the server sends when a Kerberos ticket is required.
pub const SASL_AUTH_REQUIRED: &str = "Request SASL authentication";

/// Error raised by the backend library.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct BackendError {
    /// Message as reported by the backend
    pub message: String,
}

impl BackendError {
    /// Create a backend error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns `true` if the server asked for SASL authentication.
    #[must_use]
    pub fn is_sasl_auth_required(&self) -> bool {
        self.message.contains(SASL_AUTH_REQUIRED)
    }
}

/// Time span a session's queries apply to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionEpoch {
    /// All available data (`ALL`)
    #[default]
    All,
    /// A server-defined named epoch, e.g. `O3`
    Named(String),
    /// Explicit GPS interval
    Gps {
        /// GPS start
        start: i64,
        /// GPS end
        end: i64,
    },
}

impl fmt::Display for SessionEpoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionEpoch::All => f.write_str("ALL"),
            SessionEpoch::Named(name) => f.write_str(name),
            SessionEpoch::Gps { start, end } => write!(f, "{start}-{end}"),
        }
    }
}

/// Arguments of one `find_channels` RPC.
#[derive(Debug, Clone, PartialEq)]
pub struct FindRequest {
    /// Channel name or glob pattern
    pub pattern: String,
    /// Channel type mask or single value
    pub channel_type: u32,
    /// Data type mask or single value
    pub data_type: u32,
    /// `(min, max)` sample rate; only sent to protocol 2+ servers
    pub sample_rate: Option<(f64, f64)>,
}

/// Availability of one channel as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelAvailability {
    /// Request name of the channel
    pub name: String,
    /// Intervals with data
    pub segments: SegmentList,
}

/// An open connection to an NDS server.
pub trait NdsSession {
    /// Protocol version spoken by the server (1 for NDS1, 2 for NDS2).
    fn protocol_version(&self) -> u32;

    /// Restrict later queries to `epoch`.
    fn set_epoch(&mut self, epoch: &SessionEpoch) -> Result<(), BackendError>;

    /// The epoch currently in effect.
    fn current_epoch(&self) -> SessionEpoch;

    /// List channels matching `request`.
    fn find_channels(&mut self, request: &FindRequest)
        -> Result<Vec<ChannelDescriptor>, BackendError>;

    /// Data availability for each name, in request order.
    fn get_availability(&mut self, names: &[String])
        -> Result<Vec<ChannelAvailability>, BackendError>;
}

/// Opens sessions to NDS servers.
pub trait Connector {
    /// Session type produced.
    type Session: NdsSession;

    /// Connect to `host`, on the library's default port when `port` is `None`.
    fn connect(&self, host: &str, port: Option<u16>) -> Result<Self::Session, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sasl_detection() {
        let err = BackendError::new("Request SASL authentication something something");
        assert!(err.is_sasl_auth_required());
        assert!(!BackendError::new("Anything else").is_sasl_auth_required());
    }

    #[test]
    fn test_session_epoch_display() {
        assert_eq!(SessionEpoch::All.to_string(), "ALL");
        assert_eq!(SessionEpoch::Gps { start: 0, end: 1 }.to_string(), "0-1");
    }
}
