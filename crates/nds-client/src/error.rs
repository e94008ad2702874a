//! Client error types.

use nds_core::{LookupError, TimeError};
use thiserror::Error;

use crate::session::BackendError;

/// Result type alias using ClientError.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when using the NDS client helpers.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Unknown channel type or data type name.
    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// Unparseable epoch or time.
    #[error(transparent)]
    Time(#[from] TimeError),

    /// Error reported by the NDS backend, passed through unchanged.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// A query required to resolve to one channel did not.
    #[error("unique NDS2 channel match not found for '{query}'")]
    NotUnique {
        /// The query as given by the caller
        query: String,
        /// Number of candidates left after removing online copies
        matches: usize,
    },

    /// The server answered an availability query without this channel.
    #[error("no availability returned for '{0}'")]
    MissingAvailability(String),

    /// Neither an open session nor a host was supplied.
    #[error("an open NDS session or a host to connect to is required")]
    MissingConnection,

    /// Refreshing Kerberos credentials failed.
    #[error("Credential refresh failed: {0}")]
    Credential(String),

    /// Every host candidate failed to connect.
    #[error("No NDS host reachable after {tried} attempt(s); last error: {last}")]
    NoReachableHost {
        /// Number of candidates tried
        tried: usize,
        /// The last connection error
        last: Box<ClientError>,
    },

    /// The host candidate list was empty.
    #[error("No NDS host candidates to try")]
    NoHosts,
}
