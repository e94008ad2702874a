//! NDS2 client helpers.
//!
//! This crate sits between callers and an NDS2 client library. It decides
//! which servers to try, opens authenticated sessions, and turns channel
//! queries into `find_channels` / `get_availability` RPCs:
//!
//! - [`hosts`]: ordered server candidates from env, site table and default
//! - [`connect`]: NDS1 port selection, SASL credential-refresh retry
//! - [`client`]: [`NdsClient`], the connection-injecting front door
//! - [`discovery`]: channel queries with optional uniqueness check
//! - [`availability`]: per-channel data segments
//!
//! The wire protocol itself is behind the [`session::Connector`] and
//! [`session::NdsSession`] traits; [`mock`] implements them for tests.

pub mod availability;
pub mod client;
pub mod connect;
pub mod discovery;
pub mod env;
pub mod error;
pub mod hosts;
pub mod mock;
pub mod session;

pub use availability::get_availability;
pub use client::{ConnectionArgs, NdsClient};
pub use connect::{auth_connect, connect, CredentialRefresher, Kinit, NDS1_PORT};
pub use discovery::{find_channels, FindOptions};
pub use env::{EnvSelection, EnvSource, ProcessEnv, StaticEnv};
pub use error::{ClientError, Result};
pub use hosts::{
    parse_nds_env, resolve_hosts, HostCandidate, HostResolver, ResolverSettings,
    DEFAULT_NDS_HOST, DEFAULT_NDS_PORT,
};
pub use session::{
    BackendError, ChannelAvailability, Connector, FindRequest, NdsSession, SessionEpoch,
};
