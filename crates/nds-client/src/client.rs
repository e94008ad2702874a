//! High-level NDS client.
//!
//! [`NdsClient`] bundles a [`Connector`] with a [`CredentialRefresher`] and
//! runs operations against either a session the caller already holds or a
//! fresh authenticated connection:
//!
//! ```
//! use nds_client::mock::{MockConnector, MockSession};
//! use nds_client::{ConnectionArgs, FindOptions, NdsClient};
//!
//! let client = NdsClient::new(MockConnector::new(MockSession::new()));
//! let found = client.find_channels(
//!     ConnectionArgs::host("nds.ligo.caltech.edu"),
//!     &["X1:TEST"],
//!     &FindOptions::new(),
//! )?;
//! assert!(found.is_empty());
//! # Ok::<(), nds_client::ClientError>(())
//! ```

use std::collections::BTreeMap;

use nds_core::{ChannelDescriptor, NdsName, SegmentList};
use tracing::{info, warn};

use crate::availability;
use crate::connect::{auth_connect, CredentialRefresher, Kinit};
use crate::discovery::{self, FindOptions};
use crate::error::{ClientError, Result};
use crate::hosts::HostCandidate;
use crate::session::Connector;

/// Where an operation gets its session from.
///
/// Either borrow an open session or name a host to connect to. Supplying
/// neither is a usage error reported before any network activity.
#[derive(Debug)]
pub struct ConnectionArgs<'a, S> {
    session: Option<&'a mut S>,
    host: Option<String>,
    port: Option<u16>,
}

impl<S> Default for ConnectionArgs<'_, S> {
    fn default() -> Self {
        Self {
            session: None,
            host: None,
            port: None,
        }
    }
}

impl<'a, S> ConnectionArgs<'a, S> {
    /// Use an already open session.
    pub fn session(session: &'a mut S) -> Self {
        Self {
            session: Some(session),
            ..Self::default()
        }
    }

    /// Connect to `host` for the duration of the operation.
    pub fn host(host: impl Into<String>) -> Self {
        Self {
            host: Some(host.into()),
            ..Self::default()
        }
    }

    /// Connect to `candidate`.
    #[must_use]
    pub fn candidate(candidate: &HostCandidate) -> Self {
        Self {
            host: Some(candidate.host.clone()),
            port: candidate.port,
            ..Self::default()
        }
    }

    /// Port to use with [`ConnectionArgs::host`].
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }
}

/// NDS client over a backend [`Connector`].
#[derive(Debug)]
pub struct NdsClient<C, K = Kinit> {
    connector: C,
    refresher: K,
}

impl<C: Connector> NdsClient<C> {
    /// Client refreshing credentials with `kinit`.
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            refresher: Kinit::default(),
        }
    }
}

impl<C: Connector, K: CredentialRefresher> NdsClient<C, K> {
    /// Replace the credential refresher.
    pub fn with_refresher<R: CredentialRefresher>(self, refresher: R) -> NdsClient<C, R> {
        NdsClient {
            connector: self.connector,
            refresher,
        }
    }

    /// The underlying connector.
    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Open an authenticated session.
    ///
    /// # Errors
    ///
    /// See [`auth_connect`].
    pub fn connect(&self, host: &str, port: Option<u16>) -> Result<C::Session> {
        auth_connect(&self.connector, &self.refresher, host, port)
    }

    /// Connect to the first reachable candidate, trying them in order.
    ///
    /// # Errors
    ///
    /// [`ClientError::NoHosts`] for an empty list, otherwise
    /// [`ClientError::NoReachableHost`] carrying the last failure.
    pub fn connect_first(&self, hosts: &[HostCandidate]) -> Result<(HostCandidate, C::Session)> {
        let mut last = None;
        for candidate in hosts {
            match self.connect(&candidate.host, candidate.port) {
                Ok(session) => {
                    info!(host = %candidate, "Connected to NDS server");
                    return Ok((candidate.clone(), session));
                }
                Err(err) => {
                    warn!(host = %candidate, error = %err, "NDS server unavailable, trying next");
                    last = Some(err);
                }
            }
        }
        match last {
            Some(err) => Err(ClientError::NoReachableHost {
                tried: hosts.len(),
                last: Box::new(err),
            }),
            None => Err(ClientError::NoHosts),
        }
    }

    /// Run `op` with the session described by `target`.
    ///
    /// A borrowed session is passed through; a host is connected to with
    /// [`NdsClient::connect`] and the session dropped when `op` returns.
    ///
    /// # Errors
    ///
    /// [`ClientError::MissingConnection`] if `target` names neither, plus
    /// any connection or `op` error.
    pub fn with_session<R, F>(&self, target: ConnectionArgs<'_, C::Session>, op: F) -> Result<R>
    where
        F: FnOnce(&mut C::Session) -> Result<R>,
    {
        match target {
            ConnectionArgs {
                session: Some(session),
                ..
            } => op(session),
            ConnectionArgs {
                host: Some(host),
                port,
                ..
            } => {
                let mut session = self.connect(&host, port)?;
                op(&mut session)
            }
            _ => Err(ClientError::MissingConnection),
        }
    }

    /// [`discovery::find_channels`] against `target`.
    ///
    /// # Errors
    ///
    /// See [`NdsClient::with_session`] and [`discovery::find_channels`].
    pub fn find_channels<N: NdsName>(
        &self,
        target: ConnectionArgs<'_, C::Session>,
        channels: &[N],
        options: &FindOptions,
    ) -> Result<Vec<ChannelDescriptor>> {
        self.with_session(target, |session| {
            discovery::find_channels(session, channels, options)
        })
    }

    /// [`availability::get_availability`] against `target`.
    ///
    /// # Errors
    ///
    /// See [`NdsClient::with_session`] and [`availability::get_availability`].
    pub fn get_availability<N: NdsName>(
        &self,
        target: ConnectionArgs<'_, C::Session>,
        channels: &[N],
        start: i64,
        end: i64,
    ) -> Result<BTreeMap<String, SegmentList>> {
        self.with_session(target, |session| {
            availability::get_availability(session, channels, start, end)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockConnector, MockRefresher, MockSession, SessionCall};
    use crate::session::{BackendError, NdsSession, SessionEpoch};
    use nds_core::{ChannelType, DataType};

    fn client(connector: MockConnector) -> NdsClient<MockConnector, MockRefresher> {
        NdsClient::new(connector).with_refresher(MockRefresher::default())
    }

    #[test]
    fn test_with_session_requires_target() {
        let client = client(MockConnector::new(MockSession::new()));
        let result = client.with_session(ConnectionArgs::default(), |_| Ok(()));
        assert!(matches!(result, Err(ClientError::MissingConnection)));
        assert!(client.connector().connect_calls().is_empty());
    }

    #[test]
    fn test_with_session_injects_connection() {
        let client = client(MockConnector::new(MockSession::new().with_protocol(7)));
        let protocol = client
            .with_session(ConnectionArgs::host("test"), |session| {
                Ok(session.protocol_version())
            })
            .unwrap();
        assert_eq!(protocol, 7);

        client
            .with_session(ConnectionArgs::host("test").port(31201), |_| Ok(()))
            .unwrap();
        assert_eq!(
            client.connector().connect_calls(),
            vec![("test".to_string(), None), ("test".to_string(), Some(31201))]
        );
    }

    #[test]
    fn test_with_session_prefers_open_session() {
        let client = client(MockConnector::new(MockSession::new()));
        let mut open = MockSession::new().with_protocol(1);
        let protocol = client
            .with_session(ConnectionArgs::session(&mut open), |session| {
                Ok(session.protocol_version())
            })
            .unwrap();
        assert_eq!(protocol, 1);
        assert!(client.connector().connect_calls().is_empty());
    }

    #[test]
    fn test_find_channels_via_host() {
        let chan = ChannelDescriptor::new("X1:test", ChannelType::MTrend, 1.0 / 60.0, DataType::Float64);
        let connector = MockConnector::new(MockSession::new().with_channels(vec![chan.clone()]));
        let client = client(connector);

        let found = client
            .find_channels(ConnectionArgs::host("test.nds2"), &["X1:test"], &FindOptions::new())
            .unwrap();
        assert_eq!(found, vec![chan]);
        assert_eq!(client.connector().connect_calls(), vec![("test.nds2".to_string(), None)]);
        assert_eq!(
            client.connector().template().calls()[0],
            SessionCall::SetEpoch(SessionEpoch::All)
        );
    }

    #[test]
    fn test_connect_first_skips_failures() {
        let connector = MockConnector::new(MockSession::new())
            .fail_host("down.example", BackendError::new("connection refused"));
        let client = client(connector);
        let hosts = vec![
            HostCandidate::new("down.example", Some(31200)),
            HostCandidate::new("up.example", Some(31200)),
            HostCandidate::new("never.example", None),
        ];

        let (chosen, _session) = client.connect_first(&hosts).unwrap();
        assert_eq!(chosen, hosts[1]);
        assert_eq!(
            client.connector().connect_calls(),
            vec![
                ("down.example".to_string(), Some(31200)),
                ("up.example".to_string(), Some(31200)),
            ]
        );
    }

    #[test]
    fn test_connect_first_all_down() {
        let connector = MockConnector::new(MockSession::new())
            .fail_host("a", BackendError::new("refused a"))
            .fail_host("b", BackendError::new("refused b"));
        let client = client(connector);
        let hosts = vec![HostCandidate::new("a", None), HostCandidate::new("b", None)];

        let err = client.connect_first(&hosts).unwrap_err();
        assert!(matches!(err, ClientError::NoReachableHost { tried: 2, .. }));
        assert!(err.to_string().contains("refused b"));

        assert!(matches!(client.connect_first(&[]), Err(ClientError::NoHosts)));
    }
}
