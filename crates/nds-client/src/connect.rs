//! Opening NDS sessions.
//!
//! - [`connect`]: plain connect, picking the NDS1 port for `x1ndsN` hosts
//! - [`auth_connect`]: connect, refreshing Kerberos credentials once if the
//!   server asks for SASL authentication
//!
//! Ticket acquisition itself is delegated to a [`CredentialRefresher`];
//! [`Kinit`] runs the system `kinit` executable.

use std::process::Command;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::error::{ClientError, Result};
use crate::session::{BackendError, Connector};

/// Port served by NDS1 front-ends.
pub const NDS1_PORT: u16 = 8088;

/// Matches NDS1 front-end hostnames such as `l1nds0`.
static NDS1_HOSTNAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]1nds[0-9]$").expect("Invalid NDS1 hostname regex"));

/// Port to connect with: `port` if given, [`NDS1_PORT`] for NDS1 hosts,
/// otherwise `None` (library default).
#[must_use]
pub fn effective_port(host: &str, port: Option<u16>) -> Option<u16> {
    match port {
        Some(port) => Some(port),
        None if NDS1_HOSTNAME.is_match(host) => Some(NDS1_PORT),
        None => None,
    }
}

/// Open a session to `host`.
///
/// # Errors
///
/// Returns the backend's error unchanged.
pub fn connect<C: Connector>(
    connector: &C,
    host: &str,
    port: Option<u16>,
) -> std::result::Result<C::Session, BackendError> {
    let port = effective_port(host, port);
    debug!(host, port = ?port, "Connecting to NDS server");
    connector.connect(host, port)
}

/// Refreshes authentication credentials.
pub trait CredentialRefresher {
    /// Obtain fresh credentials.
    fn refresh(&self) -> Result<()>;
}

/// Runs `kinit` to obtain a Kerberos ticket.
#[derive(Debug, Clone)]
pub struct Kinit {
    program: String,
}

impl Default for Kinit {
    fn default() -> Self {
        Self {
            program: "kinit".to_string(),
        }
    }
}

impl Kinit {
    /// Run `program` instead of `kinit`.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl CredentialRefresher for Kinit {
    fn refresh(&self) -> Result<()> {
        debug!(program = %self.program, "Refreshing Kerberos credentials");
        let status = Command::new(&self.program)
            .status()
            .map_err(|e| ClientError::Credential(format!("failed to run {}: {e}", self.program)))?;
        if status.success() {
            Ok(())
        } else {
            Err(ClientError::Credential(format!(
                "{} exited with {status}",
                self.program
            )))
        }
    }
}

/// Open a session, retrying once after a credential refresh if the server
/// requires SASL authentication.
///
/// # Errors
///
/// Any failure other than the SASL request, or the retry's failure, is
/// returned unchanged as [`ClientError::Backend`]. A failed refresh returns
/// the refresher's error.
pub fn auth_connect<C, K>(
    connector: &C,
    refresher: &K,
    host: &str,
    port: Option<u16>,
) -> Result<C::Session>
where
    C: Connector,
    K: CredentialRefresher + ?Sized,
{
    match connect(connector, host, port) {
        Ok(session) => return Ok(session),
        Err(err) if err.is_sasl_auth_required() => {
            warn!(host, port = ?port, "Error authenticating against NDS server, refreshing credentials");
        }
        Err(err) => return Err(err.into()),
    }
    refresher.refresh()?;
    Ok(connect(connector, host, port)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockConnector, MockRefresher, MockSession};
    use tracing_test::traced_test;

    #[test]
    fn test_effective_port() {
        assert_eq!(effective_port("nds.test.ndskit", None), None);
        assert_eq!(effective_port("nds.test.ndskit", Some(31200)), Some(31200));
        assert_eq!(effective_port("x1nds9", None), Some(NDS1_PORT));
        assert_eq!(effective_port("x1nds9", Some(1)), Some(1));
        assert_eq!(effective_port("x1nds10", None), None);
    }

    #[test]
    fn test_connect_passes_resolved_port() {
        let connector = MockConnector::new(MockSession::new());
        connect(&connector, "nds.test.ndskit", None).unwrap();
        connect(&connector, "x1nds9", None).unwrap();
        assert_eq!(
            connector.connect_calls(),
            vec![
                ("nds.test.ndskit".to_string(), None),
                ("x1nds9".to_string(), Some(NDS1_PORT)),
            ]
        );
    }

    #[test]
    fn test_auth_connect_plain() {
        let connector = MockConnector::new(MockSession::new());
        let refresher = MockRefresher::default();
        auth_connect(&connector, &refresher, "host", Some(1)).unwrap();
        assert_eq!(connector.connect_calls(), vec![("host".to_string(), Some(1))]);
        assert_eq!(refresher.refresh_count(), 0);
    }

    #[test]
    #[traced_test]
    fn test_auth_connect_kinit() {
        let connector = MockConnector::new(MockSession::new()).fail_next(BackendError::new(
            "Request SASL authentication something something",
        ));
        let refresher = MockRefresher::default();

        assert!(auth_connect(&connector, &refresher, "host", Some(1)).is_ok());
        assert_eq!(refresher.refresh_count(), 1);
        assert_eq!(connector.connect_calls().len(), 2);
        assert!(logs_contain("Error authenticating against NDS server"));
    }

    #[test]
    fn test_auth_connect_error() {
        let connector =
            MockConnector::new(MockSession::new()).fail_next(BackendError::new("Anything else"));
        let refresher = MockRefresher::default();

        let err = auth_connect(&connector, &refresher, "host", Some(1)).unwrap_err();
        assert_eq!(err.to_string(), "Anything else");
        assert_eq!(connector.connect_calls().len(), 1);
        assert_eq!(refresher.refresh_count(), 0);
    }

    #[test]
    fn test_auth_connect_gives_up_after_one_retry() {
        let sasl = BackendError::new("Request SASL authentication");
        let connector = MockConnector::new(MockSession::new())
            .fail_next(sasl.clone())
            .fail_next(sasl);
        let refresher = MockRefresher::default();

        let err = auth_connect(&connector, &refresher, "host", None).unwrap_err();
        assert!(matches!(err, ClientError::Backend(ref e) if e.is_sasl_auth_required()));
        assert_eq!(connector.connect_calls().len(), 2);
        assert_eq!(refresher.refresh_count(), 1);
    }

    #[test]
    fn test_auth_connect_refresh_failure() {
        let connector = MockConnector::new(MockSession::new())
            .fail_next(BackendError::new("Request SASL authentication"));
        let refresher = MockRefresher::failing("no keytab");

        let err = auth_connect(&connector, &refresher, "host", None).unwrap_err();
        assert!(matches!(err, ClientError::Credential(_)));
        assert_eq!(connector.connect_calls().len(), 1);
    }

    #[test]
    fn test_kinit_missing_program() {
        let kinit = Kinit::with_program("/nonexistent/ndskit-kinit");
        assert!(matches!(kinit.refresh(), Err(ClientError::Credential(_))));
    }
}
