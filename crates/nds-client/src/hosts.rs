//! NDS server host resolution.
//!
//! Builds the ordered list of servers to try for a query:
//!
//! 1. Servers listed in the environment (`NDSSERVER`, else `LIGONDSIP`, or a
//!    caller-named variable) as comma-separated `host[:port]` tokens
//! 2. The site's own server(s) from a static table
//! 3. The central archive server `nds.ligo.caltech.edu:31200`
//!
//! Site servers only keep recent data. When the query epoch is older than
//! the lookback window (14 days by default) the archive server is promoted
//! ahead of the site servers.
//!
//! # Example
//!
//! ```
//! use nds_client::env::{EnvSelection, StaticEnv};
//! use nds_client::hosts::{HostCandidate, HostResolver, ResolverSettings};
//! use nds_core::Epoch;
//!
//! let resolver = HostResolver::with_env(ResolverSettings::default(), StaticEnv::new());
//! let hosts = resolver.resolve(Some("L1"), &Epoch::Now, &EnvSelection::Default)?;
//! assert_eq!(hosts[0], HostCandidate::new("nds.ligo-la.caltech.edu", Some(31200)));
//! # Ok::<(), nds_core::TimeError>(())
//! ```

use std::fmt;

use nds_core::{gps_now, Epoch, TimeError};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::env::{EnvSelection, EnvSource, ProcessEnv};

/// Default NDS2 server port.
pub const DEFAULT_NDS_PORT: u16 = 31200;

/// Central archive server, always tried last for recent data.
pub const DEFAULT_NDS_HOST: &str = "nds.ligo.caltech.edu";

/// Primary server-list environment variable.
pub const PRIMARY_ENV: &str = "NDSSERVER";

/// Secondary server-list environment variable.
pub const SECONDARY_ENV: &str = "LIGONDSIP";

/// Site servers hold this many seconds of data by default (14 days).
pub const DEFAULT_LOOKBACK_SECS: u64 = 14 * 86_400;

/// Site identifier → site-local NDS servers.
const SITE_HOSTS: &[(&str, &[(&str, u16)])] = &[
    ("H1", &[("nds.ligo-wa.caltech.edu", DEFAULT_NDS_PORT)]),
    ("H0", &[("nds.ligo-wa.caltech.edu", DEFAULT_NDS_PORT)]),
    ("L1", &[("nds.ligo-la.caltech.edu", DEFAULT_NDS_PORT)]),
    ("L0", &[("nds.ligo-la.caltech.edu", DEFAULT_NDS_PORT)]),
    ("V1", &[(DEFAULT_NDS_HOST, DEFAULT_NDS_PORT)]),
    ("C1", &[("nds40.ligo.caltech.edu", DEFAULT_NDS_PORT)]),
    ("C0", &[("nds40.ligo.caltech.edu", DEFAULT_NDS_PORT)]),
];

/// One server to try.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HostCandidate {
    /// Hostname or address
    pub host: String,
    /// Port, or `None` for the client library's default
    pub port: Option<u16>,
}

impl HostCandidate {
    /// Create a candidate.
    pub fn new(host: impl Into<String>, port: Option<u16>) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Parse a `host[:port]` token. Returns `None` for an empty host or bad port.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        let (host, port) = match token.rsplit_once(':') {
            Some((host, port)) => (host.trim(), Some(port.trim().parse::<u16>().ok()?)),
            None => (token, None),
        };
        if host.is_empty() {
            return None;
        }
        Some(Self::new(host, port))
    }
}

impl fmt::Display for HostCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.port {
            Some(port) => write!(f, "{}:{}", self.host, port),
            None => f.write_str(&self.host),
        }
    }
}

/// Parse a comma-separated `host[:port]` list, keeping first occurrences only.
///
/// Empty and malformed tokens are skipped with a warning.
#[must_use]
pub fn parse_nds_env(value: &str) -> Vec<HostCandidate> {
    let mut hosts = Vec::new();
    for token in value.split(',').filter(|t| !t.trim().is_empty()) {
        match HostCandidate::parse(token) {
            Some(candidate) => push_unique(&mut hosts, candidate),
            None => warn!(token, "Ignoring malformed NDS server entry"),
        }
    }
    hosts
}

/// Site-local servers for `site`, or `None` if the site is not in the table.
///
/// Site identifiers are matched ignoring ASCII case.
#[must_use]
pub fn site_hosts(site: &str) -> Option<Vec<HostCandidate>> {
    SITE_HOSTS
        .iter()
        .find(|(id, _)| id.eq_ignore_ascii_case(site))
        .map(|(_, hosts)| {
            hosts
                .iter()
                .map(|(host, port)| HostCandidate::new(*host, Some(*port)))
                .collect()
        })
}

fn push_unique(hosts: &mut Vec<HostCandidate>, candidate: HostCandidate) {
    if !hosts.contains(&candidate) {
        hosts.push(candidate);
    }
}

/// Tunables for [`HostResolver`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverSettings {
    /// Primary server-list variable
    pub primary_env: String,
    /// Variable read when the primary one is unset or empty
    pub fallback_env: String,
    /// Archive server hostname
    pub default_host: String,
    /// Archive server port
    pub default_port: u16,
    /// Epochs older than this many seconds prefer the archive server
    pub lookback_secs: u64,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            primary_env: PRIMARY_ENV.to_string(),
            fallback_env: SECONDARY_ENV.to_string(),
            default_host: DEFAULT_NDS_HOST.to_string(),
            default_port: DEFAULT_NDS_PORT,
            lookback_secs: DEFAULT_LOOKBACK_SECS,
        }
    }
}

impl ResolverSettings {
    /// The archive server as a candidate.
    #[must_use]
    pub fn default_candidate(&self) -> HostCandidate {
        HostCandidate::new(self.default_host.clone(), Some(self.default_port))
    }
}

/// Produces ordered host candidate lists.
#[derive(Debug, Clone)]
pub struct HostResolver<E = ProcessEnv> {
    settings: ResolverSettings,
    env: E,
    now: Option<i64>,
}

impl HostResolver<ProcessEnv> {
    /// Resolver with default settings reading the process environment.
    #[must_use]
    pub fn new() -> Self {
        Self::with_env(ResolverSettings::default(), ProcessEnv)
    }
}

impl Default for HostResolver<ProcessEnv> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: EnvSource> HostResolver<E> {
    /// Resolver with explicit settings and environment.
    pub fn with_env(settings: ResolverSettings, env: E) -> Self {
        Self {
            settings,
            env,
            now: None,
        }
    }

    /// Pin "now" to a GPS time instead of reading the clock.
    #[must_use]
    pub fn at_gps(mut self, now: i64) -> Self {
        self.now = Some(now);
        self
    }

    /// The settings in use.
    #[must_use]
    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    /// Servers declared in the environment.
    #[must_use]
    pub fn env_hosts(&self, selection: &EnvSelection) -> Vec<HostCandidate> {
        let value = match selection {
            EnvSelection::Disabled => None,
            EnvSelection::Named(name) => self.env.get(name),
            EnvSelection::Default => self
                .non_empty(&self.settings.primary_env)
                .or_else(|| self.non_empty(&self.settings.fallback_env)),
        };
        value.map(|v| parse_nds_env(&v)).unwrap_or_default()
    }

    fn non_empty(&self, name: &str) -> Option<String> {
        self.env.get(name).filter(|v| !v.trim().is_empty())
    }

    /// Ordered candidates for `site` at `epoch`.
    ///
    /// Callers try candidates in order and stop at the first that connects.
    /// An unknown site logs a warning (unless the environment supplied
    /// servers) and falls back to the archive server.
    ///
    /// # Errors
    ///
    /// Returns [`TimeError`] if `epoch` cannot be converted to GPS time.
    pub fn resolve(
        &self,
        site: Option<&str>,
        epoch: &Epoch,
        env: &EnvSelection,
    ) -> Result<Vec<HostCandidate>, TimeError> {
        let mut hosts = self.env_hosts(env);
        let archive = self.settings.default_candidate();

        let Some(site) = site else {
            push_unique(&mut hosts, archive);
            debug!(hosts = ?hosts, "Resolved NDS hosts");
            return Ok(hosts);
        };

        let now = self.now.unwrap_or_else(gps_now);
        let start = epoch.start_gps(now)?;
        let lookback = i64::try_from(self.settings.lookback_secs).unwrap_or(i64::MAX);
        let archived = now.saturating_sub(start) > lookback;

        match site_hosts(site) {
            Some(local) if archived => {
                push_unique(&mut hosts, archive);
                local.into_iter().for_each(|h| push_unique(&mut hosts, h));
            }
            Some(local) => {
                local.into_iter().for_each(|h| push_unique(&mut hosts, h));
                push_unique(&mut hosts, archive);
            }
            None => {
                if hosts.is_empty() {
                    warn!(site, "No default NDS host found for site '{}'", site);
                }
                push_unique(&mut hosts, archive);
            }
        }

        debug!(site, start, archived, hosts = ?hosts, "Resolved NDS hosts");
        Ok(hosts)
    }
}

/// Resolve hosts with default settings against the process environment.
///
/// # Errors
///
/// Returns [`TimeError`] if `epoch` cannot be converted to GPS time.
pub fn resolve_hosts(
    site: Option<&str>,
    epoch: &Epoch,
    env: &EnvSelection,
) -> Result<Vec<HostCandidate>, TimeError> {
    HostResolver::new().resolve(site, epoch, env)
}
