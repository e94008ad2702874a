//! # ndskit
//!
//! Helpers for talking to NDS2 servers: choosing which servers to try,
//! discovering channels, aligning minute-trend requests and checking data
//! availability.
//!
//! The work is split across the workspace:
//! - [`nds_core`]: channel/data type flags, queries, GPS time, segments
//! - [`nds_client`]: host resolution, authenticated connect, discovery
//! - this crate: configuration, logging setup and the `ndskit` CLI
//!
//! Both member crates are re-exported.

pub mod config;
pub mod logging;

pub use nds_client;
pub use nds_core;

pub use config::{ConfigError, LoggingConfig, NdsKitConfig};
pub use logging::{OutputFormat, TracingConfig};
