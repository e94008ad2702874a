//! Core value types for NDS2 clients.
//!
//! This crate holds the pure, I/O-free pieces shared by the client and the
//! CLI: channel and data type flags, channel queries and descriptors, GPS
//! time handling and availability segments.

pub mod channel;
pub mod channel_type;
pub mod data_type;
pub mod error;
pub mod flags;
pub mod query;
pub mod segments;
pub mod time;

pub use channel::{Channel, ChannelDescriptor, NdsName};
pub use channel_type::ChannelType;
pub use data_type::{DataType, Sample};
pub use error::{LookupError, TimeError};
pub use flags::{FlagIndex, FlagKey, NdsFlag};
pub use query::{ChannelQuery, SampleRate};
pub use segments::{Segment, SegmentList};
pub use time::{align_minute_trend, gps_now, parse_gps, to_gps, Epoch};
