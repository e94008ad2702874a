//! Channel descriptors and request-name rendering.
//!
//! Two channel shapes flow through a client:
//! - [`ChannelDescriptor`]: what a server returned from `find_channels`
//! - [`Channel`]: a caller-side name with an optional free-form type label
//!
//! [`NdsName`] renders either (or a plain string) as the name sent back to
//! the server in later requests.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::channel_type::ChannelType;
use crate::data_type::DataType;
use crate::error::LookupError;
use crate::flags::NdsFlag;

/// A channel as reported by an NDS server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelDescriptor {
    /// Channel name, e.g. `L1:GDS-CALIB_STRAIN`
    pub name: String,
    /// Data product type
    pub channel_type: ChannelType,
    /// Sample rate in Hz
    pub sample_rate: f64,
    /// Sample encoding
    pub data_type: DataType,
}

impl ChannelDescriptor {
    /// Create a descriptor.
    pub fn new(
        name: impl Into<String>,
        channel_type: ChannelType,
        sample_rate: f64,
        data_type: DataType,
    ) -> Self {
        Self {
            name: name.into(),
            channel_type,
            sample_rate,
            data_type,
        }
    }

    /// Returns `true` if this copy comes from the online feed.
    #[must_use]
    pub fn is_online(&self) -> bool {
        self.channel_type == ChannelType::Online
    }

    /// Returns `true` if both describe the same signal, ignoring the type.
    #[must_use]
    pub fn same_signal(&self, other: &Self) -> bool {
        self.name == other.name
            && self.sample_rate == other.sample_rate
            && self.data_type == other.data_type
    }
}

impl fmt::Display for ChannelDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {} Hz, {})",
            self.name, self.channel_type, self.sample_rate, self.data_type
        )
    }
}

/// A caller-side channel reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Channel {
    /// Channel name
    pub name: String,
    /// Optional type label, e.g. `m-trend`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl Channel {
    /// A channel with no type label.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: None,
        }
    }

    /// Set the type label.
    #[must_use]
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// The labelled channel type, if any.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] if the label is not a known channel type.
    pub fn channel_type(&self) -> Result<Option<ChannelType>, LookupError> {
        self.kind.as_deref().map(ChannelType::find).transpose()
    }
}

/// Renders a channel reference as the name used in NDS2 requests.
pub trait NdsName {
    /// The request name.
    fn nds_name(&self) -> Cow<'_, str>;
}

impl NdsName for str {
    fn nds_name(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl NdsName for String {
    fn nds_name(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.as_str())
    }
}

/// `name` when unlabelled, `name,kind` otherwise.
impl NdsName for Channel {
    fn nds_name(&self) -> Cow<'_, str> {
        match &self.kind {
            Some(kind) => Cow::Owned(format!("{},{}", self.name, kind)),
            None => Cow::Borrowed(self.name.as_str()),
        }
    }
}

/// Always `name,type`; an unknown type renders as `raw`.
impl NdsName for ChannelDescriptor {
    fn nds_name(&self) -> Cow<'_, str> {
        let kind = match self.channel_type {
            ChannelType::Unknown => ChannelType::Raw,
            other => other,
        };
        Cow::Owned(format!("{},{}", self.name, kind.nds2name()))
    }
}

impl<T: NdsName + ?Sized> NdsName for &T {
    fn nds_name(&self) -> Cow<'_, str> {
        (**self).nds_name()
    }
}
