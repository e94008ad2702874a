//! Channel discovery.
//!
//! [`find_channels`] turns caller channel references into `find_channels`
//! RPCs:
//!
//! - `name,type` suffixes select a single channel type, otherwise the
//!   configured type (default: every type) is used
//! - the dtype filter defaults to every data type
//! - sample-rate bounds are only sent to protocol 2+ servers; NDS1 accepts
//!   no rate arguments
//!
//! With [`FindOptions::unique`] each query must resolve to exactly one
//! channel. A channel served by both the online feed and the archive comes
//! back twice; the online copy is dropped before counting.

use nds_core::{
    ChannelDescriptor, ChannelQuery, ChannelType, DataType, NdsFlag, NdsName, Sample, SampleRate,
};
use tracing::debug;

use crate::error::{ClientError, Result};
use crate::session::{FindRequest, NdsSession, SessionEpoch};

/// Filters and behaviour for [`find_channels`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    /// Channel type for queries without a `,type` suffix (`None`: any)
    pub channel_type: Option<ChannelType>,
    /// Sample encoding (`None`: any)
    pub data_type: Option<DataType>,
    /// Sample-rate filter
    pub sample_rate: Option<SampleRate>,
    /// Require exactly one match per query
    pub unique: bool,
    /// Epoch set on the session before querying
    pub epoch: SessionEpoch,
}

impl FindOptions {
    /// Default options: any type, any dtype, no rate filter, epoch `ALL`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the channel type used for unsuffixed queries.
    #[must_use]
    pub fn channel_type(mut self, channel_type: ChannelType) -> Self {
        self.channel_type = Some(channel_type);
        self
    }

    /// Set the data type filter.
    #[must_use]
    pub fn data_type(mut self, data_type: DataType) -> Self {
        self.data_type = Some(data_type);
        self
    }

    /// Filter on the encoding stored as `T`, e.g. `dtype::<f64>()`.
    #[must_use]
    pub fn dtype<T: Sample>(self) -> Self {
        self.data_type(DataType::of::<T>())
    }

    /// Set the sample-rate filter.
    #[must_use]
    pub fn sample_rate(mut self, rate: impl Into<SampleRate>) -> Self {
        self.sample_rate = Some(rate.into());
        self
    }

    /// Require a unique match per query.
    #[must_use]
    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    /// Set the session epoch.
    #[must_use]
    pub fn epoch(mut self, epoch: SessionEpoch) -> Self {
        self.epoch = epoch;
        self
    }
}

/// Find channels matching each of `channels`.
///
/// Results are concatenated in query order. With `options.unique` the
/// result has exactly one descriptor per query.
///
/// # Errors
///
/// - [`ClientError::Lookup`] for an unknown `,type` suffix
/// - [`ClientError::Backend`] if an RPC fails
/// - [`ClientError::NotUnique`] if a query does not resolve to one channel
///   under `options.unique`; no partial result is returned
pub fn find_channels<S, N>(
    session: &mut S,
    channels: &[N],
    options: &FindOptions,
) -> Result<Vec<ChannelDescriptor>>
where
    S: NdsSession + ?Sized,
    N: NdsName,
{
    session.set_epoch(&options.epoch)?;

    let protocol = session.protocol_version();
    let type_mask = options
        .channel_type
        .map_or_else(ChannelType::any, ChannelType::value);
    let data_type = options
        .data_type
        .map_or_else(DataType::any, DataType::value);
    let sample_rate = match options.sample_rate {
        Some(rate) if protocol >= 2 => Some(rate.bounds()),
        Some(rate) => {
            debug!(protocol, rate = ?rate, "Server does not support rate filters, ignoring");
            None
        }
        None => None,
    };

    let mut found = Vec::new();
    for channel in channels {
        let name = channel.nds_name();
        let query = ChannelQuery::parse(&name)?;
        let request = FindRequest {
            pattern: query.request_pattern(protocol).into_owned(),
            channel_type: query.type_mask(type_mask),
            data_type,
            sample_rate,
        };
        debug!(query = %name, request = ?request, "Querying NDS channels");

        let matches = session.find_channels(&request)?;
        if options.unique {
            found.push(select_unique(&name, matches)?);
        } else {
            found.extend(matches);
        }
    }
    Ok(found)
}

/// Reduce `matches` to the single channel `query` refers to.
///
/// An online descriptor is dropped when a non-online descriptor of the same
/// signal (name, rate, dtype) is present. Any other multiplicity, including
/// two identical archive copies, is ambiguous.
fn select_unique(query: &str, mut matches: Vec<ChannelDescriptor>) -> Result<ChannelDescriptor> {
    if matches.len() > 1 {
        let archived: Vec<ChannelDescriptor> =
            matches.iter().filter(|c| !c.is_online()).cloned().collect();
        matches.retain(|c| !(c.is_online() && archived.iter().any(|a| a.same_signal(c))));
    }

    let count = matches.len();
    match matches.pop() {
        Some(only) if count == 1 => Ok(only),
        _ => Err(ClientError::NotUnique {
            query: query.to_string(),
            matches: count,
        }),
    }
}
