//! Data availability queries.

use std::collections::{BTreeMap, HashMap};

use nds_core::{NdsName, SegmentList};
use tracing::{debug, warn};

use crate::discovery::{find_channels, FindOptions};
use crate::error::{ClientError, Result};
use crate::session::{NdsSession, SessionEpoch};

/// Segments with data for each channel in `[start, end)`.
///
/// Each channel is first resolved to a unique server-side channel, then
/// availability is requested by the resolved names. The result is keyed by
/// the caller's channel names. The session's epoch is restored afterwards,
/// also when the query fails.
///
/// # Errors
///
/// Propagates discovery errors (including non-unique matches) and backend
/// failures. [`ClientError::MissingAvailability`] if the server leaves a
/// resolved channel out of its answer.
pub fn get_availability<S, N>(
    session: &mut S,
    channels: &[N],
    start: i64,
    end: i64,
) -> Result<BTreeMap<String, SegmentList>>
where
    S: NdsSession + ?Sized,
    N: NdsName,
{
    let previous = session.current_epoch();
    let epoch = SessionEpoch::Gps { start, end };
    session.set_epoch(&epoch)?;

    let result = query_availability(session, channels, epoch);

    match (session.set_epoch(&previous), result) {
        (Ok(()), result) => result,
        (Err(restore), Ok(_)) => Err(restore.into()),
        (Err(restore), Err(err)) => {
            warn!(error = %restore, "Failed to restore NDS session epoch");
            Err(err)
        }
    }
}

fn query_availability<S, N>(
    session: &mut S,
    channels: &[N],
    epoch: SessionEpoch,
) -> Result<BTreeMap<String, SegmentList>>
where
    S: NdsSession + ?Sized,
    N: NdsName,
{
    let options = FindOptions::new().unique(true).epoch(epoch);
    let names: Vec<String> = find_channels(session, channels, &options)?
        .iter()
        .map(|c| c.nds_name().into_owned())
        .collect();
    debug!(names = ?names, "Querying NDS availability");

    let by_name: HashMap<String, SegmentList> = session
        .get_availability(&names)?
        .into_iter()
        .map(|availability| (availability.name, availability.segments))
        .collect();

    channels
        .iter()
        .zip(&names)
        .map(|(channel, name)| {
            by_name
                .get(name)
                .cloned()
                .map(|segments| (channel.nds_name().into_owned(), segments))
                .ok_or_else(|| ClientError::MissingAvailability(name.clone()))
        })
        .collect()
}
