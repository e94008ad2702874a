//! Scripted NDS backend for tests.
//!
//! [`MockSession`] returns canned channels and availability and records
//! every call. `find_channels` answers with the canned channels whose name
//! equals the request pattern and whose type and dtype fall in the masks. Clones share the call log, so a session handed out by
//! [`MockConnector`] can still be inspected through the connector's template.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use nds_core::{ChannelDescriptor, NdsFlag, NdsName, Segment, SegmentList};
use parking_lot::Mutex;

use crate::connect::CredentialRefresher;
use crate::error::{ClientError, Result};
use crate::session::{
    BackendError, ChannelAvailability, Connector, FindRequest, NdsSession, SessionEpoch,
};

/// A call made on a [`MockSession`].
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCall {
    /// `set_epoch`
    SetEpoch(SessionEpoch),
    /// `find_channels`
    FindChannels(FindRequest),
    /// `get_availability`
    GetAvailability(Vec<String>),
}

/// In-memory [`NdsSession`].
#[derive(Debug, Clone)]
pub struct MockSession {
    protocol: u32,
    epoch: SessionEpoch,
    channels: Vec<ChannelDescriptor>,
    availability: HashMap<String, SegmentList>,
    omitted: Vec<String>,
    find_error: Option<BackendError>,
    availability_error: Option<BackendError>,
    calls: Arc<Mutex<Vec<SessionCall>>>,
}

impl Default for MockSession {
    fn default() -> Self {
        Self {
            protocol: 2,
            epoch: SessionEpoch::All,
            channels: Vec::new(),
            availability: HashMap::new(),
            omitted: Vec::new(),
            find_error: None,
            availability_error: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl MockSession {
    /// Protocol 2 session with no channels.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `protocol` as the server protocol version.
    #[must_use]
    pub fn with_protocol(mut self, protocol: u32) -> Self {
        self.protocol = protocol;
        self
    }

    /// Start in `epoch`.
    #[must_use]
    pub fn with_epoch(mut self, epoch: SessionEpoch) -> Self {
        self.epoch = epoch;
        self
    }

    /// Return `channels` from every `find_channels` call.
    #[must_use]
    pub fn with_channels(mut self, channels: Vec<ChannelDescriptor>) -> Self {
        self.channels = channels;
        self
    }

    /// Segments returned for request name `name`.
    #[must_use]
    pub fn with_availability(mut self, name: impl Into<String>, segments: Vec<(i64, i64)>) -> Self {
        let list = segments
            .into_iter()
            .map(|(start, end)| Segment::new(start, end))
            .collect();
        self.availability.insert(name.into(), list);
        self
    }

    /// Leave `name` out of `get_availability` answers.
    #[must_use]
    pub fn omit_availability(mut self, name: impl Into<String>) -> Self {
        self.omitted.push(name.into());
        self
    }

    /// Fail every `find_channels` call with `err`.
    #[must_use]
    pub fn fail_find(mut self, err: BackendError) -> Self {
        self.find_error = Some(err);
        self
    }

    /// Fail every `get_availability` call with `err`.
    #[must_use]
    pub fn fail_availability(mut self, err: BackendError) -> Self {
        self.availability_error = Some(err);
        self
    }

    /// Every call made so far, on this session or any clone.
    #[must_use]
    pub fn calls(&self) -> Vec<SessionCall> {
        self.calls.lock().clone()
    }

    /// The `find_channels` requests made so far.
    #[must_use]
    pub fn find_requests(&self) -> Vec<FindRequest> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                SessionCall::FindChannels(request) => Some(request.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: SessionCall) {
        self.calls.lock().push(call);
    }
}

impl NdsSession for MockSession {
    fn protocol_version(&self) -> u32 {
        self.protocol
    }

    fn set_epoch(&mut self, epoch: &SessionEpoch) -> std::result::Result<(), BackendError> {
        self.record(SessionCall::SetEpoch(epoch.clone()));
        self.epoch = epoch.clone();
        Ok(())
    }

    fn current_epoch(&self) -> SessionEpoch {
        self.epoch.clone()
    }

    fn find_channels(
        &mut self,
        request: &FindRequest,
    ) -> std::result::Result<Vec<ChannelDescriptor>, BackendError> {
        self.record(SessionCall::FindChannels(request.clone()));
        match &self.find_error {
            Some(err) => Err(err.clone()),
            None => Ok(self
                .channels
                .iter()
                .filter(|c| {
                    (c.name == request.pattern || c.nds_name() == request.pattern)
                        && request.channel_type & c.channel_type.value() != 0
                        && request.data_type & c.data_type.value() != 0
                })
                .cloned()
                .collect()),
        }
    }

    fn get_availability(
        &mut self,
        names: &[String],
    ) -> std::result::Result<Vec<ChannelAvailability>, BackendError> {
        self.record(SessionCall::GetAvailability(names.to_vec()));
        if let Some(err) = &self.availability_error {
            return Err(err.clone());
        }
        Ok(names
            .iter()
            .filter(|name| !self.omitted.contains(name))
            .map(|name| ChannelAvailability {
                name: name.clone(),
                segments: self.availability.get(name).cloned().unwrap_or_default(),
            })
            .collect())
    }
}

/// [`Connector`] handing out clones of a template [`MockSession`].
#[derive(Debug)]
pub struct MockConnector {
    template: MockSession,
    failures: Mutex<VecDeque<BackendError>>,
    host_failures: HashMap<String, BackendError>,
    calls: Mutex<Vec<(String, Option<u16>)>>,
}

impl MockConnector {
    /// Connector whose sessions clone `template`.
    #[must_use]
    pub fn new(template: MockSession) -> Self {
        Self {
            template,
            failures: Mutex::new(VecDeque::new()),
            host_failures: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fail the next connect attempt (queued, one per call).
    #[must_use]
    pub fn fail_next(self, err: BackendError) -> Self {
        self.failures.lock().push_back(err);
        self
    }

    /// Always fail connections to `host`.
    #[must_use]
    pub fn fail_host(mut self, host: impl Into<String>, err: BackendError) -> Self {
        self.host_failures.insert(host.into(), err);
        self
    }

    /// The template session (shares its call log with handed-out sessions).
    #[must_use]
    pub fn template(&self) -> &MockSession {
        &self.template
    }

    /// `(host, port)` of every connect attempt.
    #[must_use]
    pub fn connect_calls(&self) -> Vec<(String, Option<u16>)> {
        self.calls.lock().clone()
    }
}

impl Connector for MockConnector {
    type Session = MockSession;

    fn connect(
        &self,
        host: &str,
        port: Option<u16>,
    ) -> std::result::Result<MockSession, BackendError> {
        self.calls.lock().push((host.to_string(), port));
        if let Some(err) = self.host_failures.get(host) {
            return Err(err.clone());
        }
        match self.failures.lock().pop_front() {
            Some(err) => Err(err),
            None => Ok(self.template.clone()),
        }
    }
}

/// [`CredentialRefresher`] counting refreshes.
#[derive(Debug, Default)]
pub struct MockRefresher {
    count: Mutex<usize>,
    error: Option<String>,
}

impl MockRefresher {
    /// A refresher that always fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            count: Mutex::new(0),
            error: Some(message.into()),
        }
    }

    /// Number of `refresh` calls.
    #[must_use]
    pub fn refresh_count(&self) -> usize {
        *self.count.lock()
    }
}

impl CredentialRefresher for MockRefresher {
    fn refresh(&self) -> Result<()> {
        *self.count.lock() += 1;
        match &self.error {
            Some(message) => Err(ClientError::Credential(message.clone())),
            None => Ok(()),
        }
    }
}
