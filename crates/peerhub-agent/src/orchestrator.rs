//! Connection orchestrator: the local session table.
//!
//! Owns the set of active peer sessions for one agent. At most one
//! session exists per peer id; discovery and inbound calls both race on
//! the table, and the first writer wins. The table is never shared
//! outside its owning agent.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use peerhub_core::error::AppError;
use peerhub_core::result::AppResult;
use peerhub_core::types::{EndpointId, ParticipantId};

use crate::transport::{LocalMedia, PeerTransport, SessionCloser, SessionEvent, SessionHandle};

/// Lifecycle state of one peer session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Dialed, not yet exchanging media.
    Connecting,
    /// Media flowing.
    Open,
    /// Closed by either side.
    Closed,
    /// Gave up after bounded recovery attempts.
    Failed,
}

/// Coarse connection quality grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionQuality {
    /// No media observed yet.
    Unknown,
    /// Media flowing normally.
    Good,
    /// The session reported a failure and is being recovered.
    Degraded,
}

#[derive(Debug)]
struct PeerSession {
    endpoint_id: EndpointId,
    state: SessionState,
    quality: ConnectionQuality,
    closer: Option<SessionCloser>,
    pump: Option<JoinHandle<()>>,
}

/// Manages one media session per discovered peer.
pub struct ConnectionOrchestrator {
    transport: Arc<dyn PeerTransport>,
    sessions: Arc<DashMap<ParticipantId, PeerSession>>,
    max_recovery_attempts: u32,
}

impl ConnectionOrchestrator {
    /// Create an orchestrator over the given transport.
    pub fn new(transport: Arc<dyn PeerTransport>, max_recovery_attempts: u32) -> Self {
        Self {
            transport,
            sessions: Arc::new(DashMap::new()),
            max_recovery_attempts,
        }
    }

    /// Whether a session (in any pre-close state) exists for `peer`.
    pub fn contains(&self, peer: &ParticipantId) -> bool {
        self.sessions.contains_key(peer)
    }

    /// Peers with a current session.
    pub fn peers(&self) -> Vec<ParticipantId> {
        self.sessions.iter().map(|e| e.key().clone()).collect()
    }

    /// Current state of the session with `peer`, if any.
    pub fn session_state(&self, peer: &ParticipantId) -> Option<SessionState> {
        self.sessions.get(peer).map(|s| s.state)
    }

    /// Current quality grade of the session with `peer`, if any.
    pub fn session_quality(&self, peer: &ParticipantId) -> Option<ConnectionQuality> {
        self.sessions.get(peer).map(|s| s.quality)
    }

    /// Dial a newly discovered peer. First-writer-wins: returns
    /// `Ok(false)` without dialing when a session for `peer` already
    /// exists.
    ///
    /// The slot is reserved before the network call so two concurrent
    /// discoveries of the same peer race on the table, not on the
    /// transport.
    pub async fn connect(
        &self,
        peer: ParticipantId,
        endpoint_id: EndpointId,
        media: &LocalMedia,
    ) -> AppResult<bool> {
        match self.sessions.entry(peer.clone()) {
            Entry::Occupied(_) => {
                debug!(peer = %peer, "Duplicate session attempt dropped");
                return Ok(false);
            }
            Entry::Vacant(slot) => {
                slot.insert(PeerSession {
                    endpoint_id: endpoint_id.clone(),
                    state: SessionState::Connecting,
                    quality: ConnectionQuality::Unknown,
                    closer: None,
                    pump: None,
                });
            }
        }

        let handle = match self.transport.call(&endpoint_id, media).await {
            Ok(handle) => handle,
            Err(e) => {
                self.sessions.remove(&peer);
                return Err(AppError::session(format!(
                    "Failed to open session with {peer}: {}",
                    e.message
                )));
            }
        };

        info!(peer = %peer, endpoint_id = %endpoint_id, "Opened outbound peer session");
        self.register(peer, endpoint_id, media.clone(), handle);
        Ok(true)
    }

    /// Adopt an inbound session from `peer`. First-writer-wins: when a
    /// session already exists the new one is closed, not layered on top.
    ///
    /// The slot is claimed through the entry API, same as [`Self::connect`],
    /// so an inbound call racing a concurrent outbound dial for the same
    /// peer can never overwrite the dial's reserved entry.
    pub fn adopt(
        &self,
        peer: ParticipantId,
        endpoint_id: EndpointId,
        session: SessionHandle,
        media: &LocalMedia,
    ) -> bool {
        match self.sessions.entry(peer.clone()) {
            Entry::Occupied(_) => {
                debug!(peer = %peer, "Inbound session for connected peer dropped");
                session.closer().close();
                return false;
            }
            Entry::Vacant(slot) => {
                slot.insert(PeerSession {
                    endpoint_id: endpoint_id.clone(),
                    state: SessionState::Connecting,
                    quality: ConnectionQuality::Unknown,
                    closer: None,
                    pump: None,
                });
            }
        }

        info!(peer = %peer, endpoint_id = %endpoint_id, "Adopted inbound peer session");
        self.register(peer, endpoint_id, media.clone(), session);
        true
    }

    /// Close every session and clear the table.
    pub fn close_all(&self) {
        for entry in self.sessions.iter() {
            if let Some(closer) = &entry.closer {
                closer.close();
            }
            if let Some(pump) = &entry.pump {
                pump.abort();
            }
        }
        self.sessions.clear();
        debug!("Closed all peer sessions");
    }

    /// Record the live session and spawn its event pump.
    fn register(
        &self,
        peer: ParticipantId,
        endpoint_id: EndpointId,
        media: LocalMedia,
        handle: SessionHandle,
    ) {
        let closer = handle.closer();
        let pump = tokio::spawn(pump_events(
            Arc::clone(&self.sessions),
            Arc::clone(&self.transport),
            peer.clone(),
            endpoint_id,
            media,
            handle,
            self.max_recovery_attempts,
        ));

        if let Some(mut session) = self.sessions.get_mut(&peer) {
            session.closer = Some(closer);
            session.pump = Some(pump);
        }
    }
}

/// Drive one session's events until it ends, keeping the table entry's
/// state current and removing it on close or terminal failure.
async fn pump_events(
    sessions: Arc<DashMap<ParticipantId, PeerSession>>,
    transport: Arc<dyn PeerTransport>,
    peer: ParticipantId,
    endpoint_id: EndpointId,
    media: LocalMedia,
    mut handle: SessionHandle,
    max_recovery_attempts: u32,
) {
    let mut attempts_left = max_recovery_attempts;

    loop {
        match handle.next_event().await {
            Some(SessionEvent::Stream(stream)) => {
                info!(peer = %peer, stream_id = %stream.id(), "Remote media attached");
                if let Some(mut session) = sessions.get_mut(&peer) {
                    session.state = SessionState::Open;
                    session.quality = ConnectionQuality::Good;
                }
            }
            Some(SessionEvent::Failed(reason)) => {
                if attempts_left == 0 {
                    warn!(peer = %peer, reason, "Peer session failed, giving up");
                    sessions.remove(&peer);
                    return;
                }
                attempts_left -= 1;
                warn!(
                    peer = %peer,
                    reason,
                    attempts_left,
                    "Peer session failed, attempting recovery"
                );
                if let Some(mut session) = sessions.get_mut(&peer) {
                    session.state = SessionState::Connecting;
                    session.quality = ConnectionQuality::Degraded;
                }

                match transport.call(&endpoint_id, &media).await {
                    Ok(new_handle) => {
                        if let Some(mut session) = sessions.get_mut(&peer) {
                            session.closer = Some(new_handle.closer());
                        }
                        handle = new_handle;
                    }
                    Err(e) => {
                        warn!(peer = %peer, error = %e, "Session recovery call failed");
                        sessions.remove(&peer);
                        return;
                    }
                }
            }
            Some(SessionEvent::Closed) | None => {
                debug!(peer = %peer, "Peer session closed");
                sessions.remove(&peer);
                return;
            }
        }
    }
}
