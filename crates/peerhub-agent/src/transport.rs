//! The peer-to-peer media layer boundary.
//!
//! Media transport is a black box to this crate: it can capture local
//! media, dial an endpoint, and hand back sessions that emit stream,
//! close, and failure events. Everything else (codecs, negotiation,
//! playback) lives behind [`PeerTransport`].

use async_trait::async_trait;
use tokio::sync::mpsc;
use uuid::Uuid;

use peerhub_core::result::AppResult;
use peerhub_core::types::EndpointId;

/// Opaque handle to locally captured media (mic/camera).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalMedia {
    id: Uuid,
}

impl LocalMedia {
    /// Allocate a fresh media handle. Called by transports, not by the
    /// agent.
    pub fn new() -> Self {
        Self { id: Uuid::new_v4() }
    }

    /// The transport-internal id of this capture.
    pub fn id(&self) -> Uuid {
        self.id
    }
}

impl Default for LocalMedia {
    fn default() -> Self {
        Self::new()
    }
}

/// Opaque handle to an inbound remote media stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaStream {
    id: Uuid,
}

impl MediaStream {
    /// Allocate a fresh stream handle.
    pub fn new() -> Self {
        Self { id: Uuid::new_v4() }
    }

    /// The transport-internal id of this stream.
    pub fn id(&self) -> Uuid {
        self.id
    }
}

impl Default for MediaStream {
    fn default() -> Self {
        Self::new()
    }
}

/// Events a live peer session emits.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Remote media arrived and should be attached for playback.
    Stream(MediaStream),
    /// The peer or the transport closed the session.
    Closed,
    /// The session failed; the reason is transport-specific.
    Failed(String),
}

/// The local half of one direct media session with a peer.
///
/// The owner consumes events from it; [`SessionHandle::closer`] hands
/// out a detached way to request teardown without owning the event
/// stream.
#[derive(Debug)]
pub struct SessionHandle {
    events: mpsc::UnboundedReceiver<SessionEvent>,
    close_tx: mpsc::UnboundedSender<()>,
}

impl SessionHandle {
    /// Create a connected handle/controller pair. Transports build
    /// sessions on top of this; tests drive the controller directly.
    pub fn channel() -> (SessionHandle, SessionController) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (close_tx, close_rx) = mpsc::unbounded_channel();
        (
            SessionHandle {
                events: event_rx,
                close_tx,
            },
            SessionController {
                events: event_tx,
                close_rx,
            },
        )
    }

    /// Wait for the next session event. Returns `None` once the
    /// transport side is gone.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        self.events.recv().await
    }

    /// A detached closer for this session.
    pub fn closer(&self) -> SessionCloser {
        SessionCloser(self.close_tx.clone())
    }
}

/// Requests teardown of a session without owning its event stream.
#[derive(Debug, Clone)]
pub struct SessionCloser(mpsc::UnboundedSender<()>);

impl SessionCloser {
    /// Ask the transport to close the session. Idempotent; the
    /// transport confirms with a `Closed` event.
    pub fn close(&self) {
        let _ = self.0.send(());
    }
}

/// The transport-facing half of a session pair.
#[derive(Debug)]
pub struct SessionController {
    events: mpsc::UnboundedSender<SessionEvent>,
    close_rx: mpsc::UnboundedReceiver<()>,
}

impl SessionController {
    /// Deliver a remote media stream to the local side.
    pub fn emit_stream(&self, stream: MediaStream) {
        let _ = self.events.send(SessionEvent::Stream(stream));
    }

    /// Signal that the session closed.
    pub fn emit_closed(&self) {
        let _ = self.events.send(SessionEvent::Closed);
    }

    /// Signal that the session failed.
    pub fn emit_failed(&self, reason: impl Into<String>) {
        let _ = self.events.send(SessionEvent::Failed(reason.into()));
    }

    /// Resolves once the local side requests teardown or drops its
    /// handle. Returns true for an explicit close request.
    pub async fn close_requested(&mut self) -> bool {
        self.close_rx.recv().await.is_some()
    }
}

/// An inbound call from a remote peer.
#[derive(Debug)]
pub struct IncomingCall {
    /// The caller's rendezvous endpoint.
    pub endpoint_id: EndpointId,
    /// The already-negotiated session with the caller.
    pub session: SessionHandle,
}

/// The peer-to-peer media layer.
#[async_trait]
pub trait PeerTransport: Send + Sync + 'static {
    /// Capture local media for sending to peers.
    async fn acquire_media(&self) -> AppResult<LocalMedia>;

    /// Dial `endpoint`, offering `media`. Resolves once the session is
    /// negotiated; media arrives later as a [`SessionEvent::Stream`].
    async fn call(&self, endpoint: &EndpointId, media: &LocalMedia) -> AppResult<SessionHandle>;

    /// Wait for the next inbound call. Returns `None` when the
    /// transport shuts down.
    async fn next_incoming(&self) -> Option<IncomingCall>;

    /// Release previously captured media.
    async fn release_media(&self, media: LocalMedia);
}
