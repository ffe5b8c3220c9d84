//! # peerhub-agent
//!
//! The client presence agent: maintains a stable per-room identity,
//! announces its own presence on an interval, polls the rendezvous API
//! for other participants, and drives the connection orchestrator to
//! open one media session per discovered peer.

pub mod agent;
pub mod client;
pub mod identity;
pub mod orchestrator;
pub mod transport;

pub use agent::{AgentState, PresenceAgent};
pub use client::RendezvousClient;
pub use orchestrator::{ConnectionOrchestrator, ConnectionQuality, SessionState};
pub use transport::{
    IncomingCall, LocalMedia, MediaStream, PeerTransport, SessionController, SessionEvent,
    SessionHandle,
};
