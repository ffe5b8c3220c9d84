//! The per-participant presence agent state machine.
//!
//! `Initializing -> Announcing -> Steady -> Disconnected`. In `Steady`
//! two independent timers run concurrently: self-announce keeps this
//! participant's record alive, discovery-poll dials newly seen peers.
//! A slow announce never delays the next poll tick.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info, warn};

use peerhub_core::config::agent::AgentConfig;
use peerhub_core::error::AppError;
use peerhub_core::result::AppResult;
use peerhub_core::types::{EndpointId, ParticipantId, RoomId};

use crate::client::RendezvousClient;
use crate::identity::IdentityStore;
use crate::orchestrator::ConnectionOrchestrator;
use crate::transport::{LocalMedia, PeerTransport};

/// Agent lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentState {
    /// Not in a room.
    Idle,
    /// Acquiring identity and local media.
    Initializing,
    /// First announce in flight.
    Announcing,
    /// Announce and poll loops running.
    Steady,
    /// Left the room.
    Disconnected,
}

struct ActiveRoom {
    room_id: RoomId,
    participant_id: ParticipantId,
    media: LocalMedia,
    shutdown: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

/// One participant's presence agent.
pub struct PresenceAgent {
    client: Arc<RendezvousClient>,
    transport: Arc<dyn PeerTransport>,
    identities: IdentityStore,
    orchestrator: Arc<ConnectionOrchestrator>,
    config: AgentConfig,
    state: watch::Sender<AgentState>,
    active: Mutex<Option<ActiveRoom>>,
}

impl PresenceAgent {
    /// Build an agent over the given transport.
    pub fn new(config: AgentConfig, transport: Arc<dyn PeerTransport>) -> AppResult<Self> {
        let client = Arc::new(RendezvousClient::new(&config)?);
        let identities = IdentityStore::new(config.identity_dir.clone());
        let orchestrator = Arc::new(ConnectionOrchestrator::new(
            Arc::clone(&transport),
            config.max_recovery_attempts,
        ));
        let (state, _) = watch::channel(AgentState::Idle);
        Ok(Self {
            client,
            transport,
            identities,
            orchestrator,
            config,
            state,
            active: Mutex::new(None),
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> AgentState {
        *self.state.borrow()
    }

    /// The rendezvous client, for callers that also need direct API
    /// access (creating a room before joining it).
    pub fn client(&self) -> &RendezvousClient {
        &self.client
    }

    /// The local session table.
    pub fn orchestrator(&self) -> &ConnectionOrchestrator {
        &self.orchestrator
    }

    /// Join a room: acquire identity and media, publish presence, then
    /// start the announce and poll loops.
    ///
    /// A failed first announce is terminal for the join (the room is
    /// dead or rejecting us) and surfaced immediately, never retried in
    /// a loop.
    pub async fn join(&self, room_id: RoomId) -> AppResult<ParticipantId> {
        let mut active = self.active.lock().await;
        if active.is_some() {
            return Err(AppError::session("Already in a room; leave it first"));
        }

        self.state.send_replace(AgentState::Initializing);
        let participant_id = self.identities.load_or_create(&room_id).await?;
        let media = self.transport.acquire_media().await?;

        self.state.send_replace(AgentState::Announcing);
        let endpoint_id = EndpointId::for_participant(&room_id, &participant_id);
        let participant_id = match self
            .client
            .announce(&room_id, Some(&participant_id), &endpoint_id)
            .await
        {
            Ok(id) => id,
            Err(e) => {
                self.transport.release_media(media).await;
                self.state.send_replace(AgentState::Disconnected);
                return Err(e);
            }
        };

        let (shutdown, _) = watch::channel(false);
        let tasks = vec![
            tokio::spawn(announce_loop(
                Arc::clone(&self.client),
                room_id.clone(),
                participant_id.clone(),
                endpoint_id,
                Duration::from_secs(self.config.announce_interval_seconds),
                shutdown.subscribe(),
            )),
            tokio::spawn(poll_loop(
                Arc::clone(&self.client),
                Arc::clone(&self.orchestrator),
                room_id.clone(),
                participant_id.clone(),
                media.clone(),
                Duration::from_secs(self.config.poll_interval_seconds),
                shutdown.subscribe(),
            )),
            tokio::spawn(incoming_loop(
                Arc::clone(&self.transport),
                Arc::clone(&self.orchestrator),
                room_id.clone(),
                participant_id.clone(),
                media.clone(),
                shutdown.subscribe(),
            )),
        ];

        info!(room_id = %room_id, participant_id = %participant_id, "Joined room");
        *active = Some(ActiveRoom {
            room_id,
            participant_id: participant_id.clone(),
            media,
            shutdown,
            tasks,
        });
        self.state.send_replace(AgentState::Steady);
        Ok(participant_id)
    }

    /// Leave the current room: stop both loops, close every peer
    /// session, retract presence best-effort, release media, and clear
    /// the persisted identity. Idempotent when not joined.
    pub async fn leave(&self) -> AppResult<()> {
        let mut active = self.active.lock().await;
        let Some(room) = active.take() else {
            return Ok(());
        };

        // Cancel timers and in-flight requests so a late response
        // cannot resurrect stale session state after we leave.
        let _ = room.shutdown.send(true);
        for task in room.tasks {
            task.abort();
        }
        self.orchestrator.close_all();

        // Fire-and-forget: removal failure must not block teardown;
        // the record expires on its own anyway.
        let client = Arc::clone(&self.client);
        let room_id = room.room_id.clone();
        let participant_id = room.participant_id.clone();
        tokio::spawn(async move {
            if let Err(e) = client.remove_presence(&room_id, &participant_id).await {
                debug!(room_id = %room_id, error = %e, "Best-effort presence removal failed");
            }
        });

        self.transport.release_media(room.media).await;

        // Only an explicit leave forgets the identity; an incidental
        // reload rejoins as the same participant.
        if let Err(e) = self.identities.clear(&room.room_id).await {
            warn!(room_id = %room.room_id, error = %e, "Failed to clear persisted identity");
        }

        info!(room_id = %room.room_id, "Left room");
        self.state.send_replace(AgentState::Disconnected);
        Ok(())
    }
}

/// Re-publish presence on a fixed interval well inside the record TTL.
/// Individual failures are logged and retried on the next tick.
async fn announce_loop(
    client: Arc<RendezvousClient>,
    room_id: RoomId,
    participant_id: ParticipantId,
    endpoint_id: EndpointId,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The join already announced; skip the interval's immediate tick.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = shutdown.changed() => return,
            _ = ticker.tick() => {
                if let Err(e) = client
                    .announce(&room_id, Some(&participant_id), &endpoint_id)
                    .await
                {
                    warn!(room_id = %room_id, error = %e, "Presence announce failed; will retry next tick");
                }
            }
        }
    }
}

/// Fetch the live presence list on a fixed interval and dial every peer
/// present in the fetch but absent from the local session table.
///
/// The converse is deliberate: peers absent from a fetch but present
/// locally are left alone — the transport's own close signaling retires
/// them. A poll miss does not mean the peer is gone.
async fn poll_loop(
    client: Arc<RendezvousClient>,
    orchestrator: Arc<ConnectionOrchestrator>,
    room_id: RoomId,
    participant_id: ParticipantId,
    media: LocalMedia,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = shutdown.changed() => return,
            _ = ticker.tick() => {
                let entries = match client.list_presence(&room_id).await {
                    Ok(entries) => entries,
                    Err(e) => {
                        warn!(room_id = %room_id, error = %e, "Presence poll failed; will retry next tick");
                        continue;
                    }
                };

                for entry in entries {
                    if entry.participant_id == participant_id
                        || orchestrator.contains(&entry.participant_id)
                    {
                        continue;
                    }
                    if let Err(e) = orchestrator
                        .connect(entry.participant_id.clone(), entry.endpoint_id, &media)
                        .await
                    {
                        warn!(peer = %entry.participant_id, error = %e, "Failed to open session with discovered peer");
                    }
                }
            }
        }
    }
}

/// Accept inbound calls and hand them to the orchestrator.
async fn incoming_loop(
    transport: Arc<dyn PeerTransport>,
    orchestrator: Arc<ConnectionOrchestrator>,
    room_id: RoomId,
    participant_id: ParticipantId,
    media: LocalMedia,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            _ = shutdown.changed() => return,
            incoming = transport.next_incoming() => {
                let Some(call) = incoming else { return };
                match call.endpoint_id.participant_in(&room_id) {
                    Some(peer) if peer != participant_id => {
                        orchestrator.adopt(peer, call.endpoint_id, call.session, &media);
                    }
                    _ => {
                        warn!(endpoint_id = %call.endpoint_id, "Dropping call from foreign or malformed endpoint");
                        call.session.closer().close();
                    }
                }
            }
        }
    }
}
