//! Scheduled sweep of expired rooms and their presence data.
//!
//! Correctness never depends on this: the usability predicate already
//! hides expired rooms and presence records expire on their own. The
//! sweep only reclaims storage, so it runs with a grace period past
//! expiry.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};

use peerhub_core::config::registry::RegistryConfig;
use peerhub_core::error::AppError;
use peerhub_core::result::AppResult;
use peerhub_presence::PresenceStore;
use peerhub_registry::RoomService;

/// Schedule the sweep and start the scheduler.
pub async fn start(
    rooms: Arc<RoomService>,
    presence: Arc<PresenceStore>,
    config: &RegistryConfig,
) -> AppResult<JobScheduler> {
    let scheduler = JobScheduler::new()
        .await
        .map_err(|e| AppError::internal(format!("Scheduler init failed: {e}")))?;

    let grace = Duration::seconds(config.sweep_grace_seconds as i64);
    let job = Job::new_async(config.sweep_schedule.as_str(), move |_id, _scheduler| {
        let rooms = Arc::clone(&rooms);
        let presence = Arc::clone(&presence);
        Box::pin(async move {
            sweep(rooms, presence, grace).await;
        })
    })
    .map_err(|e| AppError::internal(format!("Invalid sweep schedule: {e}")))?;

    scheduler
        .add(job)
        .await
        .map_err(|e| AppError::internal(format!("Failed to add sweep job: {e}")))?;
    scheduler
        .start()
        .await
        .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;

    info!(schedule = %config.sweep_schedule, "Expired-room sweep scheduled");
    Ok(scheduler)
}

/// Delete rooms expired longer than `grace` ago, then purge each swept
/// room's presence set.
async fn sweep(rooms: Arc<RoomService>, presence: Arc<PresenceStore>, grace: Duration) {
    let cutoff = Utc::now() - grace;

    let removed = match rooms.delete_expired(cutoff).await {
        Ok(removed) => removed,
        Err(e) => {
            error!(error = %e, "Expired-room sweep failed");
            return;
        }
    };

    if removed.is_empty() {
        return;
    }
    info!(count = removed.len(), "Swept expired rooms");

    for room_id in removed {
        if let Err(e) = presence.expire_room(&room_id).await {
            warn!(room_id = %room_id, error = %e, "Failed to purge presence for swept room");
        }
    }
}
