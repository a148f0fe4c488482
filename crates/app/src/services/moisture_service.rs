//! Moisture service — check dispatch and asynchronous reply ingestion.
//!
//! The two halves of the moisture-check protocol:
//!
//! - [`MoistureService::request_check`] is invoked in a request context
//!   and publishes the check command without waiting for any reply.
//! - [`MoistureService::ingest_reading`] is invoked by the transport
//!   adapter whenever a device reply arrives — at an arbitrary later
//!   time, on an execution path unrelated to the original request.

use std::sync::Arc;

use pothub_domain::error::PotHubError;
use pothub_domain::history::HistoryEntry;
use pothub_domain::id::{PotId, UserId};
use pothub_domain::time::Timestamp;

use crate::ports::{CommandPublisher, Outbound, PotStore};

/// Dispatches moisture-check commands and absorbs the eventual replies.
pub struct MoistureService<S, P> {
    store: Arc<S>,
    publisher: Arc<P>,
}

impl<S, P> MoistureService<S, P>
where
    S: PotStore + Send + Sync + 'static,
    P: CommandPublisher + Send + Sync + 'static,
{
    /// Create a new service backed by the given ports.
    pub fn new(store: Arc<S>, publisher: Arc<P>) -> Self {
        Self { store, publisher }
    }

    /// Publish a check command for an owned pot and return immediately.
    ///
    /// Success means the command was handed to the transport — nothing is
    /// known about the device, and no timeout or retry is tracked here.
    /// A device that never answers is observable only as the absence of a
    /// later [`ingest_reading`](Self::ingest_reading) call.
    ///
    /// # Errors
    ///
    /// Returns [`PotHubError::NotFound`] when the pot is missing or not
    /// owned, [`PotHubError::Transport`] when the hand-off fails, or a
    /// storage error from the ownership check.
    pub async fn request_check(&self, owner: UserId, pot: PotId) -> Result<(), PotHubError> {
        if self.store.get_owned(owner, pot).await?.is_none() {
            return Err(PotHubError::pot_not_found(pot));
        }
        self.publisher
            .publish(Outbound::MoistureCheck { owner, pot })
            .await
    }

    /// Append a device reply to the pot's history, scoped by the
    /// correlation data `(owner, pot)` the reply carries.
    ///
    /// A reply for a pot that was deleted (or re-owned) in the meantime
    /// is silently discarded — it must never be misattributed to another
    /// pot or resurrect a deleted one. Multiple replies append
    /// independently; the reply stream is trusted to match requests 1:1.
    ///
    /// # Errors
    ///
    /// Returns a storage error from the store. Stale correlation is a
    /// discard, not an error — there is no waiting caller to fail.
    pub async fn ingest_reading(
        &self,
        owner: UserId,
        pot: PotId,
        value: f64,
        observed_at: Timestamp,
    ) -> Result<(), PotHubError> {
        let entry = HistoryEntry::moisture(value, observed_at);
        let appended = self.store.append_history(owner, pot, entry).await?;
        if appended {
            tracing::debug!(%owner, %pot, value, "moisture reading recorded");
        } else {
            tracing::debug!(%owner, %pot, "discarding reply for unknown or re-owned pot");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::pot_service::PotService;
    use crate::services::test_support::{
        FailingPublisher, InMemoryPotStore, InMemoryUserDirectory, RecordingPublisher,
        cuboid_draft,
    };
    use pothub_domain::time::now;

    struct Fixture {
        store: Arc<InMemoryPotStore>,
        publisher: Arc<RecordingPublisher>,
        moisture: MoistureService<InMemoryPotStore, RecordingPublisher>,
        pots: PotService<InMemoryPotStore, InMemoryUserDirectory, RecordingPublisher>,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryPotStore::default());
        let publisher = Arc::new(RecordingPublisher::default());
        Fixture {
            moisture: MoistureService::new(Arc::clone(&store), Arc::clone(&publisher)),
            pots: PotService::new(
                Arc::clone(&store),
                Arc::new(InMemoryUserDirectory::default()),
                Arc::clone(&publisher),
            ),
            store,
            publisher,
        }
    }

    #[tokio::test]
    async fn should_publish_check_command_and_return_immediately() {
        let fx = fixture();
        let owner = UserId::new();
        let created = fx.pots.create_pot(owner, cuboid_draft()).await.unwrap();

        fx.moisture.request_check(owner, created.id).await.unwrap();

        // no reply ever arrives; the call has already succeeded
        let published = fx.publisher.published();
        assert!(published.contains(&Outbound::MoistureCheck {
            owner,
            pot: created.id
        }));
    }

    #[tokio::test]
    async fn should_not_publish_for_unknown_pot() {
        let fx = fixture();
        let result = fx.moisture.request_check(UserId::new(), PotId::new()).await;

        assert!(matches!(result, Err(PotHubError::NotFound(_))));
        assert!(fx.publisher.published().is_empty());
    }

    #[tokio::test]
    async fn should_not_publish_for_foreign_pot() {
        let fx = fixture();
        let owner = UserId::new();
        let created = fx.pots.create_pot(owner, cuboid_draft()).await.unwrap();

        let result = fx.moisture.request_check(UserId::new(), created.id).await;

        assert!(matches!(result, Err(PotHubError::NotFound(_))));
        let published = fx.publisher.published();
        assert!(
            !published
                .iter()
                .any(|m| matches!(m, Outbound::MoistureCheck { .. }))
        );
    }

    #[tokio::test]
    async fn should_surface_transport_failure_from_publish() {
        let store = Arc::new(InMemoryPotStore::default());
        let pots = PotService::new(
            Arc::clone(&store),
            Arc::new(InMemoryUserDirectory::default()),
            Arc::new(RecordingPublisher::default()),
        );
        let moisture = MoistureService::new(Arc::clone(&store), Arc::new(FailingPublisher));
        let owner = UserId::new();
        let created = pots.create_pot(owner, cuboid_draft()).await.unwrap();

        let result = moisture.request_check(owner, created.id).await;
        assert!(matches!(result, Err(PotHubError::Transport(_))));
    }

    #[tokio::test]
    async fn should_append_reading_to_owned_pot() {
        let fx = fixture();
        let owner = UserId::new();
        let created = fx.pots.create_pot(owner, cuboid_draft()).await.unwrap();
        let observed = now();

        fx.moisture
            .ingest_reading(owner, created.id, 41.5, observed)
            .await
            .unwrap();

        let reading = fx.pots.latest_moisture(owner, created.id).await.unwrap();
        assert_eq!(reading.soil_moisture, 41.5);
        assert_eq!(reading.date, observed);
    }

    #[tokio::test]
    async fn should_append_each_duplicate_reply_independently() {
        let fx = fixture();
        let owner = UserId::new();
        let created = fx.pots.create_pot(owner, cuboid_draft()).await.unwrap();

        fx.moisture
            .ingest_reading(owner, created.id, 40.0, now())
            .await
            .unwrap();
        fx.moisture
            .ingest_reading(owner, created.id, 42.0, now())
            .await
            .unwrap();

        let stored = fx.pots.get_pot(owner, created.id).await.unwrap();
        assert_eq!(stored.watering_history.len(), 2);
    }

    #[tokio::test]
    async fn should_discard_reply_for_deleted_pot() {
        let fx = fixture();
        let owner = UserId::new();
        let created = fx.pots.create_pot(owner, cuboid_draft()).await.unwrap();

        fx.moisture.request_check(owner, created.id).await.unwrap();
        fx.pots.delete_pot(owner, created.id).await.unwrap();

        // the reply arrives after the pot is gone — a silent no-op
        fx.moisture
            .ingest_reading(owner, created.id, 33.0, now())
            .await
            .unwrap();

        assert!(matches!(
            fx.pots.get_pot(owner, created.id).await,
            Err(PotHubError::NotFound(_))
        ));
        assert_eq!(fx.store.total_history_entries(), 0);
    }

    #[tokio::test]
    async fn should_discard_reply_carrying_wrong_owner() {
        let fx = fixture();
        let owner = UserId::new();
        let created = fx.pots.create_pot(owner, cuboid_draft()).await.unwrap();

        fx.moisture
            .ingest_reading(UserId::new(), created.id, 33.0, now())
            .await
            .unwrap();

        let stored = fx.pots.get_pot(owner, created.id).await.unwrap();
        assert!(stored.watering_history.is_empty());
    }
}
