//! Pot service — owner-scoped use-cases for managing pots.

use std::sync::Arc;

use pothub_domain::error::{FieldIssue, PotHubError, ValidationError};
use pothub_domain::history::{HistoryEntry, MoistureReading};
use pothub_domain::id::{PotId, UserId};
use pothub_domain::pot::{Pot, PotDraft, PotPatch};
use pothub_domain::time::{Timestamp, now};

use crate::ports::{CommandPublisher, Outbound, PotStore, UserDirectory};

/// Application service for pot CRUD, the latest-moisture query, and the
/// pot-list fan-out.
///
/// Every operation is scoped by `(owner, pot)`; a pot owned by someone
/// else is reported as [`PotHubError::NotFound`], never as a permission
/// error, so callers cannot probe for the existence of foreign pots.
pub struct PotService<S, U, P> {
    store: Arc<S>,
    users: Arc<U>,
    publisher: Arc<P>,
}

impl<S, U, P> PotService<S, U, P>
where
    S: PotStore + Send + Sync + 'static,
    U: UserDirectory + Send + Sync + 'static,
    P: CommandPublisher + Send + Sync + 'static,
{
    /// Create a new service backed by the given ports.
    pub fn new(store: Arc<S>, users: Arc<U>, publisher: Arc<P>) -> Self {
        Self {
            store,
            users,
            publisher,
        }
    }

    /// All pots owned by `owner`, in stable storage order.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the store.
    pub async fn list_pots(&self, owner: UserId) -> Result<Vec<Pot>, PotHubError> {
        self.store.find_owned(owner).await
    }

    /// Look up one pot scoped by ownership.
    ///
    /// # Errors
    ///
    /// Returns [`PotHubError::NotFound`] when the pot is missing or owned
    /// by someone else, or a storage error from the store.
    pub async fn get_pot(&self, owner: UserId, pot: PotId) -> Result<Pot, PotHubError> {
        self.store
            .get_owned(owner, pot)
            .await?
            .ok_or_else(|| PotHubError::pot_not_found(pot))
    }

    /// Validate a draft and persist it for `owner`.
    ///
    /// The new id is registered in the owner's reciprocal list, and the
    /// updated pot list is fanned out to listeners on a detached task —
    /// the create result never depends on the fan-out.
    ///
    /// # Errors
    ///
    /// Returns [`PotHubError::Validation`] enumerating every missing or
    /// invalid field, or a storage error from the store.
    pub async fn create_pot(&self, owner: UserId, draft: PotDraft) -> Result<Pot, PotHubError> {
        let pot = draft.into_pot(owner)?;
        let created = self.store.insert(pot).await?;
        self.users.attach_pot(owner, created.id).await?;
        self.spawn_fan_out(owner);
        Ok(created)
    }

    /// Merge a partial update into an owned pot.
    ///
    /// The **merged** record is re-validated as a whole, so a patch can
    /// never leave a pot missing shape-required dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`PotHubError::NotFound`] when the pot is missing or not
    /// owned, [`PotHubError::Validation`] when the merged record violates
    /// an invariant, or a storage error from the store.
    pub async fn update_pot(
        &self,
        owner: UserId,
        pot: PotId,
        patch: PotPatch,
    ) -> Result<Pot, PotHubError> {
        let mut record = self.get_pot(owner, pot).await?;
        record.apply(patch);
        record.validate()?;
        record.updated_at = now();
        self.store
            .update_owned(owner, record)
            .await?
            .ok_or_else(|| PotHubError::pot_not_found(pot))
    }

    /// Delete an owned pot, detach it from the owner's reciprocal list,
    /// and fan out the updated pot list.
    ///
    /// Under concurrent duplicate deletes exactly one caller succeeds;
    /// the others observe [`PotHubError::NotFound`].
    ///
    /// # Errors
    ///
    /// Returns [`PotHubError::NotFound`] when the pot is missing or not
    /// owned, or a storage error from the store.
    pub async fn delete_pot(&self, owner: UserId, pot: PotId) -> Result<(), PotHubError> {
        if !self.store.delete_owned(owner, pot).await? {
            return Err(PotHubError::pot_not_found(pot));
        }
        self.users.detach_pot(owner, pot).await?;
        self.spawn_fan_out(owner);
        Ok(())
    }

    /// Append a watering event to an owned pot's history.
    ///
    /// # Errors
    ///
    /// Returns [`PotHubError::Validation`] when `amount` is not positive,
    /// [`PotHubError::NotFound`] when the pot is missing or not owned, or
    /// a storage error from the store.
    pub async fn record_watering(
        &self,
        owner: UserId,
        pot: PotId,
        amount: f64,
        date: Option<Timestamp>,
    ) -> Result<HistoryEntry, PotHubError> {
        if amount <= 0.0 {
            return Err(ValidationError::new(vec![FieldIssue::NotPositive(
                "waterAmount",
            )])
            .into());
        }
        let entry = HistoryEntry::watering(amount, date.unwrap_or_else(now));
        if !self.store.append_history(owner, pot, entry.clone()).await? {
            return Err(PotHubError::pot_not_found(pot));
        }
        Ok(entry)
    }

    /// The full watering history of an owned pot, in append order.
    ///
    /// # Errors
    ///
    /// Returns [`PotHubError::NotFound`] when the pot is missing or not
    /// owned, or a storage error from the store.
    pub async fn watering_history(
        &self,
        owner: UserId,
        pot: PotId,
    ) -> Result<Vec<HistoryEntry>, PotHubError> {
        Ok(self.get_pot(owner, pot).await?.watering_history)
    }

    /// Latest soil-moisture reading for an owned pot.
    ///
    /// # Errors
    ///
    /// Returns [`PotHubError::NotFound`] when the pot is missing or not
    /// owned, [`PotHubError::NoData`] when it exists but no history entry
    /// carries a reading, or a storage error from the store.
    pub async fn latest_moisture(
        &self,
        owner: UserId,
        pot: PotId,
    ) -> Result<MoistureReading, PotHubError> {
        let record = self.get_pot(owner, pot).await?;
        record
            .latest_moisture()
            .ok_or(PotHubError::NoData { pot })
    }

    /// Publish the owner's current pot list on a detached task.
    ///
    /// Runs after the triggering operation has already succeeded; read or
    /// publish failures are logged and dropped.
    fn spawn_fan_out(&self, owner: UserId) {
        let store = Arc::clone(&self.store);
        let publisher = Arc::clone(&self.publisher);
        tokio::spawn(async move {
            let pots = match store.find_owned(owner).await {
                Ok(pots) => pots,
                Err(err) => {
                    tracing::warn!(%owner, error = %err, "pot list fan-out read failed");
                    return;
                }
            };
            if let Err(err) = publisher.publish(Outbound::PotList { owner, pots }).await {
                tracing::warn!(%owner, error = %err, "pot list fan-out publish failed");
            }
        });
    }
}
