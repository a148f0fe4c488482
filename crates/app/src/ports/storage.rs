//! Storage ports — ownership-scoped persistence for pots and owners.

use std::future::Future;
use std::sync::Arc;

use pothub_domain::error::PotHubError;
use pothub_domain::history::HistoryEntry;
use pothub_domain::id::{PotId, UserId};
use pothub_domain::pot::Pot;

/// Persistence for [`Pot`]s, scoped by owner on every read and write.
///
/// The "not owned" and "does not exist" cases are indistinguishable by
/// contract: operations report `None`/`false` for both, and the storage
/// layer must provide per-record atomic writes so concurrent operations
/// on the same pot resolve by whichever write lands first.
pub trait PotStore {
    /// All pots owned by `owner`, in stable storage order.
    fn find_owned(
        &self,
        owner: UserId,
    ) -> impl Future<Output = Result<Vec<Pot>, PotHubError>> + Send;

    /// A single pot, `None` when missing or owned by someone else.
    fn get_owned(
        &self,
        owner: UserId,
        pot: PotId,
    ) -> impl Future<Output = Result<Option<Pot>, PotHubError>> + Send;

    /// Persist a freshly created pot.
    fn insert(&self, pot: Pot) -> impl Future<Output = Result<Pot, PotHubError>> + Send;

    /// Replace an owned pot's record; `None` when missing or not owned.
    fn update_owned(
        &self,
        owner: UserId,
        pot: Pot,
    ) -> impl Future<Output = Result<Option<Pot>, PotHubError>> + Send;

    /// Delete an owned pot and its history. `false` when missing or not
    /// owned — under concurrent duplicate deletes exactly one caller
    /// observes `true`.
    fn delete_owned(
        &self,
        owner: UserId,
        pot: PotId,
    ) -> impl Future<Output = Result<bool, PotHubError>> + Send;

    /// Append one history entry, atomically checking the pot still exists
    /// and belongs to `owner`. `false` means the entry was not written.
    fn append_history(
        &self,
        owner: UserId,
        pot: PotId,
        entry: HistoryEntry,
    ) -> impl Future<Output = Result<bool, PotHubError>> + Send;
}

/// The owner's reciprocal pot-id list, kept in sync on create and delete.
///
/// The pair (pot record, reciprocal entry) is updated in separate calls
/// and is eventually consistent; neither call is allowed to fail the
/// other retroactively.
pub trait UserDirectory {
    /// Record that `owner` owns `pot`. Idempotent.
    fn attach_pot(
        &self,
        owner: UserId,
        pot: PotId,
    ) -> impl Future<Output = Result<(), PotHubError>> + Send;

    /// Remove `pot` from `owner`'s list. Idempotent.
    fn detach_pot(
        &self,
        owner: UserId,
        pot: PotId,
    ) -> impl Future<Output = Result<(), PotHubError>> + Send;
}

impl<T: PotStore + Send + Sync> PotStore for Arc<T> {
    fn find_owned(
        &self,
        owner: UserId,
    ) -> impl Future<Output = Result<Vec<Pot>, PotHubError>> + Send {
        (**self).find_owned(owner)
    }

    fn get_owned(
        &self,
        owner: UserId,
        pot: PotId,
    ) -> impl Future<Output = Result<Option<Pot>, PotHubError>> + Send {
        (**self).get_owned(owner, pot)
    }

    fn insert(&self, pot: Pot) -> impl Future<Output = Result<Pot, PotHubError>> + Send {
        (**self).insert(pot)
    }

    fn update_owned(
        &self,
        owner: UserId,
        pot: Pot,
    ) -> impl Future<Output = Result<Option<Pot>, PotHubError>> + Send {
        (**self).update_owned(owner, pot)
    }

    fn delete_owned(
        &self,
        owner: UserId,
        pot: PotId,
    ) -> impl Future<Output = Result<bool, PotHubError>> + Send {
        (**self).delete_owned(owner, pot)
    }

    fn append_history(
        &self,
        owner: UserId,
        pot: PotId,
        entry: HistoryEntry,
    ) -> impl Future<Output = Result<bool, PotHubError>> + Send {
        (**self).append_history(owner, pot, entry)
    }
}

impl<T: UserDirectory + Send + Sync> UserDirectory for Arc<T> {
    fn attach_pot(
        &self,
        owner: UserId,
        pot: PotId,
    ) -> impl Future<Output = Result<(), PotHubError>> + Send {
        (**self).attach_pot(owner, pot)
    }

    fn detach_pot(
        &self,
        owner: UserId,
        pot: PotId,
    ) -> impl Future<Output = Result<(), PotHubError>> + Send {
        (**self).detach_pot(owner, pot)
    }
}
