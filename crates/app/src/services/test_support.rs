//! In-memory port doubles shared by the service tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use pothub_domain::error::PotHubError;
use pothub_domain::history::HistoryEntry;
use pothub_domain::id::{PotId, UserId};
use pothub_domain::pot::{DimensionsSpec, Pot, PotDraft, Shape};

use crate::ports::{CommandPublisher, Outbound, PotStore, UserDirectory};

/// Pot store over a `Vec` so storage order matches insertion order.
#[derive(Default)]
pub struct InMemoryPotStore {
    pots: Mutex<Vec<Pot>>,
}

impl PotStore for InMemoryPotStore {
    async fn find_owned(&self, owner: UserId) -> Result<Vec<Pot>, PotHubError> {
        let pots = self.pots.lock().unwrap();
        Ok(pots.iter().filter(|p| p.owner == owner).cloned().collect())
    }

    async fn get_owned(&self, owner: UserId, pot: PotId) -> Result<Option<Pot>, PotHubError> {
        let pots = self.pots.lock().unwrap();
        Ok(pots
            .iter()
            .find(|p| p.id == pot && p.owner == owner)
            .cloned())
    }

    async fn insert(&self, pot: Pot) -> Result<Pot, PotHubError> {
        let mut pots = self.pots.lock().unwrap();
        pots.push(pot.clone());
        Ok(pot)
    }

    async fn update_owned(&self, owner: UserId, pot: Pot) -> Result<Option<Pot>, PotHubError> {
        let mut pots = self.pots.lock().unwrap();
        match pots.iter_mut().find(|p| p.id == pot.id && p.owner == owner) {
            Some(slot) => {
                *slot = pot.clone();
                Ok(Some(pot))
            }
            None => Ok(None),
        }
    }

    async fn delete_owned(&self, owner: UserId, pot: PotId) -> Result<bool, PotHubError> {
        let mut pots = self.pots.lock().unwrap();
        let before = pots.len();
        pots.retain(|p| !(p.id == pot && p.owner == owner));
        Ok(pots.len() < before)
    }

    async fn append_history(
        &self,
        owner: UserId,
        pot: PotId,
        entry: HistoryEntry,
    ) -> Result<bool, PotHubError> {
        let mut pots = self.pots.lock().unwrap();
        match pots.iter_mut().find(|p| p.id == pot && p.owner == owner) {
            Some(slot) => {
                slot.watering_history.push(entry);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl InMemoryPotStore {
    /// Total number of history entries across every pot — lets tests
    /// assert a discarded reply landed nowhere.
    pub fn total_history_entries(&self) -> usize {
        let pots = self.pots.lock().unwrap();
        pots.iter().map(|p| p.watering_history.len()).sum()
    }
}

#[derive(Default)]
pub struct InMemoryUserDirectory {
    lists: Mutex<HashMap<UserId, Vec<PotId>>>,
}

impl InMemoryUserDirectory {
    pub fn pots_of(&self, owner: UserId) -> Vec<PotId> {
        let lists = self.lists.lock().unwrap();
        lists.get(&owner).cloned().unwrap_or_default()
    }
}

impl UserDirectory for InMemoryUserDirectory {
    async fn attach_pot(&self, owner: UserId, pot: PotId) -> Result<(), PotHubError> {
        let mut lists = self.lists.lock().unwrap();
        let list = lists.entry(owner).or_default();
        if !list.contains(&pot) {
            list.push(pot);
        }
        Ok(())
    }

    async fn detach_pot(&self, owner: UserId, pot: PotId) -> Result<(), PotHubError> {
        let mut lists = self.lists.lock().unwrap();
        if let Some(list) = lists.get_mut(&owner) {
            list.retain(|id| *id != pot);
        }
        Ok(())
    }
}

/// Publisher that records every message for later assertions.
#[derive(Default)]
pub struct RecordingPublisher {
    messages: Mutex<Vec<Outbound>>,
}

impl RecordingPublisher {
    pub fn published(&self) -> Vec<Outbound> {
        self.messages.lock().unwrap().clone()
    }
}

impl CommandPublisher for RecordingPublisher {
    async fn publish(&self, message: Outbound) -> Result<(), PotHubError> {
        self.messages.lock().unwrap().push(message);
        Ok(())
    }
}

/// Publisher whose hand-off always fails.
pub struct FailingPublisher;

impl CommandPublisher for FailingPublisher {
    async fn publish(&self, _message: Outbound) -> Result<(), PotHubError> {
        Err(PotHubError::transport(std::io::Error::other(
            "broker unreachable",
        )))
    }
}

/// A complete, valid cuboid draft.
pub fn cuboid_draft() -> PotDraft {
    PotDraft {
        pot_name: Some("Balcony".to_string()),
        flower_name: Some("Basil".to_string()),
        water_amount: Some(250.0),
        watering_frequency: Some(3),
        pot_size: Some("medium".to_string()),
        shape: Some(Shape::Cuboid),
        dimensions: Some(DimensionsSpec {
            height: Some(20.0),
            width: Some(30.0),
            depth: Some(15.0),
            diameter: None,
        }),
        other_params: None,
    }
}

/// Poll until the publisher has recorded at least `count` messages.
/// Fan-out runs on a detached task, so tests have to wait for it.
pub async fn wait_for_publishes(publisher: &RecordingPublisher, count: usize) -> Vec<Outbound> {
    for _ in 0..100 {
        let published = publisher.published();
        if published.len() >= count {
            return published;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!(
        "expected at least {count} published messages, got {:?}",
        publisher.published()
    );
}
