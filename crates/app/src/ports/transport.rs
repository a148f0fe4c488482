//! Transport port — outbound publish/subscribe messages.

use std::future::Future;
use std::sync::Arc;

use pothub_domain::error::PotHubError;
use pothub_domain::id::{PotId, UserId};
use pothub_domain::pot::Pot;

/// An outbound message for the pub/sub transport.
///
/// The variants carry the correlation data (owner, pot) the adapter needs
/// to address the message; the concrete topic scheme and payload encoding
/// belong to the adapter, not the core.
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    /// Command a sensing device to check soil moisture. Fire-and-forget:
    /// the eventual reply arrives on an independent path carrying the
    /// same (owner, pot) correlation data.
    MoistureCheck { owner: UserId, pot: PotId },

    /// The owner's full pot list, pushed to any listeners after a
    /// mutating operation.
    PotList { owner: UserId, pots: Vec<Pot> },
}

/// Publishes outbound messages to the transport.
///
/// Success means "the message was handed to the transport", nothing more —
/// delivery, retries, and QoS are the transport's concern.
pub trait CommandPublisher {
    fn publish(&self, message: Outbound)
    -> impl Future<Output = Result<(), PotHubError>> + Send;
}

impl<T: CommandPublisher + Send + Sync> CommandPublisher for Arc<T> {
    fn publish(
        &self,
        message: Outbound,
    ) -> impl Future<Output = Result<(), PotHubError>> + Send {
        (**self).publish(message)
    }
}
