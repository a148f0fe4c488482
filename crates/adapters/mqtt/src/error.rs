//! MQTT adapter error types.

use pothub_domain::error::PotHubError;

/// Errors specific to the MQTT adapter.
#[derive(Debug, thiserror::Error)]
pub enum MqttError {
    /// The rumqttc client refused the publish or subscribe.
    #[error("MQTT client error")]
    Client(#[source] rumqttc::ClientError),

    /// Failed to parse an incoming MQTT payload as JSON.
    #[error("failed to parse MQTT payload")]
    PayloadParse(#[source] serde_json::Error),

    /// Failed to serialize an outbound payload.
    #[error("failed to encode MQTT payload")]
    PayloadEncode(#[source] serde_json::Error),

    /// An incoming topic did not match the expected reply scheme.
    #[error("unexpected MQTT topic: {0}")]
    UnexpectedTopic(String),
}

impl From<MqttError> for PotHubError {
    fn from(err: MqttError) -> Self {
        Self::Transport(Box::new(err))
    }
}
