//! # pothub-adapter-mqtt
//!
//! MQTT transport adapter built on `rumqttc`.
//!
//! ## Responsibilities
//! - Implement the `CommandPublisher` port: moisture-check commands and
//!   pot-list fan-out messages, mapped to the topic scheme in [`topics`]
//! - Run the [`ReplyListener`]: a long-lived task that drives the rumqttc
//!   event loop, subscribes to device reply topics, and feeds each reply
//!   into the `MoistureService` ingestor
//!
//! The broker connection is owned by the process entry point: it builds
//! the client pair with [`connect`] and injects the publisher into the
//! services — nothing in here is reachable through process-wide globals.
//!
//! ## Dependency rule
//! Depends on `pothub-app` and `pothub-domain`. Never imported by them.

pub mod config;
pub mod error;
pub mod topics;

use std::sync::Arc;
use std::time::Duration;

use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};
use serde::Deserialize;

use pothub_app::ports::{CommandPublisher, Outbound, PotStore};
use pothub_app::services::moisture_service::MoistureService;
use pothub_domain::error::PotHubError;
use pothub_domain::id::{PotId, UserId};
use pothub_domain::time::{Timestamp, now};

use crate::config::MqttConfig;
use crate::error::MqttError;

const EVENT_CHANNEL_CAPACITY: usize = 64;
const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Build the publisher / listener pair for one broker connection.
///
/// The publisher can be cloned and shared freely; the listener owns the
/// event loop and must be driven by a dedicated task ([`ReplyListener::run`]).
#[must_use]
pub fn connect(config: &MqttConfig) -> (MqttPublisher, ReplyListener) {
    let mut options = MqttOptions::new(
        config.client_id.clone(),
        config.broker_host.clone(),
        config.broker_port,
    );
    options.set_keep_alive(Duration::from_secs(u64::from(config.keep_alive_secs)));

    let (client, eventloop) = AsyncClient::new(options, EVENT_CHANNEL_CAPACITY);

    let publisher = MqttPublisher {
        client: client.clone(),
        base_topic: config.base_topic.clone(),
    };
    let listener = ReplyListener {
        client,
        eventloop,
        base_topic: config.base_topic.clone(),
    };
    (publisher, listener)
}

/// MQTT-backed implementation of the `CommandPublisher` port.
#[derive(Clone)]
pub struct MqttPublisher {
    client: AsyncClient,
    base_topic: String,
}

impl CommandPublisher for MqttPublisher {
    async fn publish(&self, message: Outbound) -> Result<(), PotHubError> {
        let (topic, payload) = encode(&self.base_topic, &message)?;
        self.client
            .publish(topic, QoS::AtLeastOnce, false, payload)
            .await
            .map_err(|err| MqttError::Client(err).into())
    }
}

/// Map an outbound message to its topic and JSON payload.
fn encode(base: &str, message: &Outbound) -> Result<(String, Vec<u8>), MqttError> {
    match message {
        Outbound::MoistureCheck { owner, pot } => {
            let payload = serde_json::json!({ "owner": owner, "potId": pot });
            let bytes = serde_json::to_vec(&payload).map_err(MqttError::PayloadEncode)?;
            Ok((topics::moisture_check(base, *owner, *pot), bytes))
        }
        Outbound::PotList { owner, pots } => {
            let payload = serde_json::json!({ "pots": pots });
            let bytes = serde_json::to_vec(&payload).map_err(MqttError::PayloadEncode)?;
            Ok((topics::pot_list(base, *owner), bytes))
        }
    }
}

/// JSON body of a device reply.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReadingPayload {
    soil_moisture: f64,
    /// When the device took the reading; ingestion time when absent.
    #[serde(default)]
    observed_at: Option<Timestamp>,
}

/// A decoded device reply, correlation data included.
#[derive(Debug, PartialEq)]
struct Reply {
    owner: UserId,
    pot: PotId,
    soil_moisture: f64,
    observed_at: Option<Timestamp>,
}

/// Decode a reply from its topic and payload.
fn decode_reply(base: &str, topic: &str, payload: &[u8]) -> Result<Reply, MqttError> {
    let (owner, pot) = topics::parse_reading(base, topic)
        .ok_or_else(|| MqttError::UnexpectedTopic(topic.to_string()))?;
    let body: ReadingPayload =
        serde_json::from_slice(payload).map_err(MqttError::PayloadParse)?;
    Ok(Reply {
        owner,
        pot,
        soil_moisture: body.soil_moisture,
        observed_at: body.observed_at,
    })
}

/// Long-lived task absorbing device replies into pot history.
///
/// Replies arrive at arbitrary times on this connection, unrelated to any
/// in-flight request. Anything malformed or stale is logged and dropped —
/// by design there is no caller to report a failure to.
pub struct ReplyListener {
    client: AsyncClient,
    eventloop: EventLoop,
    base_topic: String,
}

impl ReplyListener {
    /// Drive the event loop forever, feeding replies into `moisture`.
    pub async fn run<S, P>(mut self, moisture: Arc<MoistureService<S, P>>)
    where
        S: PotStore + Send + Sync + 'static,
        P: CommandPublisher + Send + Sync + 'static,
    {
        let filter = topics::reading_filter(&self.base_topic);
        loop {
            match self.eventloop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    // (re)subscribe on every new session
                    tracing::info!(filter = %filter, "connected to MQTT broker");
                    if let Err(err) = self.client.subscribe(&filter, QoS::AtLeastOnce).await {
                        tracing::error!(error = %err, "failed to subscribe to reply topics");
                    }
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    Self::absorb(&self.base_topic, &moisture, &publish.topic, &publish.payload)
                        .await;
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(error = %err, "MQTT connection lost, retrying");
                    tokio::time::sleep(RECONNECT_DELAY).await;
                }
            }
        }
    }

    async fn absorb<S, P>(
        base_topic: &str,
        moisture: &Arc<MoistureService<S, P>>,
        topic: &str,
        payload: &[u8],
    ) where
        S: PotStore + Send + Sync + 'static,
        P: CommandPublisher + Send + Sync + 'static,
    {
        let reply = match decode_reply(base_topic, topic, payload) {
            Ok(reply) => reply,
            Err(err) => {
                tracing::warn!(topic = %topic, error = %err, "dropping undecodable reply");
                return;
            }
        };
        let observed_at = reply.observed_at.unwrap_or_else(now);
        if let Err(err) = moisture
            .ingest_reading(reply.owner, reply.pot, reply.soil_moisture, observed_at)
            .await
        {
            tracing::error!(
                owner = %reply.owner,
                pot = %reply.pot,
                error = %err,
                "failed to record moisture reply"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_encode_check_command_with_correlation_payload() {
        let owner = UserId::new();
        let pot = PotId::new();
        let (topic, payload) =
            encode("garden", &Outbound::MoistureCheck { owner, pot }).unwrap();

        assert_eq!(topic, topics::moisture_check("garden", owner, pot));
        let json: serde_json::Value = serde_json::from_slice(&payload).unwrap();
        assert_eq!(json["owner"], owner.to_string());
        assert_eq!(json["potId"], pot.to_string());
    }

    #[test]
    fn should_encode_pot_list_on_owner_topic() {
        let owner = UserId::new();
        let (topic, payload) = encode(
            "garden",
            &Outbound::PotList {
                owner,
                pots: vec![],
            },
        )
        .unwrap();

        assert_eq!(topic, topics::pot_list("garden", owner));
        let json: serde_json::Value = serde_json::from_slice(&payload).unwrap();
        assert!(json["pots"].as_array().unwrap().is_empty());
    }

    #[test]
    fn should_decode_reply_with_observation_time() {
        let owner = UserId::new();
        let pot = PotId::new();
        let topic = topics::moisture_reading("garden", owner, pot);
        let payload = br#"{"soilMoisture": 38.5, "observedAt": "2024-05-01T10:00:00Z"}"#;

        let reply = decode_reply("garden", &topic, payload).unwrap();
        assert_eq!(reply.owner, owner);
        assert_eq!(reply.pot, pot);
        assert_eq!(reply.soil_moisture, 38.5);
        assert!(reply.observed_at.is_some());
    }

    #[test]
    fn should_decode_reply_without_observation_time() {
        let topic = topics::moisture_reading("garden", UserId::new(), PotId::new());
        let reply = decode_reply("garden", &topic, br#"{"soilMoisture": 12.0}"#).unwrap();
        assert!(reply.observed_at.is_none());
    }

    #[test]
    fn should_reject_reply_on_foreign_topic() {
        let result = decode_reply("garden", "garden/other", br#"{"soilMoisture": 12.0}"#);
        assert!(matches!(result, Err(MqttError::UnexpectedTopic(_))));
    }

    #[test]
    fn should_reject_reply_with_malformed_payload() {
        let topic = topics::moisture_reading("garden", UserId::new(), PotId::new());
        let result = decode_reply("garden", &topic, b"not json");
        assert!(matches!(result, Err(MqttError::PayloadParse(_))));
    }
}
