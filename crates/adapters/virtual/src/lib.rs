//! # pothub-adapter-virtual
//!
//! A simulated soil-moisture sensor device.
//!
//! Real deployments pair each pot with a physical sensor that answers
//! check commands over MQTT. This adapter stands in for those devices in
//! development: it subscribes to the check-command topics and answers
//! each command with a deterministic synthetic reading, so the full
//! request → device → reply → history round trip can be exercised with
//! nothing but a broker.
//!
//! ## Dependency rule
//! Speaks the same wire scheme as `pothub-adapter-mqtt` (it reuses that
//! crate's topic module) but runs on its own client connection, exactly
//! like a real device would.

use std::time::Duration;

use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};

use pothub_adapter_mqtt::config::MqttConfig;
use pothub_adapter_mqtt::topics;
use pothub_domain::id::PotId;
use pothub_domain::time::now;

const EVENT_CHANNEL_CAPACITY: usize = 16;
const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// A simulated sensor answering every check command under one base topic.
pub struct VirtualSensor {
    config: MqttConfig,
}

impl VirtualSensor {
    /// Create a sensor for the given broker and base topic.
    #[must_use]
    pub fn new(config: MqttConfig) -> Self {
        Self { config }
    }

    /// Connect to the broker and answer check commands forever.
    pub async fn run(self) {
        let mut options = MqttOptions::new(
            format!("{}-virtual-sensor", self.config.client_id),
            self.config.broker_host.clone(),
            self.config.broker_port,
        );
        options.set_keep_alive(Duration::from_secs(u64::from(self.config.keep_alive_secs)));

        let (client, mut eventloop) = AsyncClient::new(options, EVENT_CHANNEL_CAPACITY);
        let base = self.config.base_topic;
        let filter = topics::check_filter(&base);

        loop {
            match eventloop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    tracing::info!(filter = %filter, "virtual sensor connected");
                    if let Err(err) = client.subscribe(&filter, QoS::AtLeastOnce).await {
                        tracing::error!(error = %err, "virtual sensor failed to subscribe");
                    }
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    let Some((owner, pot)) = topics::parse_check(&base, &publish.topic) else {
                        continue;
                    };
                    let reading = synthetic_moisture(pot);
                    let payload = serde_json::json!({
                        "soilMoisture": reading,
                        "observedAt": now(),
                    });
                    let topic = topics::moisture_reading(&base, owner, pot);
                    tracing::debug!(%pot, reading, "virtual sensor answering check");
                    if let Err(err) = client
                        .publish(topic, QoS::AtLeastOnce, false, payload.to_string())
                        .await
                    {
                        tracing::warn!(error = %err, "virtual sensor failed to reply");
                    }
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(error = %err, "virtual sensor connection lost, retrying");
                    tokio::time::sleep(RECONNECT_DELAY).await;
                }
            }
        }
    }
}

/// Deterministic pseudo-reading in the 20–80% range, derived from the pot
/// id so repeated checks of the same pot stay stable.
#[must_use]
pub fn synthetic_moisture(pot: PotId) -> f64 {
    let sum: u32 = pot.as_uuid().as_bytes().iter().map(|b| u32::from(*b)).sum();
    f64::from(20 + sum % 61)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_stay_within_plausible_moisture_range() {
        for _ in 0..100 {
            let value = synthetic_moisture(PotId::new());
            assert!((20.0..=80.0).contains(&value));
        }
    }

    #[test]
    fn should_answer_same_pot_with_same_reading() {
        let pot = PotId::new();
        assert_eq!(synthetic_moisture(pot), synthetic_moisture(pot));
    }
}
