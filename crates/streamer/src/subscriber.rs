// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! MQTT subscriber: owns the broker session, subscribes to one topic, and
//! forwards every received message to the pipeline service.
//!
//! Reconnection is delegated to the rumqttc event loop, which re-dials on
//! the next poll after a connection error; the subscriber only reports the
//! failure and backs off briefly. Subscription rejection is reported but
//! leaves the session up.

use crate::errors::CreationError;
use crate::pipeline_service::PipelineHandle;
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS, SubscribeReasonCode};
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

const KEEP_ALIVE: Duration = Duration::from_secs(30);
const RECONNECT_BACKOFF: Duration = Duration::from_secs(1);
const EVENT_CHANNEL_CAPACITY: usize = 64;
const DEFAULT_MQTT_PORT: u16 = 1883;

/// Validated broker URL: `mqtt://` or `tcp://` host with optional port.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BrokerUrl {
    host: String,
    port: u16,
}

impl BrokerUrl {
    pub fn parse(url: &str) -> Result<Self, CreationError> {
        let rest = url
            .strip_prefix("mqtt://")
            .or_else(|| url.strip_prefix("tcp://"))
            .unwrap_or(url);

        let (host, port) = match rest.rsplit_once(':') {
            Some((host, port)) => {
                let port = port.parse::<u16>().map_err(|_| {
                    CreationError::BrokerUrl(format!("invalid port in '{}'", url))
                })?;
                (host, port)
            }
            None => (rest, DEFAULT_MQTT_PORT),
        };

        if host.is_empty() {
            return Err(CreationError::BrokerUrl(format!(
                "missing host in '{}'",
                url
            )));
        }

        Ok(BrokerUrl {
            host: host.to_string(),
            port,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

/// Broker connection descriptor.
#[derive(Clone, Debug)]
pub struct SubscriberConfig {
    /// Broker URL, e.g. "mqtt://broker.local:1883".
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Topic to subscribe to.
    pub topic: String,
    /// Client identifier presented to the broker.
    pub client_id: String,
}

/// Owns the broker session and feeds the pipeline.
pub struct Subscriber {
    client: AsyncClient,
    eventloop: EventLoop,
    topic: String,
    pipeline_handle: PipelineHandle,
    cancel_token: CancellationToken,
}

impl Subscriber {
    pub fn new(
        config: &SubscriberConfig,
        pipeline_handle: PipelineHandle,
        cancel_token: CancellationToken,
    ) -> Result<Subscriber, CreationError> {
        let broker = BrokerUrl::parse(&config.url)?;

        let mut options = MqttOptions::new(&config.client_id, broker.host(), broker.port());
        options.set_keep_alive(KEEP_ALIVE);
        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            options.set_credentials(username, password);
        }

        let (client, eventloop) = AsyncClient::new(options, EVENT_CHANNEL_CAPACITY);

        Ok(Subscriber {
            client,
            eventloop,
            topic: config.topic.clone(),
            pipeline_handle,
            cancel_token,
        })
    }

    /// Main event loop: polls the broker session until cancelled, handing
    /// every publish on the subscribed topic to the pipeline exactly once,
    /// in delivery order.
    pub async fn spin(mut self) {
        loop {
            let event = tokio::select! {
                event = self.eventloop.poll() => event,
                _ = self.cancel_token.cancelled() => break,
            };

            match event {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    info!("Connected to MQTT broker");
                    // Re-subscribe on every (re)connection; rejection leaves
                    // the session otherwise usable.
                    if let Err(e) = self.client.subscribe(&self.topic, QoS::AtLeastOnce).await {
                        error!("Subscription error: {e}");
                    }
                }
                Ok(Event::Incoming(Packet::SubAck(suback))) => {
                    if suback
                        .return_codes
                        .iter()
                        .any(|code| matches!(code, SubscribeReasonCode::Failure))
                    {
                        error!("Subscription rejected by broker for topic {}", self.topic);
                    } else {
                        info!("Subscribed to topic {}", self.topic);
                    }
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    debug!("Publish received on {}", publish.topic);
                    if let Err(e) = self
                        .pipeline_handle
                        .process(publish.topic.clone(), publish.payload.to_vec())
                    {
                        error!("Failed to hand message to pipeline: {e}");
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    error!("Connection error: {e}");
                    // The event loop reconnects on the next poll; back off so
                    // an unreachable broker does not spin hot.
                    tokio::select! {
                        _ = sleep(RECONNECT_BACKOFF) => {}
                        _ = self.cancel_token.cancelled() => break,
                    }
                }
            }
        }

        debug!("Subscriber stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::influx::{InfluxApi, InfluxConfig};
    use crate::pipeline::{Pipeline, ProjectionConfig};
    use crate::pipeline_service::PipelineService;

    #[test]
    fn test_broker_url_with_scheme_and_port() {
        let url = BrokerUrl::parse("mqtt://broker.local:8883").unwrap();
        assert_eq!(url.host(), "broker.local");
        assert_eq!(url.port(), 8883);
    }

    #[test]
    fn test_broker_url_default_port() {
        let url = BrokerUrl::parse("mqtt://broker.local").unwrap();
        assert_eq!(url.port(), DEFAULT_MQTT_PORT);
    }

    #[test]
    fn test_broker_url_tcp_scheme_and_bare_host() {
        assert_eq!(
            BrokerUrl::parse("tcp://broker.local:1883").unwrap(),
            BrokerUrl::parse("broker.local:1883").unwrap()
        );
    }

    #[test]
    fn test_broker_url_rejects_bad_input() {
        assert!(matches!(
            BrokerUrl::parse("mqtt://"),
            Err(CreationError::BrokerUrl(_))
        ));
        assert!(matches!(
            BrokerUrl::parse("mqtt://broker.local:notaport"),
            Err(CreationError::BrokerUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_subscriber_cancellation() {
        let influx = InfluxApi::new(&InfluxConfig {
            url: "http://127.0.0.1:1".to_string(),
            token: "test-token".to_string(),
            org: "test-org".to_string(),
            bucket: "test-bucket".to_string(),
            timeout: None,
        })
        .expect("influx api creation failed");
        let (service, handle) =
            PipelineService::new(Pipeline::new(influx, ProjectionConfig::default()));
        tokio::spawn(service.run());

        let cancel_token = CancellationToken::new();
        let subscriber = Subscriber::new(
            &SubscriberConfig {
                // Unroutable broker: the subscriber must still shut down
                // promptly on cancellation.
                url: "mqtt://127.0.0.1:1".to_string(),
                username: None,
                password: None,
                topic: "sensors/#".to_string(),
                client_id: "test-client".to_string(),
            },
            handle.clone(),
            cancel_token.clone(),
        )
        .expect("subscriber creation failed");

        let task = tokio::spawn(subscriber.spin());
        cancel_token.cancel();

        let result = tokio::time::timeout(Duration::from_secs(2), task).await;
        assert!(result.is_ok(), "subscriber should stop after cancellation");

        handle.shutdown().expect("Failed to shutdown");
    }
}
