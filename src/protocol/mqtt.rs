// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MQTT bus transport.
//!
//! Destinations map directly onto MQTT topic names and the persist header
//! maps onto the retain flag, so retained descriptors let subscribers that
//! arrive late still see the published tree.
//!
//! # Examples
//!
//! ```no_run
//! use hearthbus::protocol::Gateway;
//!
//! # async fn example() -> hearthbus::Result<()> {
//! let gateway = Gateway::mqtt()
//!     .host("192.168.1.50")
//!     .port(1883)
//!     .credentials("user", "password")
//!     .connect()
//!     .await?;
//!
//! assert!(gateway.is_connected());
//! gateway.disconnect()?;
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use rumqttc::{AsyncClient, EventLoop, MqttOptions, QoS};
use tokio::sync::{mpsc, oneshot};

use crate::error::{ProtocolError, Result};
use crate::protocol::{Gateway, InboundMessage, PERSIST_HEADER, Transport};

/// Global counter for generating unique client IDs.
static CLIENT_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Configuration for an MQTT bus connection.
#[derive(Debug, Clone)]
pub struct MqttConfig {
    host: String,
    port: u16,
    credentials: Option<(String, String)>,
    keep_alive: Duration,
    connection_timeout: Duration,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 1883,
            credentials: None,
            keep_alive: Duration::from_secs(30),
            connection_timeout: Duration::from_secs(10),
        }
    }
}

/// An MQTT connection implementing [`Transport`].
///
/// Publishes, subscriptions and disconnects are synchronous hand-offs to
/// the client's request queue; a background task drives the event loop and
/// forwards every inbound publish as an [`InboundMessage`].
pub struct MqttTransport {
    client: AsyncClient,
}

impl MqttTransport {
    /// Creates a new builder for configuring an MQTT connection.
    #[must_use]
    pub fn builder() -> MqttTransportBuilder {
        MqttTransportBuilder::default()
    }
}

impl Transport for MqttTransport {
    fn publish(
        &self,
        destination: &str,
        body: Vec<u8>,
        headers: &HashMap<String, String>,
    ) -> std::result::Result<(), ProtocolError> {
        let retain = headers
            .get(PERSIST_HEADER)
            .is_some_and(|value| value == "true");
        self.client
            .try_publish(destination, QoS::AtLeastOnce, retain, body)?;
        Ok(())
    }

    fn subscribe(&self, destination: &str) -> std::result::Result<(), ProtocolError> {
        self.client.try_subscribe(destination, QoS::AtLeastOnce)?;
        Ok(())
    }

    fn disconnect(&self) -> std::result::Result<(), ProtocolError> {
        self.client.try_disconnect()?;
        Ok(())
    }
}

impl std::fmt::Debug for MqttTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MqttTransport").finish_non_exhaustive()
    }
}

/// Builder for an MQTT-connected gateway.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use hearthbus::protocol::Gateway;
///
/// # async fn example() -> hearthbus::Result<()> {
/// let gateway = Gateway::mqtt()
///     .host("192.168.1.50")
///     .keep_alive(Duration::from_secs(60))
///     .connection_timeout(Duration::from_secs(5))
///     .connect()
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct MqttTransportBuilder {
    config: MqttConfig,
}

impl MqttTransportBuilder {
    /// Sets the broker host address.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Sets the broker port (default: 1883).
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Sets authentication credentials.
    #[must_use]
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.config.credentials = Some((username.into(), password.into()));
        self
    }

    /// Sets the keep-alive interval (default: 30 seconds).
    #[must_use]
    pub fn keep_alive(mut self, duration: Duration) -> Self {
        self.config.keep_alive = duration;
        self
    }

    /// Sets the connection timeout (default: 10 seconds).
    #[must_use]
    pub fn connection_timeout(mut self, duration: Duration) -> Self {
        self.config.connection_timeout = duration;
        self
    }

    /// Connects and returns a gateway with a running dispatcher.
    ///
    /// # Errors
    ///
    /// Returns an error if the host is not set, the connection fails, or
    /// the connection times out.
    pub async fn connect(self) -> Result<Gateway> {
        let (tx, rx) = mpsc::unbounded_channel();
        let transport = self.connect_transport(tx).await?;
        let gateway = Gateway::new(Arc::new(transport));
        gateway.spawn_dispatcher(rx);
        Ok(gateway)
    }

    /// Connects and returns the bare transport for custom wiring.
    ///
    /// Inbound publishes are forwarded to `tx`; the caller decides how to
    /// drain them. Blocks until the broker acknowledges the connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the host is not set, the connection fails, or
    /// the connection times out.
    pub async fn connect_transport(
        self,
        tx: mpsc::UnboundedSender<InboundMessage>,
    ) -> std::result::Result<MqttTransport, ProtocolError> {
        if self.config.host.is_empty() {
            return Err(ProtocolError::InvalidAddress(
                "MQTT broker host is required".to_string(),
            ));
        }

        // Generate a unique client ID (PID + counter to avoid conflicts)
        let counter = CLIENT_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
        let client_id = format!("hearthbus_{}_{}", std::process::id(), counter);

        let mut mqtt_options = MqttOptions::new(&client_id, &self.config.host, self.config.port);
        mqtt_options.set_keep_alive(self.config.keep_alive);
        mqtt_options.set_clean_session(true);

        if let Some((ref username, ref password)) = self.config.credentials {
            mqtt_options.set_credentials(username, password);
        }

        let (client, event_loop) = AsyncClient::new(mqtt_options, 10);

        // Channel to signal when ConnAck is received
        let (connack_tx, connack_rx) = oneshot::channel();

        tokio::spawn(async move {
            forward_events(event_loop, tx, Some(connack_tx)).await;
        });

        // Wait for ConnAck with timeout
        let timeout = self.config.connection_timeout;
        match tokio::time::timeout(timeout, connack_rx).await {
            Ok(Ok(())) => {
                tracing::info!(
                    host = %self.config.host,
                    port = self.config.port,
                    "Connected to MQTT broker"
                );
            }
            Ok(Err(_)) => {
                return Err(ProtocolError::ConnectionFailed(
                    "MQTT event loop terminated unexpectedly".to_string(),
                ));
            }
            Err(_) => {
                return Err(ProtocolError::Timeout(
                    u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                ));
            }
        }

        Ok(MqttTransport { client })
    }
}

/// Drives the MQTT event loop, forwarding inbound publishes.
async fn forward_events(
    mut event_loop: EventLoop,
    tx: mpsc::UnboundedSender<InboundMessage>,
    mut connack_tx: Option<oneshot::Sender<()>>,
) {
    use rumqttc::{Event, Packet};

    loop {
        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(connack))) => {
                tracing::debug!(?connack, "MQTT connection acknowledged");
                if let Some(sender) = connack_tx.take() {
                    let _ = sender.send(());
                }
            }
            Ok(Event::Incoming(Packet::SubAck(suback))) => {
                tracing::debug!(?suback, "MQTT subscription acknowledged");
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                let headers =
                    HashMap::from([(PERSIST_HEADER.to_string(), publish.retain.to_string())]);
                let message = InboundMessage {
                    destination: Some(publish.topic.clone()),
                    headers,
                    body: publish.payload.to_vec(),
                };
                if tx.send(message).is_err() {
                    tracing::debug!("Inbound receiver dropped, stopping MQTT event loop");
                    break;
                }
            }
            Ok(Event::Incoming(Packet::Disconnect)) => {
                tracing::info!("MQTT broker disconnected");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::error!(error = %e, "MQTT event loop error");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_default_values() {
        let builder = MqttTransportBuilder::default();
        assert_eq!(builder.config.port, 1883);
        assert!(builder.config.host.is_empty());
        assert!(builder.config.credentials.is_none());
        assert_eq!(builder.config.keep_alive, Duration::from_secs(30));
        assert_eq!(builder.config.connection_timeout, Duration::from_secs(10));
    }

    #[test]
    fn builder_chain() {
        let builder = MqttTransportBuilder::default()
            .host("192.168.1.50")
            .port(8883)
            .credentials("admin", "secret")
            .keep_alive(Duration::from_secs(45))
            .connection_timeout(Duration::from_secs(15));

        assert_eq!(builder.config.host, "192.168.1.50");
        assert_eq!(builder.config.port, 8883);
        assert!(builder.config.credentials.is_some());
        assert_eq!(builder.config.keep_alive, Duration::from_secs(45));
        assert_eq!(builder.config.connection_timeout, Duration::from_secs(15));
    }

    #[tokio::test]
    async fn builder_missing_host_fails() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let result = MqttTransportBuilder::default().connect_transport(tx).await;
        assert!(matches!(result, Err(ProtocolError::InvalidAddress(_))));
    }

    #[tokio::test]
    async fn connect_missing_host_fails() {
        let result = Gateway::mqtt().connect().await;
        assert!(result.is_err());
    }
}
