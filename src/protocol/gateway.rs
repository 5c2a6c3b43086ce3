// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The message gateway object trees publish through.
//!
//! The [`Gateway`] owns one bus transport and a registry mapping destination
//! paths to message handlers. Outbound payloads are serialized to JSON and
//! handed to the transport; inbound messages are decoded and routed to the
//! handler registered for their destination. Failures while processing a
//! message are logged and contained, never crossing the dispatch boundary.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::{DecodeError, Result};
use crate::protocol::{InboundMessage, PERSIST_HEADER, Transport};

#[cfg(feature = "mqtt")]
use crate::protocol::MqttTransportBuilder;

/// A registered route: decoder and handler fused into one closure.
type RouteHandler = Arc<dyn Fn(&[u8]) -> Result<()> + Send + Sync>;

/// Gateway between an object tree and the message bus.
///
/// `Gateway` is cheaply cloneable (via `Arc`); every object in a tree holds
/// a clone and publishes through it.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use hearthbus::protocol::{Gateway, MemoryTransport};
///
/// let transport = Arc::new(MemoryTransport::new());
/// let gateway = Gateway::new(transport.clone());
///
/// gateway.send("/topic/demo", &serde_json::json!({ "id": "demo" }), true)?;
/// assert_eq!(transport.published_on("/topic/demo").len(), 1);
/// # Ok::<(), hearthbus::Error>(())
/// ```
#[derive(Clone)]
pub struct Gateway {
    inner: Arc<GatewayInner>,
}

struct GatewayInner {
    /// The transport all traffic flows through.
    transport: Arc<dyn Transport>,
    /// Destination path to fused route handler.
    routes: RwLock<HashMap<String, RouteHandler>>,
    /// Connection status.
    connected: AtomicBool,
}

impl Gateway {
    /// Creates a gateway over an already-connected transport.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            inner: Arc::new(GatewayInner {
                transport,
                routes: RwLock::new(HashMap::new()),
                connected: AtomicBool::new(true),
            }),
        }
    }

    /// Creates a builder for a gateway connected over MQTT.
    #[cfg(feature = "mqtt")]
    #[must_use]
    pub fn mqtt() -> MqttTransportBuilder {
        MqttTransportBuilder::default()
    }

    /// Returns whether the gateway is connected to the bus.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.inner.connected.load(Ordering::Acquire)
    }

    /// Serializes a payload and publishes it to a destination path.
    ///
    /// The `persist` flag travels in the [`PERSIST_HEADER`] header and asks
    /// the bus to store the message for late subscribers. Sending is fire
    /// and forget: one hand-off to the transport, no retries.
    ///
    /// # Errors
    ///
    /// Returns an error if the gateway has been disconnected, if the payload
    /// does not serialize, or if the transport rejects the hand-off.
    pub fn send<P>(&self, path: &str, payload: &P, persist: bool) -> Result<()>
    where
        P: serde::Serialize + ?Sized,
    {
        if !self.is_connected() {
            return Err(crate::error::ProtocolError::NotConnected.into());
        }
        let body = serde_json::to_vec(payload)?;
        tracing::debug!(
            path = %path,
            payload = %String::from_utf8_lossy(&body),
            persist,
            "Sending message"
        );
        let mut headers = HashMap::new();
        headers.insert(PERSIST_HEADER.to_string(), persist.to_string());
        self.inner.transport.publish(path, body, &headers)?;
        Ok(())
    }

    /// Registers a handler for a destination path and subscribes to it.
    ///
    /// The decoder turns raw payload bytes into a domain object, the handler
    /// consumes it; the two are fused at registration. Registering the same
    /// path again replaces the stored handler without re-subscribing.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport rejects the subscription; the
    /// route is not kept in that case.
    pub fn register<T, D, H>(&self, path: impl Into<String>, decoder: D, handler: H) -> Result<()>
    where
        D: Fn(&[u8]) -> std::result::Result<T, DecodeError> + Send + Sync + 'static,
        H: Fn(T) -> Result<()> + Send + Sync + 'static,
    {
        let path = path.into();
        let route: RouteHandler = Arc::new(move |bytes: &[u8]| {
            let decoded = decoder(bytes)?;
            handler(decoded)
        });

        let replaced = self
            .inner
            .routes
            .write()
            .insert(path.clone(), route)
            .is_some();
        if !replaced && let Err(e) = self.inner.transport.subscribe(&path) {
            self.inner.routes.write().remove(&path);
            return Err(e.into());
        }
        tracing::debug!(path = %path, replaced, "Registered listener");
        Ok(())
    }

    /// Unregisters the handler for a destination path.
    ///
    /// Returns `true` if a handler was previously registered. The transport
    /// subscription is left in place; messages arriving afterwards are
    /// dropped by [`Gateway::dispatch`].
    pub fn unregister(&self, path: &str) -> bool {
        tracing::debug!(path = %path, "Unregistering listener");
        self.inner.routes.write().remove(path).is_some()
    }

    /// Returns the number of registered destination paths.
    #[must_use]
    pub fn registered_count(&self) -> usize {
        self.inner.routes.read().len()
    }

    /// Dispatches one inbound message to its registered handler.
    ///
    /// Messages without a destination, and destinations without a handler,
    /// are logged and dropped. Decode and handler failures are logged and
    /// contained; nothing escapes this call.
    pub fn dispatch(&self, message: InboundMessage) {
        let Some(destination) = message.destination else {
            tracing::warn!("Received a message with no destination");
            return;
        };

        // Clone the route out so the registry is unlocked while the
        // handler runs; handlers may register new routes.
        let route = { self.inner.routes.read().get(&destination).cloned() };
        let Some(route) = route else {
            tracing::warn!(
                destination = %destination,
                "Received a message but no listener registered"
            );
            return;
        };

        tracing::debug!(
            destination = %destination,
            payload = %String::from_utf8_lossy(&message.body),
            "Received message"
        );
        if let Err(e) = route(&message.body) {
            tracing::error!(
                destination = %destination,
                error = %e,
                "Failed to process message"
            );
        }
    }

    /// Spawns a task that dispatches every message from the stream, one at
    /// a time, in delivery order.
    ///
    /// The task ends when the sending side of the channel is dropped.
    pub fn spawn_dispatcher(
        &self,
        mut rx: mpsc::UnboundedReceiver<InboundMessage>,
    ) -> JoinHandle<()> {
        let gateway = self.clone();
        tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                gateway.dispatch(message);
            }
            tracing::debug!("Inbound message stream ended");
        })
    }

    /// Disconnects from the bus.
    ///
    /// Clears all registered routes and releases the transport. Further
    /// sends fail with a protocol error.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport rejects the disconnect hand-off;
    /// the gateway is marked disconnected regardless.
    pub fn disconnect(&self) -> Result<()> {
        tracing::info!("Disconnecting from the bus");
        self.inner.connected.store(false, Ordering::Release);
        self.inner.routes.write().clear();
        self.inner.transport.disconnect()?;
        Ok(())
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("connected", &self.is_connected())
            .field("registered", &self.registered_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::model::Perform;
    use crate::protocol::MemoryTransport;
    use std::sync::atomic::AtomicU32;

    fn gateway() -> (Gateway, Arc<MemoryTransport>) {
        let transport = Arc::new(MemoryTransport::new());
        let gateway = Gateway::new(transport.clone());
        (gateway, transport)
    }

    #[test]
    fn send_serializes_and_sets_persist_header() {
        let (gateway, transport) = gateway();

        gateway
            .send("/topic/a", &serde_json::json!({ "id": "a" }), true)
            .unwrap();
        gateway
            .send("/topic/b", &serde_json::json!({ "id": "b" }), false)
            .unwrap();

        let a = transport.published_on("/topic/a");
        assert_eq!(a.len(), 1);
        assert!(a[0].persist());
        assert_eq!(a[0].json().unwrap(), serde_json::json!({ "id": "a" }));

        let b = transport.published_on("/topic/b");
        assert!(!b[0].persist());
    }

    #[test]
    fn register_subscribes_once_per_path() {
        let (gateway, transport) = gateway();

        gateway
            .register("/topic/x.perform", Perform::decode, |_| Ok(()))
            .unwrap();
        gateway
            .register("/topic/x.perform", Perform::decode, |_| Ok(()))
            .unwrap();

        assert_eq!(transport.subscriptions(), vec!["/topic/x.perform"]);
        assert_eq!(gateway.registered_count(), 1);
    }

    #[test]
    fn dispatch_routes_to_registered_handler() {
        let (gateway, _transport) = gateway();

        let count = Arc::new(AtomicU32::new(0));
        let count_clone = count.clone();
        gateway
            .register("/topic/x.perform", Perform::decode, move |perform: Perform| {
                assert_eq!(perform.op_id, "op-1");
                count_clone.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .unwrap();

        gateway.dispatch(InboundMessage::new(
            "/topic/x.perform",
            br#"{"opId":"op-1"}"#.to_vec(),
        ));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dispatch_replaced_handler_wins() {
        let (gateway, _transport) = gateway();

        let first = Arc::new(AtomicU32::new(0));
        let first_clone = first.clone();
        gateway
            .register("/topic/x", Perform::decode, move |_| {
                first_clone.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .unwrap();

        let second = Arc::new(AtomicU32::new(0));
        let second_clone = second.clone();
        gateway
            .register("/topic/x", Perform::decode, move |_| {
                second_clone.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .unwrap();

        gateway.dispatch(InboundMessage::new("/topic/x", br#"{"opId":"o"}"#.to_vec()));
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dispatch_drops_message_without_destination() {
        let (gateway, _transport) = gateway();

        let count = Arc::new(AtomicU32::new(0));
        let count_clone = count.clone();
        gateway
            .register("/topic/x", Perform::decode, move |_| {
                count_clone.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .unwrap();

        gateway.dispatch(InboundMessage::without_destination(
            br#"{"opId":"o"}"#.to_vec(),
        ));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn dispatch_drops_unregistered_destination() {
        let (gateway, _transport) = gateway();
        // No handlers registered; must not panic.
        gateway.dispatch(InboundMessage::new("/topic/nowhere", b"{}".to_vec()));
    }

    #[test]
    fn dispatch_contains_decode_failures() {
        let (gateway, _transport) = gateway();

        let count = Arc::new(AtomicU32::new(0));
        let count_clone = count.clone();
        gateway
            .register("/topic/x", Perform::decode, move |_| {
                count_clone.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .unwrap();

        gateway.dispatch(InboundMessage::new("/topic/x", b"not json".to_vec()));
        assert_eq!(count.load(Ordering::SeqCst), 0);

        // Later messages still dispatch.
        gateway.dispatch(InboundMessage::new("/topic/x", br#"{"opId":"o"}"#.to_vec()));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dispatch_contains_handler_failures() {
        let (gateway, _transport) = gateway();

        gateway
            .register("/topic/x", Perform::decode, |_| {
                Err(Error::Callback("deliberate".to_string()))
            })
            .unwrap();

        gateway.dispatch(InboundMessage::new("/topic/x", br#"{"opId":"o"}"#.to_vec()));
    }

    #[test]
    fn unregister_removes_route() {
        let (gateway, _transport) = gateway();

        gateway
            .register("/topic/x", Perform::decode, |_| Ok(()))
            .unwrap();
        assert_eq!(gateway.registered_count(), 1);

        assert!(gateway.unregister("/topic/x"));
        assert!(!gateway.unregister("/topic/x"));
        assert_eq!(gateway.registered_count(), 0);
    }

    #[test]
    fn send_after_disconnect_fails() {
        let (gateway, transport) = gateway();

        gateway.disconnect().unwrap();
        assert!(!gateway.is_connected());
        assert!(transport.is_disconnected());

        let result = gateway.send("/topic/a", &serde_json::json!({}), false);
        assert!(matches!(
            result,
            Err(Error::Protocol(crate::error::ProtocolError::NotConnected))
        ));
    }

    #[test]
    fn disconnect_clears_routes() {
        let (gateway, _transport) = gateway();

        gateway
            .register("/topic/x", Perform::decode, |_| Ok(()))
            .unwrap();
        gateway.disconnect().unwrap();
        assert_eq!(gateway.registered_count(), 0);
    }

    #[tokio::test]
    async fn dispatcher_drains_stream_in_order() {
        let (gateway, _transport) = gateway();

        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        gateway
            .register("/topic/x", Perform::decode, move |perform: Perform| {
                seen_clone.lock().push(perform.op_id);
                Ok(())
            })
            .unwrap();

        let (tx, rx) = mpsc::unbounded_channel();
        let handle = gateway.spawn_dispatcher(rx);

        for op in ["first", "second", "third"] {
            let body = format!(r#"{{"opId":"{op}"}}"#);
            tx.send(InboundMessage::new("/topic/x", body.into_bytes()))
                .unwrap();
        }
        drop(tx);
        handle.await.unwrap();

        assert_eq!(*seen.lock(), vec!["first", "second", "third"]);
    }
}
