// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-process recording transport.
//!
//! [`MemoryTransport`] records everything the gateway hands to it, for
//! inspection in tests and for wiring object trees without a real bus.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::error::ProtocolError;
use crate::protocol::{PERSIST_HEADER, Transport};

/// One message handed to the transport for publication.
#[derive(Debug, Clone)]
pub struct PublishedMessage {
    /// Destination path.
    pub destination: String,
    /// Serialized payload bytes.
    pub body: Vec<u8>,
    /// Headers, including the persist header.
    pub headers: HashMap<String, String>,
}

impl PublishedMessage {
    /// Whether the persist header asked the bus to store the message.
    #[must_use]
    pub fn persist(&self) -> bool {
        self.headers
            .get(PERSIST_HEADER)
            .is_some_and(|value| value == "true")
    }

    /// Parses the payload as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is not valid JSON.
    pub fn json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::from_slice(&self.body)
    }
}

/// A transport that records instead of talking to a bus.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    published: Mutex<Vec<PublishedMessage>>,
    subscriptions: Mutex<Vec<String>>,
    disconnected: AtomicBool,
}

impl MemoryTransport {
    /// Creates a new empty recording transport.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every message published so far, in publish order.
    #[must_use]
    pub fn published(&self) -> Vec<PublishedMessage> {
        self.published.lock().clone()
    }

    /// The messages published to one destination, in publish order.
    #[must_use]
    pub fn published_on(&self, destination: &str) -> Vec<PublishedMessage> {
        self.published
            .lock()
            .iter()
            .filter(|message| message.destination == destination)
            .cloned()
            .collect()
    }

    /// The destinations subscribed to, in subscription order.
    #[must_use]
    pub fn subscriptions(&self) -> Vec<String> {
        self.subscriptions.lock().clone()
    }

    /// Whether `disconnect` has been called.
    #[must_use]
    pub fn is_disconnected(&self) -> bool {
        self.disconnected.load(Ordering::Acquire)
    }
}

impl Transport for MemoryTransport {
    fn publish(
        &self,
        destination: &str,
        body: Vec<u8>,
        headers: &HashMap<String, String>,
    ) -> Result<(), ProtocolError> {
        self.published.lock().push(PublishedMessage {
            destination: destination.to_string(),
            body,
            headers: headers.clone(),
        });
        Ok(())
    }

    fn subscribe(&self, destination: &str) -> Result<(), ProtocolError> {
        self.subscriptions.lock().push(destination.to_string());
        Ok(())
    }

    fn disconnect(&self) -> Result<(), ProtocolError> {
        self.disconnected.store(true, Ordering::Release);
        Ok(())
    }
}
