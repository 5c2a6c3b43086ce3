// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bus communication for published object trees.
//!
//! This module provides the [`Gateway`] that object trees publish through,
//! the [`Transport`] seam it drives, and the bundled transport
//! implementations.
//!
//! # Transports
//!
//! - [`MqttTransport`]: MQTT bus connection (feature `mqtt`, default on)
//! - [`MemoryTransport`]: in-process recording transport for tests and
//!   custom wiring
//!
//! Destinations double as MQTT topic names, so the dotted object paths
//! travel unchanged.

mod gateway;
mod memory;
#[cfg(feature = "mqtt")]
mod mqtt;

pub use gateway::Gateway;
pub use memory::{MemoryTransport, PublishedMessage};
#[cfg(feature = "mqtt")]
pub use mqtt::{MqttTransport, MqttTransportBuilder};

use std::collections::HashMap;

use crate::error::ProtocolError;

/// Header key carrying whether a message should be stored by the bus.
///
/// The value is `"true"` or `"false"`. On MQTT this maps to the retain
/// flag, so retained descriptors let late subscribers see the tree.
pub const PERSIST_HEADER: &str = "persist";

/// A message delivered by the transport.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    /// Destination the message arrived on, if the bus reported one.
    pub destination: Option<String>,
    /// Transport-level headers.
    pub headers: HashMap<String, String>,
    /// Raw payload bytes.
    pub body: Vec<u8>,
}

impl InboundMessage {
    /// Creates a message for the given destination.
    #[must_use]
    pub fn new(destination: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            destination: Some(destination.into()),
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    /// Creates a message that arrived without a destination.
    #[must_use]
    pub fn without_destination(body: impl Into<Vec<u8>>) -> Self {
        Self {
            destination: None,
            headers: HashMap::new(),
            body: body.into(),
        }
    }
}

/// Trait for bus transports the gateway can drive.
///
/// All methods are synchronous hand-offs: they enqueue the operation with
/// the transport and return without waiting for the bus to confirm it.
/// Inbound messages flow the other way, through the
/// [`InboundMessage`] channel handed to the transport at connect time.
pub trait Transport: Send + Sync {
    /// Publishes a message to a destination.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the message cannot be handed to the bus.
    fn publish(
        &self,
        destination: &str,
        body: Vec<u8>,
        headers: &HashMap<String, String>,
    ) -> Result<(), ProtocolError>;

    /// Subscribes to a destination.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the subscription cannot be handed to the
    /// bus.
    fn subscribe(&self, destination: &str) -> Result<(), ProtocolError>;

    /// Disconnects from the bus.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the disconnect cannot be handed to the
    /// bus.
    fn disconnect(&self) -> Result<(), ProtocolError>;
}
