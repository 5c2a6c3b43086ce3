// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `hearthbus` - A Rust library to mirror a device tree onto a message bus.
//!
//! This library publishes a hierarchical tree of hardware, devices, commands
//! and values onto an MQTT bus and routes inbound command messages back to
//! in-process callbacks. Devices declare composable abilities (power
//! control, variable power, temperature sensing, thermostat control) and
//! the library derives and publishes the commands and values each ability
//! requires.
//!
//! # How it fits together
//!
//! - Every object publishes its descriptor when it is created, on a
//!   dot-separated path derived from its parent (`parent.path + "." + id`).
//! - Commands listen on `<path>.perform` and answer each request with two
//!   status publishes on `<path>.performStatus`: one on receipt, one on
//!   completion (carrying the error text if execution failed).
//! - Values publish state updates on `<path>.value`.
//! - All failures while processing an inbound message are contained at the
//!   dispatch boundary; one bad message never stops the next.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::collections::BTreeSet;
//! use std::sync::Arc;
//! use hearthbus::ability::{Ability, Power};
//! use hearthbus::object::Node;
//! use hearthbus::protocol::Gateway;
//!
//! #[tokio::main]
//! async fn main() -> hearthbus::Result<()> {
//!     let gateway = Gateway::mqtt()
//!         .host("192.168.1.50")
//!         .credentials("user", "password")
//!         .connect()
//!         .await?;
//!
//!     let node = Node::new(&gateway, "home", "Home", "Node for the house")?;
//!     let hardware = node.add_hardware("relays", "Relays", "Relay board")?;
//!
//!     // The power ability expands into on/off commands and an "on" value.
//!     let power = Power::new(
//!         || Ok(()), // drive the real relay on
//!         || Ok(()), // drive the real relay off
//!     );
//!     hardware.add_device_connected(
//!         "lamp",
//!         "Lamp",
//!         "Bedside lamp",
//!         vec![Arc::clone(&power) as Arc<dyn Ability>],
//!         BTreeSet::from(["light".to_string()]),
//!     )?;
//!
//!     // Push externally-observed state changes at any time.
//!     power.set_on(true)?;
//!
//!     gateway.disconnect()?;
//!     Ok(())
//! }
//! ```
//!
//! # Testing without a broker
//!
//! [`MemoryTransport`] records everything the gateway publishes, so trees
//! can be built and inspected without a running bus:
//!
//! ```
//! use std::sync::Arc;
//! use hearthbus::object::Node;
//! use hearthbus::protocol::{Gateway, MemoryTransport};
//!
//! # fn main() -> hearthbus::Result<()> {
//! let transport = Arc::new(MemoryTransport::new());
//! let gateway = Gateway::new(transport.clone());
//!
//! Node::new(&gateway, "home", "Home", "Node for the house")?;
//! assert_eq!(
//!     transport.published()[0].destination,
//!     "/topic/real.1-0.json.nodes.home"
//! );
//! # Ok(())
//! # }
//! ```

pub mod ability;
pub mod error;
pub mod model;
pub mod object;
pub mod protocol;
pub mod types;

pub use ability::{Ability, Power, PowerVariable, TemperatureSensor, Thermostat};
pub use error::{CoercionError, DecodeError, Error, ProtocolError, Result};
pub use model::{Data, DeviceConnectedData, ObjectKind, Perform, PerformStatus, TypeInstance};
pub use object::{
    BusObject, Command, DeviceConnected, Hardware, NODE_TOPIC_PREFIX, Node, ObjectList, Parameter,
    Value,
};
pub use protocol::{Gateway, InboundMessage, MemoryTransport, PERSIST_HEADER, Transport};
#[cfg(feature = "mqtt")]
pub use protocol::{MqttTransport, MqttTransportBuilder};
pub use types::{
    BooleanKind, FloatKind, IntegerKind, LongKind, NativeValue, StringKind, ValueKind,
};
