// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Composable device capabilities.
//!
//! An [`Ability`] expands a capability declaration into the concrete
//! commands and values a device publishes. Abilities keep references to the
//! values they created, so externally-observed state changes can be pushed
//! onto the bus later (`set_on`, `set_percent`, `set_temperature`).
//!
//! Capability refinement is composition, not inheritance: a
//! [`PowerVariable`] owns a [`Power`] and delegates to it, a [`Thermostat`]
//! owns a [`TemperatureSensor`].
//!
//! # Examples
//!
//! ```
//! use std::collections::BTreeSet;
//! use std::sync::Arc;
//! use hearthbus::ability::{Ability, Power};
//! use hearthbus::object::Node;
//! use hearthbus::protocol::{Gateway, MemoryTransport};
//!
//! # fn main() -> hearthbus::Result<()> {
//! let gateway = Gateway::new(Arc::new(MemoryTransport::new()));
//! let node = Node::new(&gateway, "home", "Home", "Node for the house")?;
//! let hardware = node.add_hardware("relays", "Relays", "Relay board")?;
//!
//! let power = Power::new(|| Ok(()), || Ok(()));
//! let device = hardware.add_device_connected(
//!     "lamp",
//!     "Lamp",
//!     "Bedside lamp",
//!     vec![Arc::clone(&power) as Arc<dyn Ability>],
//!     BTreeSet::from(["light".to_string()]),
//! )?;
//!
//! assert_eq!(device.device_data().abilities, ["power"]);
//! power.on()?;
//! # Ok(())
//! # }
//! ```

mod power;
mod temperature;

pub use power::{Power, PowerVariable};
pub use temperature::{TemperatureSensor, Thermostat};

use std::sync::Arc;

use crate::error::Result;
use crate::object::DeviceConnected;

/// A composable capability expanding into commands and values on a device.
pub trait Ability: Send + Sync {
    /// The capability identifiers this ability declares, e.g.
    /// `"power.variable"`.
    fn names(&self) -> Vec<String>;

    /// Materializes the ability's commands and values on a device.
    ///
    /// Called once per device, in ability declaration order, right after
    /// the device's descriptor publishes.
    ///
    /// # Errors
    ///
    /// Returns an error if a command or value fails to publish.
    fn configure(self: Arc<Self>, device: &DeviceConnected) -> Result<()>;
}
