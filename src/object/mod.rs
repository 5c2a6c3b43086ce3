// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The published object tree.
//!
//! Objects form a strict hierarchy: a [`Node`] owns hardwares, a
//! [`Hardware`] owns connected devices, a [`DeviceConnected`] owns commands
//! and values, a [`Command`] owns parameters. Every object publishes its
//! descriptor through the gateway before its constructor returns, on a path
//! derived from its parent: `parent.path + "." + id`. Container
//! relationships are [`ObjectList`]s, themselves published objects.
//!
//! # Building a tree
//!
//! ```
//! use std::sync::Arc;
//! use hearthbus::object::Node;
//! use hearthbus::protocol::{Gateway, MemoryTransport};
//!
//! # fn main() -> hearthbus::Result<()> {
//! let gateway = Gateway::new(Arc::new(MemoryTransport::new()));
//! let node = Node::new(&gateway, "home", "Home", "Node for the house")?;
//! let hardware = node.add_hardware("relays", "Relays", "Relay board")?;
//! # Ok(())
//! # }
//! ```

mod command;
mod device;
mod hardware;
mod list;
mod node;
mod value;

pub use command::{Command, Parameter};
pub use device::DeviceConnected;
pub use hardware::Hardware;
pub use list::ObjectList;
pub use node::Node;
pub use value::Value;

use crate::model::Data;

/// Topic prefix all node paths are rooted at.
pub const NODE_TOPIC_PREFIX: &str = "/topic/real.1-0.json.nodes.";

/// Common surface of every published object.
pub trait BusObject {
    /// The bus path this object was published on.
    fn path(&self) -> &str;

    /// The descriptor published for this object.
    fn data(&self) -> &Data;

    /// The object's id, unique among its siblings.
    fn id(&self) -> &str {
        &self.data().id
    }
}
