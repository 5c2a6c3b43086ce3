// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The root of a published tree.

use std::sync::Arc;

use crate::error::Result;
use crate::model::{Data, ObjectKind};
use crate::object::{BusObject, Hardware, NODE_TOPIC_PREFIX, ObjectList};
use crate::protocol::Gateway;

/// The root object of a published tree.
///
/// A node's path is the fixed topic prefix plus its id; everything beneath
/// it derives its path by appending `"." + id` to its parent's.
pub struct Node {
    gateway: Gateway,
    path: String,
    data: Data,
    hardwares: ObjectList<Hardware>,
}

impl Node {
    /// Creates and publishes a root node.
    ///
    /// # Errors
    ///
    /// Returns an error if a descriptor fails to publish.
    pub fn new(
        gateway: &Gateway,
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self> {
        let id = id.into();
        let path = format!("{NODE_TOPIC_PREFIX}{id}");
        let data = Data::new(ObjectKind::Node, id, name, description);
        gateway.send(&path, &data, true)?;
        let hardwares = ObjectList::new(gateway, &path, "hardwares", "Hardwares", "Hardwares")?;
        Ok(Self {
            gateway: gateway.clone(),
            path,
            data,
            hardwares,
        })
    }

    /// Adds a piece of hardware to the node.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is already taken by a sibling or the
    /// descriptor fails to publish.
    pub fn add_hardware(
        &self,
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Arc<Hardware>> {
        let id = id.into();
        self.hardwares.ensure_vacant(&id)?;
        let hardware = Arc::new(Hardware::new(
            &self.gateway,
            self.hardwares.path(),
            id,
            name,
            description,
        )?);
        self.hardwares.push(Arc::clone(&hardware));
        Ok(hardware)
    }

    /// The node's hardwares.
    #[must_use]
    pub fn hardwares(&self) -> &ObjectList<Hardware> {
        &self.hardwares
    }
}

impl BusObject for Node {
    fn path(&self) -> &str {
        &self.path
    }

    fn data(&self) -> &Data {
        &self.data
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("path", &self.path)
            .field("hardwares", &self.hardwares.len())
            .finish_non_exhaustive()
    }
}
