// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Hardware bridging devices onto the bus.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::ability::Ability;
use crate::error::Result;
use crate::model::{Data, ObjectKind};
use crate::object::{BusObject, DeviceConnected, ObjectList};
use crate::protocol::Gateway;

/// A piece of hardware owning connected devices.
pub struct Hardware {
    gateway: Gateway,
    path: String,
    data: Data,
    devices: ObjectList<DeviceConnected>,
}

impl Hardware {
    pub(crate) fn new(
        gateway: &Gateway,
        parent_path: &str,
        id: String,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self> {
        let path = format!("{parent_path}.{id}");
        let data = Data::new(ObjectKind::Hardware, id, name, description);
        gateway.send(&path, &data, true)?;
        let devices = ObjectList::new(gateway, &path, "devices", "Devices", "Devices")?;
        Ok(Self {
            gateway: gateway.clone(),
            path,
            data,
            devices,
        })
    }

    /// Adds a connected device with its abilities and device classes.
    ///
    /// Each ability's `configure` runs against the new device in declaration
    /// order, populating its command and value lists.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is already taken by a sibling device, if a
    /// descriptor fails to publish, or if an ability fails to configure.
    pub fn add_device_connected(
        &self,
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        abilities: Vec<Arc<dyn Ability>>,
        classes: BTreeSet<String>,
    ) -> Result<Arc<DeviceConnected>> {
        let id = id.into();
        self.devices.ensure_vacant(&id)?;
        let device = DeviceConnected::new(
            &self.gateway,
            self.devices.path(),
            id,
            name,
            description,
            abilities,
            classes,
        )?;
        self.devices.push(Arc::clone(&device));
        Ok(device)
    }

    /// The hardware's connected devices.
    #[must_use]
    pub fn devices(&self) -> &ObjectList<DeviceConnected> {
        &self.devices
    }
}

impl BusObject for Hardware {
    fn path(&self) -> &str {
        &self.path
    }

    fn data(&self) -> &Data {
        &self.data
    }
}

impl std::fmt::Debug for Hardware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hardware")
            .field("path", &self.path)
            .field("devices", &self.devices.len())
            .finish_non_exhaustive()
    }
}
