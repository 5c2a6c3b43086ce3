// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Connected devices.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::ability::Ability;
use crate::error::Result;
use crate::model::{Data, DeviceConnectedData};
use crate::object::command::CommandCallback;
use crate::object::{BusObject, Command, ObjectList, Value};
use crate::protocol::Gateway;
use crate::types::{NativeValue, ValueKind};

/// A device connected to its hardware.
///
/// The device's descriptor carries the flattened names of every declared
/// ability, in declaration order; the abilities themselves populate the
/// `commands` and `values` lists when their `configure` runs, immediately
/// after the descriptor and the empty lists have published.
pub struct DeviceConnected {
    gateway: Gateway,
    path: String,
    data: DeviceConnectedData,
    commands: ObjectList<Command>,
    values: ObjectList<Value>,
}

impl DeviceConnected {
    pub(crate) fn new(
        gateway: &Gateway,
        parent_path: &str,
        id: String,
        name: impl Into<String>,
        description: impl Into<String>,
        abilities: Vec<Arc<dyn Ability>>,
        classes: BTreeSet<String>,
    ) -> Result<Arc<Self>> {
        let path = format!("{parent_path}.{id}");
        let names = abilities
            .iter()
            .flat_map(|ability| ability.names())
            .collect();
        let data = DeviceConnectedData::new(id, name, description, names, classes);
        gateway.send(&path, &data, true)?;
        let commands = ObjectList::new(gateway, &path, "commands", "Commands", "Commands")?;
        let values = ObjectList::new(gateway, &path, "values", "Values", "Values")?;

        let device = Arc::new(Self {
            gateway: gateway.clone(),
            path,
            data,
            commands,
            values,
        });
        for ability in abilities {
            ability.configure(&device)?;
        }
        Ok(device)
    }

    /// Adds a command to the device.
    ///
    /// The callback receives its arguments as a slice, in the order the
    /// command's parameters are declared; a parameter the caller sent no
    /// instances for arrives as `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is already taken by a sibling command or
    /// the descriptor fails to publish.
    pub fn add_command<F>(
        &self,
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        callback: F,
    ) -> Result<Arc<Command>>
    where
        F: Fn(&[Option<NativeValue>]) -> Result<()> + Send + Sync + 'static,
    {
        let id = id.into();
        self.commands.ensure_vacant(&id)?;
        let callback: CommandCallback = Arc::new(callback);
        let command = Command::new(
            &self.gateway,
            self.commands.path(),
            id,
            name,
            description,
            callback,
        )?;
        self.commands.push(Arc::clone(&command));
        Ok(command)
    }

    /// Adds a readable value to the device.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is already taken by a sibling value or the
    /// descriptor fails to publish.
    pub fn add_value<K>(
        &self,
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        kind: K,
    ) -> Result<Arc<Value>>
    where
        K: ValueKind + 'static,
    {
        let id = id.into();
        self.values.ensure_vacant(&id)?;
        let value = Arc::new(Value::new(
            &self.gateway,
            self.values.path(),
            id,
            name,
            description,
            Arc::new(kind),
        )?);
        self.values.push(Arc::clone(&value));
        Ok(value)
    }

    /// The device's commands.
    #[must_use]
    pub fn commands(&self) -> &ObjectList<Command> {
        &self.commands
    }

    /// The device's values.
    #[must_use]
    pub fn values(&self) -> &ObjectList<Value> {
        &self.values
    }

    /// The full device descriptor, abilities and classes included.
    #[must_use]
    pub fn device_data(&self) -> &DeviceConnectedData {
        &self.data
    }
}

impl BusObject for DeviceConnected {
    fn path(&self) -> &str {
        &self.path
    }

    fn data(&self) -> &Data {
        &self.data.base
    }
}

impl std::fmt::Debug for DeviceConnected {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceConnected")
            .field("path", &self.path)
            .field("abilities", &self.data.abilities)
            .finish_non_exhaustive()
    }
}
