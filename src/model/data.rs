// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Object descriptors published onto the bus.
//!
//! Every object in the tree publishes exactly one descriptor at construction
//! time: a [`Data`] for most objects, a [`DeviceConnectedData`] for devices.
//! Descriptors are immutable once built and serialize with camelCase keys.

use std::collections::BTreeSet;

/// Discriminates the runtime role of a published object.
///
/// The wire carries the role twice: a `type` key used to pick the right
/// deserializer, and an `objectClass` key that becomes a property of the
/// resulting object. The two strings only differ for devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    /// Root of a published tree.
    Node,
    /// A piece of hardware bridging one or more devices.
    Hardware,
    /// A device currently connected to its hardware.
    DeviceConnected,
    /// A container of like-typed children.
    List,
    /// An invokable command.
    Command,
    /// A readable value; also used for command parameters.
    Value,
}

impl ObjectKind {
    /// The `type` discriminator string.
    #[must_use]
    pub fn kind_str(self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Hardware => "hardware",
            Self::DeviceConnected => "deviceConnected",
            Self::List => "list",
            Self::Command => "command",
            Self::Value => "value",
        }
    }

    /// The `objectClass` string.
    #[must_use]
    pub fn class_str(self) -> &'static str {
        match self {
            Self::DeviceConnected => "device-connected",
            other => other.kind_str(),
        }
    }
}

/// Base descriptor for every published object.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Data {
    /// Role discriminator, serialized as `type`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Role of the deserialized object on the consumer side.
    pub object_class: String,
    /// Identifier, unique among siblings.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
}

impl Data {
    /// Creates a descriptor for the given role.
    #[must_use]
    pub fn new(
        kind: ObjectKind,
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.kind_str().to_string(),
            object_class: kind.class_str().to_string(),
            id: id.into(),
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Descriptor for a connected device.
///
/// Extends [`Data`] with the flattened list of ability names (declaration
/// order, duplicates preserved) and the set of device classes.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceConnectedData {
    /// Base descriptor fields, flattened onto the same wire object.
    #[serde(flatten)]
    pub base: Data,
    /// Ability names declared by the device, in declaration order.
    pub abilities: Vec<String>,
    /// Device classes the device belongs to.
    pub classes: BTreeSet<String>,
}

impl DeviceConnectedData {
    /// Creates a device descriptor with pre-flattened ability names.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        abilities: Vec<String>,
        classes: BTreeSet<String>,
    ) -> Self {
        Self {
            base: Data::new(ObjectKind::DeviceConnected, id, name, description),
            abilities,
            classes,
        }
    }
}
