// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Readable device values.

use std::sync::Arc;

use crate::error::Result;
use crate::model::{Data, ObjectKind};
use crate::object::BusObject;
use crate::protocol::Gateway;
use crate::types::{NativeValue, ValueKind};

/// A readable value published on the bus.
///
/// The descriptor publishes once at construction; state updates go out on
/// `<path>.value` through [`Value::set`], coerced to wire instances by the
/// value's kind. Updates are ephemeral: descriptors persist so late
/// subscribers can discover the tree, values do not.
pub struct Value {
    gateway: Gateway,
    path: String,
    data: Data,
    kind: Arc<dyn ValueKind>,
}

impl Value {
    pub(crate) fn new(
        gateway: &Gateway,
        parent_path: &str,
        id: String,
        name: impl Into<String>,
        description: impl Into<String>,
        kind: Arc<dyn ValueKind>,
    ) -> Result<Self> {
        let path = format!("{parent_path}.{id}");
        let data = Data::new(ObjectKind::Value, id, name, description);
        gateway.send(&path, &data, true)?;
        Ok(Self {
            gateway: gateway.clone(),
            path,
            data,
            kind,
        })
    }

    /// Publishes a state update on `<path>.value`.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails to publish.
    pub fn set(&self, value: impl Into<NativeValue>) -> Result<()> {
        let instances = self.kind.from_value(&value.into());
        self.gateway
            .send(&format!("{}.value", self.path), &instances, false)
    }

    /// The coercion kind for this value.
    #[must_use]
    pub fn kind(&self) -> &dyn ValueKind {
        self.kind.as_ref()
    }
}

impl BusObject for Value {
    fn path(&self) -> &str {
        &self.path
    }

    fn data(&self) -> &Data {
        &self.data
    }
}

impl std::fmt::Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Value")
            .field("path", &self.path)
            .field("kind", &self.kind.name())
            .finish_non_exhaustive()
    }
}
