// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Invokable commands and their parameters.
//!
//! A [`Command`] listens on `<path>.perform` for invocation requests and
//! answers each with two status publishes on `<path>.performStatus`: one on
//! receipt and one on completion. Arguments are coerced through the
//! declared [`Parameter`]s, in declaration order, before the callback runs.

use std::sync::Arc;

use crate::error::Result;
use crate::model::{Data, ObjectKind, Perform, PerformStatus};
use crate::object::{BusObject, ObjectList};
use crate::protocol::Gateway;
use crate::types::{NativeValue, ValueKind};

/// Type alias for command callbacks.
///
/// Arguments arrive in parameter declaration order; a parameter the caller
/// sent no instances for arrives as `None`.
pub(crate) type CommandCallback =
    Arc<dyn Fn(&[Option<NativeValue>]) -> Result<()> + Send + Sync>;

/// An invokable command published on the bus.
pub struct Command {
    gateway: Gateway,
    path: String,
    data: Data,
    parameters: ObjectList<Parameter>,
    callback: CommandCallback,
}

impl Command {
    /// Creates and publishes a command, then registers it for invocation
    /// requests on `<path>.perform`.
    ///
    /// The registration holds a weak reference, so a dropped command routes
    /// to a no-op instead of keeping itself alive.
    pub(crate) fn new(
        gateway: &Gateway,
        parent_path: &str,
        id: String,
        name: impl Into<String>,
        description: impl Into<String>,
        callback: CommandCallback,
    ) -> Result<Arc<Self>> {
        let path = format!("{parent_path}.{id}");
        let data = Data::new(ObjectKind::Command, id, name, description);
        gateway.send(&path, &data, true)?;
        let parameters = ObjectList::new(gateway, &path, "parameters", "Parameters", "Parameters")?;

        let command = Arc::new(Self {
            gateway: gateway.clone(),
            path,
            data,
            parameters,
            callback,
        });

        let weak = Arc::downgrade(&command);
        let perform_path = format!("{}.perform", command.path);
        gateway.register(perform_path, Perform::decode, move |perform: Perform| {
            if let Some(command) = weak.upgrade() {
                command.perform(&perform)
            } else {
                tracing::debug!(op_id = %perform.op_id, "Command dropped, ignoring request");
                Ok(())
            }
        })?;

        Ok(command)
    }

    /// Declares a parameter. Declaration order fixes argument order.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is already taken or the descriptor fails
    /// to publish.
    pub fn add_parameter<K>(
        &self,
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        kind: K,
    ) -> Result<Arc<Parameter>>
    where
        K: ValueKind + 'static,
    {
        let id = id.into();
        self.parameters.ensure_vacant(&id)?;
        let parameter = Arc::new(Parameter::new(
            &self.gateway,
            self.parameters.path(),
            id,
            name,
            description,
            Arc::new(kind),
        )?);
        self.parameters.push(Arc::clone(&parameter));
        Ok(parameter)
    }

    /// The declared parameters.
    #[must_use]
    pub fn parameters(&self) -> &ObjectList<Parameter> {
        &self.parameters
    }

    /// Executes an invocation request.
    ///
    /// Publishes a `finished: false` status, coerces the arguments, runs
    /// the callback, then publishes a `finished: true` status carrying the
    /// error text if coercion or the callback failed. Those failures are
    /// contained here; only a failed status publish escapes.
    ///
    /// # Errors
    ///
    /// Returns an error if either status fails to publish.
    pub fn perform(&self, perform: &Perform) -> Result<()> {
        let status_path = format!("{}.performStatus", self.path);
        let mut status = PerformStatus::new(perform.op_id.clone());
        self.gateway.send(&status_path, &status, false)?;

        tracing::info!(path = %self.path, op_id = %perform.op_id, "Performing command");
        match self.invoke(perform) {
            Ok(()) => status.finish(None),
            Err(e) => {
                tracing::error!(
                    path = %self.path,
                    op_id = %perform.op_id,
                    error = %e,
                    "Command failed"
                );
                status.finish(Some(e.to_string()));
            }
        }
        self.gateway.send(&status_path, &status, false)
    }

    /// Coerces the arguments and runs the callback.
    fn invoke(&self, perform: &Perform) -> Result<()> {
        let parameters = self.parameters.elements();
        let mut arguments = Vec::with_capacity(parameters.len());
        for parameter in &parameters {
            let instances = perform.instances(parameter.id());
            arguments.push(parameter.kind().to_value(instances)?);
        }
        (self.callback)(&arguments)
    }
}

impl BusObject for Command {
    fn path(&self) -> &str {
        &self.path
    }

    fn data(&self) -> &Data {
        &self.data
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("path", &self.path)
            .field("parameters", &self.parameters.len())
            .finish_non_exhaustive()
    }
}

/// A declared command parameter.
///
/// Parameters publish a descriptor (kind `value`) and carry the coercion
/// kind applied to inbound arguments; they never emit on their own.
pub struct Parameter {
    path: String,
    data: Data,
    kind: Arc<dyn ValueKind>,
}

impl Parameter {
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
        Ok(Self { path, data, kind })
    }

    /// The coercion kind for this parameter.
    #[must_use]
    pub fn kind(&self) -> &dyn ValueKind {
        self.kind.as_ref()
    }
}

impl BusObject for Parameter {
    fn path(&self) -> &str {
        &self.path
    }

    fn data(&self) -> &Data {
        &self.data
    }
}

impl std::fmt::Debug for Parameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parameter")
            .field("path", &self.path)
            .field("kind", &self.kind.name())
            .finish_non_exhaustive()
    }
}
