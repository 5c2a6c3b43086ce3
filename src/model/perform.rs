// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command invocation messages.
//!
//! A [`Perform`] arrives on a command's `.perform` destination and names the
//! operation plus its arguments. The command answers with two
//! [`PerformStatus`] publishes on `.performStatus`: one on receipt
//! (`finished: false`) and one on completion (`finished: true`), the latter
//! carrying an error message if execution failed.

use std::collections::HashMap;

use crate::error::DecodeError;
use crate::model::TypeInstance;

/// Inbound request to execute a command.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Perform {
    /// Caller-chosen operation id, echoed in every status.
    pub op_id: String,
    /// Argument instances keyed by parameter id. Absent means no arguments.
    #[serde(default)]
    pub instance_map: HashMap<String, Vec<TypeInstance>>,
}

impl Perform {
    /// Creates a request with the given operation id and no arguments.
    #[must_use]
    pub fn new(op_id: impl Into<String>) -> Self {
        Self {
            op_id: op_id.into(),
            instance_map: HashMap::new(),
        }
    }

    /// Adds an argument instance list for a parameter.
    #[must_use]
    pub fn with_instances(mut self, id: impl Into<String>, instances: Vec<TypeInstance>) -> Self {
        self.instance_map.insert(id.into(), instances);
        self
    }

    /// Decodes a request from raw payload bytes.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] if the bytes are not a valid request.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// The argument instances for a parameter, empty if the caller sent none.
    #[must_use]
    pub fn instances(&self, id: &str) -> &[TypeInstance] {
        self.instance_map.get(id).map_or(&[], Vec::as_slice)
    }
}

/// Progress report for one command execution.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformStatus {
    /// Operation id from the originating request.
    pub op_id: String,
    /// Whether execution has completed.
    pub finished: bool,
    /// Failure message; `null` on the wire while running or on success.
    pub error: Option<String>,
}

impl PerformStatus {
    /// Creates the initial status for an operation: not finished, no error.
    #[must_use]
    pub fn new(op_id: impl Into<String>) -> Self {
        Self {
            op_id: op_id.into(),
            finished: false,
            error: None,
        }
    }

    /// Marks the operation finished, with an error message on failure.
    pub fn finish(&mut self, error: Option<String>) {
        self.finished = true;
        self.error = error;
    }
}
