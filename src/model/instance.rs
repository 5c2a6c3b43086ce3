// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wire-level value instances.

use std::collections::HashMap;

/// Canonical wire shape for any scalar or structured value.
///
/// Scalars travel as their canonical string form in `value`; `children` is
/// reserved for structured values and is carried untouched by the primitive
/// coercion kinds.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct TypeInstance {
    /// String form of the value.
    pub value: String,
    /// Child values keyed by name. Absent on the wire when empty.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub children: HashMap<String, TypeInstance>,
}

impl TypeInstance {
    /// Creates a scalar instance with no children.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            children: HashMap::new(),
        }
    }
}
