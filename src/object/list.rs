// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Published containers of like-typed children.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{Error, Result};
use crate::model::{Data, ObjectKind};
use crate::object::BusObject;
use crate::protocol::Gateway;

/// An append-only, ordered container of child objects.
///
/// The list itself is a published object (kind `list`); its elements are
/// appended as they are created and keep their creation order. Sibling ids
/// are unique within one list.
pub struct ObjectList<T> {
    path: String,
    data: Data,
    elements: RwLock<Vec<Arc<T>>>,
}

impl<T> ObjectList<T> {
    /// Creates and publishes an empty list under the given parent path.
    pub(crate) fn new(
        gateway: &Gateway,
        parent_path: &str,
        id: &str,
        name: &str,
        description: &str,
    ) -> Result<Self> {
        let path = format!("{parent_path}.{id}");
        let data = Data::new(ObjectKind::List, id, name, description);
        gateway.send(&path, &data, true)?;
        Ok(Self {
            path,
            data,
            elements: RwLock::new(Vec::new()),
        })
    }

    /// Appends an element.
    pub(crate) fn push(&self, element: Arc<T>) {
        self.elements.write().push(element);
    }

    /// Snapshot of the elements, in creation order.
    #[must_use]
    pub fn elements(&self) -> Vec<Arc<T>> {
        self.elements.read().clone()
    }

    /// The number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.read().len()
    }

    /// Whether the list has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.read().is_empty()
    }
}

impl<T: BusObject> ObjectList<T> {
    /// Whether an element with the given id exists.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.elements
            .read()
            .iter()
            .any(|element| element.id() == id)
    }

    /// Errors if the id is already taken by a sibling.
    ///
    /// Called before a child is constructed, so a duplicate is rejected
    /// before anything publishes.
    pub(crate) fn ensure_vacant(&self, id: &str) -> Result<()> {
        if self.contains(id) {
            return Err(Error::DuplicateId {
                parent: self.path.clone(),
                id: id.to_string(),
            });
        }
        Ok(())
    }
}

impl<T> BusObject for ObjectList<T> {
    fn path(&self) -> &str {
        &self.path
    }

    fn data(&self) -> &Data {
        &self.data
    }
}
