// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entity descriptors and command messages exchanged over the bus.
//!
//! Everything in this module maps one-to-one onto a JSON wire shape with
//! camelCase keys.
//!
//! # Types
//!
//! - [`ObjectKind`] - Role discriminator for published objects
//! - [`Data`] - Base descriptor published for every object
//! - [`DeviceConnectedData`] - Device descriptor with abilities and classes
//! - [`TypeInstance`] - Wire-level value instance
//! - [`Perform`] - Inbound command invocation request
//! - [`PerformStatus`] - Outbound command progress report

mod data;
mod instance;
mod perform;

pub use data::{Data, DeviceConnectedData, ObjectKind};
pub use instance::TypeInstance;
pub use perform::{Perform, PerformStatus};
