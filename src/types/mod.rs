// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value kinds and native values.
//!
//! This module provides the coercion layer between wire-level
//! [`TypeInstance`](crate::model::TypeInstance) lists and native values.
//! Each primitive kind parses with the standard library rules and renders
//! its canonical string form back onto the wire.
//!
//! # Types
//!
//! - [`NativeValue`] - A value in native representation
//! - [`ValueKind`] - Two-way coercion trait
//! - [`BooleanKind`] - `true`/`false` (case-insensitive) and `1`/`0`
//! - [`IntegerKind`] - 32-bit signed integers
//! - [`LongKind`] - 64-bit signed integers
//! - [`FloatKind`] - Double-precision floats
//! - [`StringKind`] - Strings, coercion never fails

mod kind;
mod value;

pub use kind::{BooleanKind, FloatKind, IntegerKind, LongKind, StringKind, ValueKind};
pub use value::NativeValue;
