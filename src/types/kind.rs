// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Coercion between wire instances and native values.
//!
//! A [`ValueKind`] translates in both directions: inbound argument instances
//! become [`NativeValue`]s for command callbacks, and native values pushed to
//! a value object become wire instances. The primitive kinds parse with the
//! standard `str::parse` rules; only the first instance of a list is
//! consulted and an empty list coerces to `None`.

use std::fmt;

use crate::error::CoercionError;
use crate::model::TypeInstance;
use crate::types::NativeValue;

/// Two-way coercion between wire instances and native values.
///
/// # Examples
///
/// ```
/// use hearthbus::model::TypeInstance;
/// use hearthbus::types::{IntegerKind, NativeValue, ValueKind};
///
/// let kind = IntegerKind;
/// let native = kind.to_value(&[TypeInstance::new("42")]).unwrap();
/// assert_eq!(native, Some(NativeValue::Integer(42)));
///
/// let instances = kind.from_value(&NativeValue::Integer(42));
/// assert_eq!(instances[0].value, "42");
/// ```
pub trait ValueKind: fmt::Debug + Send + Sync {
    /// Name of this kind, used in diagnostics.
    fn name(&self) -> &'static str;

    /// Coerces wire instances to a native value.
    ///
    /// An empty slice coerces to `Ok(None)`; otherwise only the first
    /// instance is consulted.
    ///
    /// # Errors
    ///
    /// Returns a [`CoercionError`] if the instance string does not parse as
    /// this kind.
    fn to_value(&self, instances: &[TypeInstance]) -> Result<Option<NativeValue>, CoercionError>;

    /// Wraps a native value into its wire instances.
    fn from_value(&self, value: &NativeValue) -> Vec<TypeInstance> {
        vec![TypeInstance::new(value.to_string())]
    }
}

/// Boolean kind. Accepts `true`/`false` case-insensitively, plus `1`/`0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanKind;

impl ValueKind for BooleanKind {
    fn name(&self) -> &'static str {
        "boolean"
    }

    fn to_value(&self, instances: &[TypeInstance]) -> Result<Option<NativeValue>, CoercionError> {
        let Some(first) = instances.first() else {
            return Ok(None);
        };
        match first.value.to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(Some(NativeValue::Boolean(true))),
            "false" | "0" => Ok(Some(NativeValue::Boolean(false))),
            _ => Err(CoercionError::Parse {
                kind: self.name(),
                value: first.value.clone(),
            }),
        }
    }
}

/// 32-bit signed integer kind.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerKind;

impl ValueKind for IntegerKind {
    fn name(&self) -> &'static str {
        "integer"
    }

    fn to_value(&self, instances: &[TypeInstance]) -> Result<Option<NativeValue>, CoercionError> {
        let Some(first) = instances.first() else {
            return Ok(None);
        };
        let parsed = first.value.parse::<i32>().map_err(|_| CoercionError::Parse {
            kind: self.name(),
            value: first.value.clone(),
        })?;
        Ok(Some(NativeValue::Integer(parsed)))
    }
}

/// 64-bit signed integer kind.
#[derive(Debug, Clone, Copy, Default)]
pub struct LongKind;

impl ValueKind for LongKind {
    fn name(&self) -> &'static str {
        "long"
    }

    fn to_value(&self, instances: &[TypeInstance]) -> Result<Option<NativeValue>, CoercionError> {
        let Some(first) = instances.first() else {
            return Ok(None);
        };
        let parsed = first.value.parse::<i64>().map_err(|_| CoercionError::Parse {
            kind: self.name(),
            value: first.value.clone(),
        })?;
        Ok(Some(NativeValue::Long(parsed)))
    }
}

/// Double-precision float kind.
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatKind;

impl ValueKind for FloatKind {
    fn name(&self) -> &'static str {
        "float"
    }

    fn to_value(&self, instances: &[TypeInstance]) -> Result<Option<NativeValue>, CoercionError> {
        let Some(first) = instances.first() else {
            return Ok(None);
        };
        let parsed = first.value.parse::<f64>().map_err(|_| CoercionError::Parse {
            kind: self.name(),
            value: first.value.clone(),
        })?;
        Ok(Some(NativeValue::Float(parsed)))
    }
}

/// String kind. Coercion never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringKind;

impl ValueKind for StringKind {
    fn name(&self) -> &'static str {
        "string"
    }

    fn to_value(&self, instances: &[TypeInstance]) -> Result<Option<NativeValue>, CoercionError> {
        Ok(instances
            .first()
            .map(|first| NativeValue::Text(first.value.clone())))
    }
}
