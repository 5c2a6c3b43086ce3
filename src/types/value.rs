// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Native value representation.

use std::fmt;

/// A value in its native representation, before wire encoding.
///
/// Command callbacks receive arguments as native values and value pushes
/// accept them; the [`ValueKind`](super::ValueKind) in play decides how a
/// native value maps onto wire instances.
///
/// # Examples
///
/// ```
/// use hearthbus::types::NativeValue;
///
/// let percent = NativeValue::from(42);
/// assert_eq!(percent.as_i32(), Some(42));
/// assert_eq!(percent.to_string(), "42");
/// assert_eq!(percent.as_str(), None);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum NativeValue {
    /// A boolean.
    Boolean(bool),
    /// A 32-bit signed integer.
    Integer(i32),
    /// A 64-bit signed integer.
    Long(i64),
    /// A double-precision float.
    Float(f64),
    /// A string.
    Text(String),
}

impl NativeValue {
    /// The boolean, if this is a [`NativeValue::Boolean`].
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    /// The integer, if this is a [`NativeValue::Integer`].
    #[must_use]
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Self::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// The value as an `i64`. Integers widen.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Long(v) => Some(*v),
            Self::Integer(v) => Some(i64::from(*v)),
            _ => None,
        }
    }

    /// The value as an `f64`. Integers widen.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Integer(v) => Some(f64::from(*v)),
            _ => None,
        }
    }

    /// The string, if this is a [`NativeValue::Text`].
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for NativeValue {
    /// Formats the canonical wire string for this value.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(v) => write!(f, "{v}"),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Long(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
        }
    }
}

impl From<bool> for NativeValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i32> for NativeValue {
    fn from(value: i32) -> Self {
        Self::Integer(value)
    }
}

impl From<i64> for NativeValue {
    fn from(value: i64) -> Self {
        Self::Long(value)
    }
}

impl From<f64> for NativeValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<String> for NativeValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for NativeValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}
