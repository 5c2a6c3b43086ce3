// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `hearthbus` library.
//!
//! This module provides the error hierarchy for handling failures across the
//! library: value coercion, inbound payload decoding, bus communication, and
//! object tree construction.

use thiserror::Error;

/// The main error type for this library.
///
/// This enum encompasses all possible errors that can occur when publishing
/// an object tree or executing commands arriving from the bus.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred while coercing a wire value to a native value.
    #[error("coercion error: {0}")]
    Coercion(#[from] CoercionError),

    /// Error occurred while decoding an inbound payload.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Error occurred during bus communication.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Error occurred while serializing an outbound payload.
    #[error("serialize error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A user-supplied callback reported a failure.
    #[error("callback failed: {0}")]
    Callback(String),

    /// Two siblings under the same parent were given the same id.
    #[error("duplicate id '{id}' under '{parent}'")]
    DuplicateId {
        /// Path of the parent list.
        parent: String,
        /// The id that was already taken.
        id: String,
    },

    /// An ability method was called before the ability was configured
    /// against a device.
    #[error("ability is not configured: {0}")]
    NotConfigured(&'static str),

    /// A command was invoked without a required parameter.
    #[error("missing required parameter: {0}")]
    MissingParameter(&'static str),
}

/// Errors related to coercing wire-level value instances to native values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoercionError {
    /// The wire string could not be parsed as the expected kind.
    #[error("cannot parse '{value}' as {kind}")]
    Parse {
        /// Name of the kind that was expected.
        kind: &'static str,
        /// The wire string that failed to parse.
        value: String,
    },
}

/// Errors related to decoding inbound message payloads.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors related to bus communication.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// MQTT connection or communication failed.
    #[cfg(feature = "mqtt")]
    #[error("MQTT error: {0}")]
    Mqtt(#[from] rumqttc::ClientError),

    /// Connection to the bus failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Connection attempt timed out.
    #[error("connection timed out after {0} ms")]
    Timeout(u64),

    /// Invalid broker address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The gateway is not connected to the bus.
    #[error("not connected to the bus")]
    NotConnected,

    /// Internal channel was closed.
    #[error("channel closed: {0}")]
    ChannelClosed(String),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
