// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Error types for the host runtime

use crate::value::Value;
use keel_modules::ErrorKind;
use thiserror::Error;

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, ScriptError>;

/// An exception that escaped to the host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct ScriptError {
    /// Exception kind
    pub kind: ErrorKind,
    /// Exception message
    pub message: String,
}

impl ScriptError {
    /// Create a new script error
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Converts a thrown value into a host error.
    ///
    /// Values that are not error objects are reported as a generic error
    /// carrying their display form.
    pub fn from_exception(value: &Value) -> Self {
        match value.as_error() {
            Some(error) => Self::new(error.kind, error.message.clone()),
            None => Self::new(ErrorKind::Common, format!("Uncaught {}", value)),
        }
    }

    /// Create a new TypeError
    pub fn type_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Type, msg)
    }
}
