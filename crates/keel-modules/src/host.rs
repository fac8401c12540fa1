// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! The boundary between the module loader and the host script engine.
//!
//! The loader never parses or executes anything itself. It needs a handful
//! of primitives from the engine: compile a source buffer as a module,
//! synthesize an exception, read the current realm, and stash a pointer
//! to a [`ModuleRecord`] on a module object so that later imports made
//! *from* that module can find its directory.

use crate::module_system::ModuleRecord;
use std::fmt;
use std::rc::{Rc, Weak};

/// A counted reference to an engine value.
///
/// Cloning a handle acquires a reference and dropping it releases one.
/// Handles are compared by identity, never by content.
pub trait Handle: Clone {
    /// Returns true if both handles refer to the same engine value.
    fn same(&self, other: &Self) -> bool;

    /// Returns true if the value is an object.
    fn is_object(&self) -> bool;
}

/// Exception kinds the loader raises on its own behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Generic `Error`
    Common,
    /// `SyntaxError`
    Syntax,
    /// `ReferenceError`
    Reference,
    /// `TypeError`
    Type,
    /// `RangeError`
    Range,
}

impl ErrorKind {
    /// The script-visible constructor name of this kind.
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::Common => "Error",
            ErrorKind::Syntax => "SyntaxError",
            ErrorKind::Reference => "ReferenceError",
            ErrorKind::Type => "TypeError",
            ErrorKind::Range => "RangeError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Options passed to [`HostEngine::parse`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Compile the source as a module rather than a script
    pub module: bool,
    /// Name reported in stack traces and error messages
    pub source_name: Option<String>,
}

impl ParseOptions {
    /// Options for parsing a module with the given source name.
    pub fn module(source_name: impl Into<String>) -> Self {
        Self {
            module: true,
            source_name: Some(source_name.into()),
        }
    }
}

/// Capabilities the loader consumes from the script engine.
pub trait HostEngine {
    /// Engine value handle. Exceptions are values too.
    type Value: Handle;

    /// Returns a new reference to the realm code is currently running in.
    fn current_realm(&self) -> Self::Value;

    /// Encodes a string value as UTF-8. Non-string values yield an empty buffer.
    fn string_to_utf8(&self, value: &Self::Value) -> Vec<u8>;

    /// Compiles `source`. On failure, returns the exception the parser raised.
    fn parse(&mut self, source: &[u8], options: &ParseOptions) -> Result<Self::Value, Self::Value>;

    /// Creates an exception value of the given kind.
    fn throw_error(&mut self, kind: ErrorKind, message: &str) -> Self::Value;

    /// Attaches a module record to a module object.
    ///
    /// The slot keeps only a weak reference: the record owns a reference to
    /// the module, so a strong one here would keep both alive forever.
    fn set_module_record(&mut self, module: &Self::Value, record: Weak<ModuleRecord<Self::Value>>);

    /// Returns the record attached to `value`, if it is a module object with
    /// a record that has not been evicted.
    fn module_record(&self, value: &Self::Value) -> Option<Rc<ModuleRecord<Self::Value>>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_names() {
        assert_eq!(ErrorKind::Common.name(), "Error");
        assert_eq!(ErrorKind::Syntax.to_string(), "SyntaxError");
    }

    #[test]
    fn test_parse_options_module() {
        let options = ParseOptions::module("./lib.js");
        assert!(options.module);
        assert_eq!(options.source_name.as_deref(), Some("./lib.js"));
        assert!(!ParseOptions::default().module);
    }
}
