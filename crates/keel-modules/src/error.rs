// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Error types for module resolution

use crate::host::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;

/// Message thrown when a path buffer cannot be allocated.
pub const OUT_OF_MEMORY_MESSAGE: &str = "Out of memory";

/// Message thrown for unreadable modules in compatibility mode.
pub const MODULE_NOT_FOUND_MESSAGE: &str = "Module file not found";

/// Failures reported by a [`Platform`](crate::Platform) while reading sources.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// Nothing exists at the path
    #[error("Failed to open file: {path}")]
    NotFound {
        /// Requested path
        path: String,
    },

    /// The path names a directory
    #[error("Failed to open file: {path} is a directory")]
    IsDirectory {
        /// Requested path
        path: String,
    },

    /// The file exists but could not be opened or stat'd
    #[error("Failed to open file: {path}: {source}")]
    Open {
        /// Requested path
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// No buffer could be reserved for the file contents
    #[error("Failed to allocate memory for file: {path}")]
    OutOfMemory {
        /// Requested path
        path: String,
    },

    /// Fewer bytes were read than the file size reported
    #[error("Failed to read file: {path} (expected {expected} bytes, read {actual})")]
    ShortRead {
        /// Requested path
        path: String,
        /// Size reported by the filesystem
        expected: usize,
        /// Bytes actually read
        actual: usize,
    },

    /// Reading failed part way through
    #[error("Failed to read file: {path}: {source}")]
    Read {
        /// Requested path
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Failures raised by the loader itself.
///
/// Parse failures are not represented here: the engine's own exception is
/// handed back to the caller untouched.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Building the path buffer failed
    #[error("Out of memory")]
    OutOfMemory,

    /// The module source could not be read
    #[error("Cannot find module '{path}'")]
    ModuleNotFound {
        /// Normalized path that was tried
        path: String,
        /// What the platform reported
        #[source]
        source: PlatformError,
    },
}

impl ResolveError {
    /// The exception kind and message this error surfaces as.
    ///
    /// With `missing_as_syntax` set, unreadable modules become a
    /// `SyntaxError` with a fixed message. Module conformance suites expect
    /// unresolvable specifiers to fail that way. The mapping applies to
    /// this one error site only.
    pub fn exception(&self, missing_as_syntax: bool) -> (ErrorKind, String) {
        match self {
            ResolveError::OutOfMemory => (ErrorKind::Common, OUT_OF_MEMORY_MESSAGE.to_string()),
            ResolveError::ModuleNotFound { .. } if missing_as_syntax => {
                (ErrorKind::Syntax, MODULE_NOT_FOUND_MESSAGE.to_string())
            }
            ResolveError::ModuleNotFound { .. } => (ErrorKind::Common, self.to_string()),
        }
    }
}

/// Errors loading [`LoaderConfig`](crate::LoaderConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Config file path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML or has unknown keys
    #[error("Invalid config file {path}: {source}")]
    Parse {
        /// Config file path
        path: PathBuf,
        /// Parser error
        #[source]
        source: toml::de::Error,
    },

    /// An environment variable holds an unusable value
    #[error("Invalid value '{value}' for {var}")]
    InvalidEnv {
        /// Variable name
        var: String,
        /// Offending value
        value: String,
    },
}
