// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # keel-engine
//!
//! A minimal script engine host for the keel module loader.
//!
//! ## Overview
//!
//! This crate provides just enough of an engine to drive module loading:
//! - Reference counted values with identity semantics
//! - Realms, with a global realm that lives as long as the engine
//! - A module scanner that validates lexical structure and extracts the
//!   static import/export interface
//! - A [`Runtime`] that wires the engine to a [`keel_modules::ModuleLoader`]
//!   and walks module graphs
//!
//! Code is never executed.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use keel_engine::Runtime;
//! use keel_modules::LoaderConfig;
//!
//! let mut runtime = Runtime::new(LoaderConfig::default());
//! let graph = runtime.load_entry("/srv/app/main.js")?;
//! println!("{} modules", graph.len());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod engine;
pub mod error;
pub mod runtime;
pub mod scanner;
pub mod value;

// Re-exports for convenience
pub use engine::Engine;
pub use error::{Result, ScriptError};
pub use runtime::{ModuleGraph, Runtime};
pub use scanner::{scan_module, ModuleSyntax, SyntaxError};
pub use value::Value;

/// Version of the keel-engine crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
