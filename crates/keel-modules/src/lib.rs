// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # keel-modules
//!
//! Module resolution and caching for script engine hosts.
//!
//! Given a module specifier and the module that imports it, the loader
//! resolves the specifier to an absolute path, reads and parses the source
//! exactly once, and caches the resulting module object keyed by
//! `(realm, normalized path)`. Importing the same module twice from the
//! same realm yields the identical module value.
//!
//! The crate does not contain a script engine. Hosts plug one in through
//! [`HostEngine`], and the filesystem through [`Platform`].
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use keel_modules::{ContextSlot, FsPlatform, LoaderConfig, ModuleCache, ModuleLoader};
//!
//! let loader = ModuleLoader::new(FsPlatform, LoaderConfig::load()?);
//! let mut modules: ContextSlot<ModuleCache<_>> = ContextSlot::new();
//!
//! // Called by the engine whenever script code imports a specifier.
//! let module = loader.resolve(&mut engine, modules.get_mut(), &specifier, &referrer)?;
//!
//! // Before a realm handle goes away:
//! keel_modules::release_realm(modules.get_mut(), realm);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod host;
pub mod module_system;
pub mod platform;

#[cfg(test)]
mod testing;

// Re-exports
pub use config::LoaderConfig;
pub use error::{ConfigError, PlatformError, ResolveError};
pub use host::{ErrorKind, Handle, HostEngine, ParseOptions};
pub use module_system::{
    directory_end, normalize, release_realm, ContextData, ContextSlot, ModuleCache, ModuleLoader,
    ModuleRecord, RealmFilter,
};
pub use platform::{FsPlatform, Platform};

/// Version of the keel-modules crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
