// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module resolution and caching.
//!
//! ## Pieces
//! - [`path`]: joins a referrer's directory with a specifier and canonicalizes it
//! - [`ModuleCache`]: per-context records keyed by `(realm, path)`
//! - [`ModuleLoader`]: the resolve callback the engine invokes on `import`
//! - [`lifecycle`]: ties the cache to the engine context and to realms

mod cache;
pub mod lifecycle;
mod loader;
pub mod path;

pub use cache::{ModuleCache, ModuleRecord};
pub use lifecycle::{release_realm, ContextData, ContextSlot, RealmFilter};
pub use loader::ModuleLoader;
pub use path::{directory_end, normalize};
