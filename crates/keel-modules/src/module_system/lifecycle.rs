// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Cache lifetime management.
//!
//! The module cache lives as long as the engine context that owns it.
//! [`ContextSlot`] models the engine's per-context data: initialized on
//! first use, deinitialized exactly once when the context goes away.
//! Individual realms can die earlier. Hosts call [`release_realm`] before
//! dropping a realm handle, otherwise the cache keeps that realm alive until
//! the whole context is torn down.

use crate::host::Handle;
use crate::module_system::cache::ModuleCache;
use std::fmt;
use tracing::debug;

/// Selects the records an eviction applies to.
#[derive(Debug, Clone)]
pub enum RealmFilter<V> {
    /// Every record regardless of realm
    All,
    /// Only records whose realm is identical to this one
    Only(V),
}

impl<V: Handle> RealmFilter<V> {
    /// Builds a filter from an engine value: an object selects that realm,
    /// anything else (e.g. `undefined`) selects everything.
    pub fn from_value(value: V) -> Self {
        if value.is_object() {
            RealmFilter::Only(value)
        } else {
            RealmFilter::All
        }
    }

    /// Returns true if a record belonging to `realm` is selected.
    pub fn matches(&self, realm: &V) -> bool {
        match self {
            RealmFilter::All => true,
            RealmFilter::Only(filter) => filter.same(realm),
        }
    }
}

/// Data attached to an engine context for its whole lifetime.
pub trait ContextData: Sized {
    /// Name used in log output
    const NAME: &'static str;

    /// Creates the data when the context first asks for it.
    fn init() -> Self;

    /// Called once when the context is destroyed.
    fn deinit(&mut self);
}

impl<V: Handle> ContextData for ModuleCache<V> {
    const NAME: &'static str = "module cache";

    fn init() -> Self {
        ModuleCache::new()
    }

    fn deinit(&mut self) {
        self.clear();
    }
}

/// Lazily initialized per-context storage for one [`ContextData`] type.
pub struct ContextSlot<T: ContextData> {
    data: Option<T>,
}

impl<T: ContextData> ContextSlot<T> {
    /// Create an empty slot
    pub fn new() -> Self {
        Self { data: None }
    }

    /// Returns the data, initializing it on first access.
    pub fn get_mut(&mut self) -> &mut T {
        self.data.get_or_insert_with(|| {
            debug!("Initializing {}", T::NAME);
            T::init()
        })
    }

    /// Returns the data if it has been initialized.
    pub fn get(&self) -> Option<&T> {
        self.data.as_ref()
    }

    /// Check if the data has been initialized
    pub fn is_initialized(&self) -> bool {
        self.data.is_some()
    }
}

impl<T: ContextData> Default for ContextSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ContextData> Drop for ContextSlot<T> {
    fn drop(&mut self) {
        if let Some(mut data) = self.data.take() {
            debug!("Deinitializing {}", T::NAME);
            data.deinit();
        }
    }
}

impl<T: ContextData + fmt::Debug> fmt::Debug for ContextSlot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextSlot").field("data", &self.data).finish()
    }
}

/// Drops the cached modules of one realm.
///
/// `realm` selects the realm by identity. A non-object value releases
/// every cached module. Returns the number of records removed.
pub fn release_realm<V: Handle>(cache: &mut ModuleCache<V>, realm: V) -> usize {
    cache.evict(&RealmFilter::from_value(realm))
}
