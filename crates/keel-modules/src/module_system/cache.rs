// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module cache keyed by realm identity and normalized path

use crate::host::Handle;
use crate::module_system::lifecycle::RealmFilter;
use std::fmt;
use std::rc::Rc;
use tracing::debug;

/// One successfully resolved module.
///
/// Records are immutable once created. Each holds one reference to its
/// realm and one to its module, released when the record is dropped.
pub struct ModuleRecord<V> {
    path: String,
    base_path_length: usize,
    realm: V,
    module: V,
}

impl<V: Handle> ModuleRecord<V> {
    /// Normalized path of the module
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Directory prefix of [`path`](Self::path), with its trailing separator.
    ///
    /// Specifiers imported from this module are resolved against it.
    pub fn base_path(&self) -> &str {
        &self.path[..self.base_path_length]
    }

    /// Length of [`base_path`](Self::base_path)
    pub fn base_path_length(&self) -> usize {
        self.base_path_length
    }

    /// Realm the module was loaded in
    pub fn realm(&self) -> &V {
        &self.realm
    }

    /// The engine's module object
    pub fn module(&self) -> &V {
        &self.module
    }
}

impl<V> fmt::Debug for ModuleRecord<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleRecord")
            .field("path", &self.path)
            .field("base_path_length", &self.base_path_length)
            .finish_non_exhaustive()
    }
}

/// Per-context collection of module records.
///
/// Holds records for every realm of one engine context. At most one record
/// exists per `(realm, path)` pair. Records are kept in insertion order and
/// searched newest first.
pub struct ModuleCache<V> {
    records: Vec<Rc<ModuleRecord<V>>>,
}

impl<V: Handle> ModuleCache<V> {
    /// Create a new empty cache
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Finds the module cached for `path` in `realm`.
    ///
    /// Realms match by identity, paths byte for byte. Returns a new
    /// reference to the cached module.
    pub fn lookup(&self, realm: &V, path: &str) -> Option<V> {
        self.find(realm, path).map(|record| record.module.clone())
    }

    /// Finds the record for `path` in `realm`.
    pub fn find(&self, realm: &V, path: &str) -> Option<&Rc<ModuleRecord<V>>> {
        self.records
            .iter()
            .rev()
            .find(|record| record.realm.same(realm) && record.path == path)
    }

    /// Adds a record, taking ownership of `path` and acquiring one
    /// reference each to `realm` and `module`.
    ///
    /// The caller must have checked [`lookup`](Self::lookup) first.
    pub fn insert(
        &mut self,
        path: String,
        base_path_length: usize,
        realm: &V,
        module: &V,
    ) -> &Rc<ModuleRecord<V>> {
        debug_assert!(self.find(realm, &path).is_none(), "duplicate record for {}", path);
        debug_assert!(base_path_length <= path.len());

        debug!("Caching module {}", path);
        self.records.push(Rc::new(ModuleRecord {
            path,
            base_path_length,
            realm: realm.clone(),
            module: module.clone(),
        }));
        &self.records[self.records.len() - 1]
    }

    /// Drops every record selected by `filter`, keeping the rest in order.
    ///
    /// Returns the number of records removed.
    pub fn evict(&mut self, filter: &RealmFilter<V>) -> usize {
        let before = self.records.len();
        self.records.retain(|record| !filter.matches(&record.realm));
        let evicted = before - self.records.len();

        if evicted > 0 {
            debug!("Evicted {} cached module(s), {} remaining", evicted, self.records.len());
        }
        evicted
    }

    /// Drops every record.
    pub fn clear(&mut self) -> usize {
        self.evict(&RealmFilter::All)
    }

    /// Iterates records newest first.
    pub fn iter(&self) -> impl Iterator<Item = &ModuleRecord<V>> + '_ {
        self.records.iter().rev().map(|record| record.as_ref())
    }

    /// Number of cached modules across all realms
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<V: Handle> Default for ModuleCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for ModuleCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.records.iter().rev()).finish()
    }
}
