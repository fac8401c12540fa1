// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Host runtime: one engine context with its module cache and loader.

use crate::engine::Engine;
use crate::error::{Result, ScriptError};
use crate::value::Value;
use keel_modules::{
    ContextSlot, FsPlatform, Handle, HostEngine, LoaderConfig, ModuleCache, ModuleLoader, Platform,
};
use tracing::{debug, info};

/// The modules reachable from an entry module, in depth-first load order.
#[derive(Debug, Clone)]
pub struct ModuleGraph {
    /// The entry module
    pub entry: Value,
    /// Every module in the graph, entry first
    pub modules: Vec<Value>,
}

impl ModuleGraph {
    /// Check if `module` is part of the graph
    pub fn contains(&self, module: &Value) -> bool {
        self.modules.iter().any(|m| m.same(module))
    }

    /// Number of modules in the graph
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Check if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// A script engine context hosting the module loader.
///
/// The module cache is context data: created on first import, torn down
/// when the runtime is dropped.
pub struct Runtime<P: Platform = FsPlatform> {
    engine: Engine,
    loader: ModuleLoader<P>,
    modules: ContextSlot<ModuleCache<Value>>,
}

impl Runtime<FsPlatform> {
    /// Create a runtime reading modules from the local filesystem
    pub fn new(config: LoaderConfig) -> Self {
        Self::with_platform(FsPlatform, config)
    }
}

impl<P: Platform> Runtime<P> {
    /// Create a runtime with a custom platform
    pub fn with_platform(platform: P, config: LoaderConfig) -> Self {
        Self {
            engine: Engine::new(),
            loader: ModuleLoader::new(platform, config),
            modules: ContextSlot::new(),
        }
    }

    /// Get the engine
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Get the engine mutably
    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    /// Get the module loader
    pub fn loader(&self) -> &ModuleLoader<P> {
        &self.loader
    }

    /// The module cache, if any module has been imported yet
    pub fn modules(&self) -> Option<&ModuleCache<Value>> {
        self.modules.get()
    }

    /// Number of cached modules across all realms
    pub fn cached_module_count(&self) -> usize {
        self.modules.get().map_or(0, ModuleCache::len)
    }

    /// The module resolution callback, with engine values in and out.
    pub fn import(&mut self, specifier: &Value, referrer: &Value) -> std::result::Result<Value, Value> {
        self.loader
            .resolve(&mut self.engine, self.modules.get_mut(), specifier, referrer)
    }

    /// Resolves `specifier` from `referrer` in the current realm.
    pub fn resolve(&mut self, specifier: &str, referrer: &Value) -> Result<Value> {
        let specifier = Value::string(specifier);
        self.import(&specifier, referrer)
            .map_err(|exception| ScriptError::from_exception(&exception))
    }

    /// Normalized path a module was loaded from.
    pub fn module_path(&self, module: &Value) -> Option<String> {
        self.engine
            .module_record(module)
            .map(|record| record.path().to_string())
    }

    /// Loads `entry` and, depth first, every module it statically imports.
    ///
    /// Each module is visited once; cycles are cut at the first revisit.
    pub fn load_entry(&mut self, entry: &str) -> Result<ModuleGraph> {
        let entry_module = self.resolve(entry, &Value::Undefined)?;
        info!("Loading module graph from {}", entry);

        let mut graph = ModuleGraph {
            entry: entry_module.clone(),
            modules: Vec::new(),
        };
        let mut stack = vec![entry_module];

        while let Some(module) = stack.pop() {
            if graph.contains(&module) {
                continue;
            }

            let imports = module
                .as_module()
                .map(|m| m.syntax.imports.clone())
                .unwrap_or_default();

            let mut dependencies = Vec::with_capacity(imports.len());
            for specifier in &imports {
                dependencies.push(self.resolve(specifier, &module)?);
            }

            graph.modules.push(module);
            stack.extend(dependencies.into_iter().rev());
        }

        debug!(
            "Module graph has {} module(s), {} cached in total",
            graph.len(),
            self.cached_module_count()
        );
        Ok(graph)
    }

    /// Creates a realm and makes it current.
    pub fn enter_new_realm(&mut self) -> Result<Value> {
        let realm = self.engine.create_realm();
        self.engine.set_current_realm(&realm)?;
        Ok(realm)
    }

    /// Drops the cached modules of `realm` without destroying it.
    pub fn release_realm(&mut self, realm: &Value) -> usize {
        if !self.modules.is_initialized() {
            return 0;
        }
        keel_modules::release_realm(self.modules.get_mut(), realm.clone())
    }

    /// Releases the cached modules of `realm`, then the realm itself.
    pub fn destroy_realm(&mut self, realm: &Value) -> Result<usize> {
        if realm.same(self.engine.global_realm()) {
            return Err(ScriptError::type_error("The global realm cannot be destroyed"));
        }
        let released = self.release_realm(realm);
        self.engine.destroy_realm(realm)?;
        Ok(released)
    }
}
