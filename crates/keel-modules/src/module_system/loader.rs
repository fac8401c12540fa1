// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module loader - resolves, reads and compiles modules

use crate::config::LoaderConfig;
use crate::error::ResolveError;
use crate::host::{HostEngine, ParseOptions};
use crate::module_system::cache::ModuleCache;
use crate::module_system::path;
use crate::platform::{FsPlatform, Platform};
use std::rc::Rc;
use tracing::debug;

/// Module loader
///
/// Stateless apart from its configuration: the cache is owned by the engine
/// context and passed in on every call.
#[derive(Debug, Clone)]
pub struct ModuleLoader<P: Platform = FsPlatform> {
    /// Filesystem access
    platform: P,
    /// Loader options
    config: LoaderConfig,
}

impl<P: Platform> ModuleLoader<P> {
    /// Create a new module loader
    pub fn new(platform: P, config: LoaderConfig) -> Self {
        Self { platform, config }
    }

    /// Get the platform
    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Get the loader options
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Resolves `specifier` imported from `referrer`.
    ///
    /// This is the engine's module resolution callback. Relative specifiers
    /// are resolved against the referrer's directory when the referrer is a
    /// module this loader produced, and against the working directory
    /// otherwise. The first resolution of a path in a realm reads and parses
    /// the file; every later one returns the identical module value.
    ///
    /// Errors come back as engine exception values:
    /// - the parser's own exception when the source does not compile
    /// - a `SyntaxError` when the file cannot be read (see
    ///   [`LoaderConfig::missing_module_as_syntax_error`])
    /// - a generic `Error` when the path buffer cannot be allocated
    ///
    /// A failed resolution leaves the cache untouched.
    pub fn resolve<E: HostEngine>(
        &self,
        engine: &mut E,
        cache: &mut ModuleCache<E::Value>,
        specifier: &E::Value,
        referrer: &E::Value,
    ) -> Result<E::Value, E::Value> {
        let base_path = engine
            .module_record(referrer)
            .map(|record| record.base_path().to_owned())
            .unwrap_or_default();

        let specifier = engine.string_to_utf8(specifier);
        let specifier = String::from_utf8_lossy(&specifier);

        let path = path::normalize(
            &self.platform,
            &specifier,
            &base_path,
            self.config.canonicalize,
        )
        .map_err(|err| self.throw(engine, err))?;

        let realm = engine.current_realm();

        if let Some(module) = cache.lookup(&realm, &path) {
            debug!("Cache hit for {}", path);
            return Ok(module);
        }

        let source = match self.platform.read_source(&path) {
            Ok(source) => source,
            Err(source) => {
                return Err(self.throw(engine, ResolveError::ModuleNotFound { path, source }));
            }
        };

        debug!("Parsing module {} ({} bytes)", path, source.len());
        let options = ParseOptions::module(specifier.as_ref());
        let module = engine.parse(&source, &options)?;
        drop(source);

        let base_path_length = path::directory_end(&path);
        let record = cache.insert(path, base_path_length, &realm, &module);
        engine.set_module_record(&module, Rc::downgrade(record));

        Ok(module)
    }

    fn throw<E: HostEngine>(&self, engine: &mut E, err: ResolveError) -> E::Value {
        debug!("Resolution failed: {}", err);
        let (kind, message) = err.exception(self.config.missing_module_as_syntax_error);
        engine.throw_error(kind, &message)
    }
}

impl Default for ModuleLoader<FsPlatform> {
    fn default() -> Self {
        Self::new(FsPlatform, LoaderConfig::default())
    }
}
