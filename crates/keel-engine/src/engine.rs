// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! The engine instance: realms, compilation and exceptions.

use crate::error::{Result, ScriptError};
use crate::scanner::{self, SyntaxError};
use crate::value::{ErrorObject, Module, ObjectKind, Realm, Script, Value};
use keel_modules::{ErrorKind, Handle, HostEngine, ModuleRecord, ParseOptions};
use std::rc::{Rc, Weak};
use tracing::{debug, trace};

/// The main engine instance.
///
/// Owns the realms and tracks which one code currently runs in. The first
/// realm is the global realm and lives as long as the engine.
pub struct Engine {
    realms: Vec<Value>,
    current: Value,
    next_realm_id: u32,
    parse_count: usize,
}

impl Engine {
    /// Creates a new engine with a global realm.
    pub fn new() -> Self {
        let global = Value::object(ObjectKind::Realm(Realm { id: 0 }));
        Self {
            realms: vec![global.clone()],
            current: global,
            next_realm_id: 1,
            parse_count: 0,
        }
    }

    /// The realm created with the engine
    pub fn global_realm(&self) -> &Value {
        &self.realms[0]
    }

    /// Live realms, global first
    pub fn realms(&self) -> &[Value] {
        &self.realms
    }

    /// Creates a new realm. It does not become current.
    pub fn create_realm(&mut self) -> Value {
        let realm = Value::object(ObjectKind::Realm(Realm {
            id: self.next_realm_id,
        }));
        self.next_realm_id += 1;
        self.realms.push(realm.clone());
        debug!("Created {}", realm);
        realm
    }

    /// Makes `realm` current and returns the previously current realm.
    pub fn set_current_realm(&mut self, realm: &Value) -> Result<Value> {
        if !self.realms.iter().any(|r| r.same(realm)) {
            return Err(ScriptError::type_error(format!("{} is not a live realm", realm)));
        }
        Ok(std::mem::replace(&mut self.current, realm.clone()))
    }

    /// Drops the engine's reference to `realm`.
    ///
    /// If it was current, the global realm becomes current. The global
    /// realm itself cannot be destroyed.
    pub fn destroy_realm(&mut self, realm: &Value) -> Result<()> {
        if realm.same(self.global_realm()) {
            return Err(ScriptError::type_error("The global realm cannot be destroyed"));
        }

        let index = self
            .realms
            .iter()
            .position(|r| r.same(realm))
            .ok_or_else(|| ScriptError::type_error(format!("{} is not a live realm", realm)))?;
        self.realms.remove(index);

        if self.current.same(realm) {
            self.current = self.global_realm().clone();
        }
        debug!("Destroyed {}", realm);
        Ok(())
    }

    /// Number of times the parser has been invoked
    pub fn parse_count(&self) -> usize {
        self.parse_count
    }

    fn syntax_error(&mut self, source_name: &str, err: &SyntaxError) -> Value {
        let message = format!("{} [{}:{}]", err.message, source_name, err.line);
        self.throw_error(ErrorKind::Syntax, &message)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl HostEngine for Engine {
    type Value = Value;

    fn current_realm(&self) -> Value {
        self.current.clone()
    }

    fn string_to_utf8(&self, value: &Value) -> Vec<u8> {
        value.as_str().map(|s| s.as_bytes().to_vec()).unwrap_or_default()
    }

    fn parse(&mut self, source: &[u8], options: &ParseOptions) -> std::result::Result<Value, Value> {
        self.parse_count += 1;
        let source_name = options.source_name.as_deref().unwrap_or("<anonymous>");
        trace!("Parsing {} ({} bytes)", source_name, source.len());

        let text = match std::str::from_utf8(source) {
            Ok(text) => text,
            Err(err) => {
                let valid = &source[..err.valid_up_to()];
                let line = valid.iter().filter(|&&b| b == b'\n').count() + 1;
                let err = SyntaxError {
                    message: "Invalid UTF-8 in source".to_string(),
                    line,
                };
                return Err(self.syntax_error(source_name, &err));
            }
        };

        let syntax = scanner::scan_module(text, options.module)
            .map_err(|err| self.syntax_error(source_name, &err))?;

        let kind = if options.module {
            ObjectKind::Module(Module::new(source_name.to_string(), syntax))
        } else {
            ObjectKind::Script(Script {
                source_name: source_name.to_string(),
            })
        };
        Ok(Value::object(kind))
    }

    fn throw_error(&mut self, kind: ErrorKind, message: &str) -> Value {
        Value::object(ObjectKind::Error(ErrorObject {
            kind,
            message: message.to_string(),
        }))
    }

    fn set_module_record(&mut self, module: &Value, record: Weak<ModuleRecord<Value>>) {
        if let Some(module) = module.as_module() {
            module.set_record(record);
        }
    }

    fn module_record(&self, value: &Value) -> Option<Rc<ModuleRecord<Value>>> {
        value.as_module()?.record()
    }
}
