// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Engine values.
//!
//! Objects are reference counted; cloning a [`Value`] acquires a reference
//! and dropping it releases one. Two values are the same object only if
//! they point at the same allocation.

use crate::scanner::ModuleSyntax;
use keel_modules::{ErrorKind, Handle, ModuleRecord};
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// A script value.
#[derive(Debug, Clone)]
pub enum Value {
    /// The undefined value
    Undefined,
    /// An immutable string
    String(Rc<str>),
    /// A heap object
    Object(ObjectRef),
}

impl Value {
    /// Creates a string value.
    pub fn string(s: &str) -> Self {
        Value::String(Rc::from(s))
    }

    pub(crate) fn object(kind: ObjectKind) -> Self {
        Value::Object(ObjectRef(Rc::new(Object { kind })))
    }

    /// Check if the value is undefined
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Returns the string contents of a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(&**s),
            _ => None,
        }
    }

    /// Returns the object kind of an object value.
    pub fn kind(&self) -> Option<&ObjectKind> {
        match self {
            Value::Object(obj) => Some(&obj.0.kind),
            _ => None,
        }
    }

    /// Returns the module data of a module object.
    pub fn as_module(&self) -> Option<&Module> {
        match self.kind()? {
            ObjectKind::Module(module) => Some(module),
            _ => None,
        }
    }

    /// Returns the realm data of a realm object.
    pub fn as_realm(&self) -> Option<&Realm> {
        match self.kind()? {
            ObjectKind::Realm(realm) => Some(realm),
            _ => None,
        }
    }

    /// Returns the error data of an error object.
    pub fn as_error(&self) -> Option<&ErrorObject> {
        match self.kind()? {
            ObjectKind::Error(error) => Some(error),
            _ => None,
        }
    }

    /// Number of live references to an object, 0 for primitives.
    pub fn ref_count(&self) -> usize {
        match self {
            Value::Object(obj) => Rc::strong_count(&obj.0),
            _ => 0,
        }
    }
}

impl Handle for Value {
    fn same(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::String(a), Value::String(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(&a.0, &b.0),
            _ => false,
        }
    }

    fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            Value::String(s) => f.write_str(s),
            Value::Object(obj) => match &obj.0.kind {
                ObjectKind::Realm(realm) => write!(f, "[object Realm #{}]", realm.id),
                ObjectKind::Module(module) => write!(f, "[object Module {}]", module.source_name),
                ObjectKind::Script(script) => write!(f, "[object Script {}]", script.source_name),
                ObjectKind::Error(error) => write!(f, "{}: {}", error.kind, error.message),
            },
        }
    }
}

/// A counted reference to a heap object.
#[derive(Clone)]
pub struct ObjectRef(Rc<Object>);

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.kind.fmt(f)
    }
}

/// A heap object.
pub struct Object {
    kind: ObjectKind,
}

/// What an object is.
#[derive(Debug)]
pub enum ObjectKind {
    /// A realm (global environment)
    Realm(Realm),
    /// A compiled module
    Module(Module),
    /// A compiled classic script
    Script(Script),
    /// An exception object
    Error(ErrorObject),
}

/// Realm data.
#[derive(Debug)]
pub struct Realm {
    /// Sequential realm id, 0 for the global realm
    pub id: u32,
}

/// A compiled module.
#[derive(Debug)]
pub struct Module {
    /// Name given at parse time (the specifier it was imported by)
    pub source_name: String,
    /// Static import/export interface
    pub syntax: ModuleSyntax,
    /// Record attached by the module loader
    record: RefCell<Weak<ModuleRecord<Value>>>,
}

impl Module {
    pub(crate) fn new(source_name: String, syntax: ModuleSyntax) -> Self {
        Self {
            source_name,
            syntax,
            record: RefCell::new(Weak::new()),
        }
    }

    pub(crate) fn set_record(&self, record: Weak<ModuleRecord<Value>>) {
        *self.record.borrow_mut() = record;
    }

    /// The loader record for this module, if it is still cached.
    pub fn record(&self) -> Option<Rc<ModuleRecord<Value>>> {
        self.record.borrow().upgrade()
    }
}

/// A compiled classic script.
#[derive(Debug)]
pub struct Script {
    /// Name given at parse time
    pub source_name: String,
}

/// An exception object.
#[derive(Debug, Clone)]
pub struct ErrorObject {
    /// Constructor kind
    pub kind: ErrorKind,
    /// Message text
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let a = Value::object(ObjectKind::Realm(Realm { id: 1 }));
        let b = Value::object(ObjectKind::Realm(Realm { id: 1 }));

        assert!(a.same(&a.clone()));
        assert!(!a.same(&b));
        assert!(Value::Undefined.same(&Value::Undefined));
        assert!(!Value::string("x").same(&Value::string("x")));
    }

    #[test]
    fn test_ref_count() {
        let a = Value::object(ObjectKind::Realm(Realm { id: 1 }));
        assert_eq!(a.ref_count(), 1);
        let b = a.clone();
        assert_eq!(a.ref_count(), 2);
        drop(b);
        assert_eq!(a.ref_count(), 1);
        assert_eq!(Value::Undefined.ref_count(), 0);
    }

    #[test]
    fn test_display() {
        let error = Value::object(ObjectKind::Error(ErrorObject {
            kind: ErrorKind::Syntax,
            message: "Module file not found".to_string(),
        }));
        assert_eq!(error.to_string(), "SyntaxError: Module file not found");
        assert_eq!(Value::Undefined.to_string(), "undefined");
        assert_eq!(Value::string("abc").to_string(), "abc");
    }

    #[test]
    fn test_accessors() {
        let module = Value::object(ObjectKind::Module(Module::new(
            "./a.js".to_string(),
            ModuleSyntax::default(),
        )));
        assert_eq!(module.as_module().unwrap().source_name, "./a.js");
        assert!(module.as_realm().is_none());
        assert!(module.as_module().unwrap().record().is_none());
        assert!(Value::string("x").as_module().is_none());
    }
}
