// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Handle type for unit tests

use crate::host::Handle;
use std::rc::Rc;

/// A counted handle with identity semantics. `Undefined` is the only
/// non-object value.
#[derive(Debug, Clone)]
pub(crate) enum TestHandle {
    Undefined,
    Object(Rc<String>),
}

impl TestHandle {
    pub(crate) fn object(name: &str) -> Self {
        TestHandle::Object(Rc::new(name.to_string()))
    }

    pub(crate) fn ref_count(&self) -> usize {
        match self {
            TestHandle::Undefined => 0,
            TestHandle::Object(rc) => Rc::strong_count(rc),
        }
    }
}

impl Handle for TestHandle {
    fn same(&self, other: &Self) -> bool {
        match (self, other) {
            (TestHandle::Undefined, TestHandle::Undefined) => true,
            (TestHandle::Object(a), TestHandle::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    fn is_object(&self) -> bool {
        matches!(self, TestHandle::Object(_))
    }
}
