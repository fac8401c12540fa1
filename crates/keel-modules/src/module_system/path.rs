// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Specifier to path resolution.
//!
//! Paths are kept as strings rather than `PathBuf`: they are cache keys
//! compared byte for byte, and the directory prefix of a module is a byte
//! offset into its own path.

use crate::error::ResolveError;
use crate::platform::Platform;
use tracing::trace;

/// Returns true for bytes that end a directory component.
#[inline]
fn is_separator(byte: u8) -> bool {
    byte == b'/' || (cfg!(windows) && byte == b'\\')
}

/// Returns the length of the directory part of `path`, including the
/// trailing separator, or 0 when `path` has no directory part.
///
/// ```
/// use keel_modules::directory_end;
///
/// assert_eq!(directory_end("/a/b/c.js"), 5);
/// assert_eq!(directory_end("c.js"), 0);
/// ```
pub fn directory_end(path: &str) -> usize {
    path.bytes().rposition(is_separator).map_or(0, |index| index + 1)
}

/// Concatenates `base_dir` and `specifier` into a new buffer.
///
/// No separator is inserted: `base_dir` is a prefix cut at
/// [`directory_end`] and already ends with one.
pub fn join(base_dir: &str, specifier: &str) -> Result<String, ResolveError> {
    let mut path = String::new();
    path.try_reserve_exact(base_dir.len() + specifier.len())
        .map_err(|_| ResolveError::OutOfMemory)?;
    path.push_str(base_dir);
    path.push_str(specifier);
    Ok(path)
}

/// Resolves `specifier` against `base_dir` into an absolute path.
///
/// Canonicalization is best effort. When the platform cannot canonicalize
/// the joined path (the file does not exist, or there is no such facility)
/// the joined path is returned as is.
pub fn normalize<P: Platform>(
    platform: &P,
    specifier: &str,
    base_dir: &str,
    canonicalize: bool,
) -> Result<String, ResolveError> {
    let joined = join(base_dir, specifier)?;

    if !canonicalize {
        return Ok(joined);
    }

    match platform.canonicalize(&joined) {
        Some(canonical) => {
            trace!("Normalized '{}' to '{}'", joined, canonical);
            Ok(canonical)
        }
        None => {
            trace!("Could not canonicalize '{}', using it verbatim", joined);
            Ok(joined)
        }
    }
}
