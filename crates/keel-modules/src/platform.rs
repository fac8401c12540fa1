// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Platform services used by the loader: reading sources and canonicalizing paths.

use crate::error::PlatformError;
use std::fs::{self, File};
use std::io::{self, Read};
use tracing::error;

/// Filesystem access for the module loader.
pub trait Platform {
    /// Reads the whole file at `path` into a fresh buffer.
    ///
    /// Must fail, not panic, on a missing file, a directory, a permission
    /// problem, or a short read. Dropping the buffer releases it.
    fn read_source(&self, path: &str) -> Result<Vec<u8>, PlatformError>;

    /// Returns the absolute, canonical form of `path`, or `None` if the
    /// platform cannot produce one.
    fn canonicalize(&self, path: &str) -> Option<String>;
}

/// [`Platform`] backed by the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsPlatform;

impl Platform for FsPlatform {
    fn read_source(&self, path: &str) -> Result<Vec<u8>, PlatformError> {
        read_whole_file(path).inspect_err(|err| error!("Error: {}", err))
    }

    #[cfg(unix)]
    fn canonicalize(&self, path: &str) -> Option<String> {
        // realpath semantics: the target has to exist
        fs::canonicalize(path)
            .ok()
            .and_then(|p| p.into_os_string().into_string().ok())
    }

    #[cfg(windows)]
    fn canonicalize(&self, path: &str) -> Option<String> {
        // _fullpath semantics: purely lexical, no existence check
        std::path::absolute(path)
            .ok()
            .and_then(|p| p.into_os_string().into_string().ok())
    }

    #[cfg(not(any(unix, windows)))]
    fn canonicalize(&self, _path: &str) -> Option<String> {
        None
    }
}

fn read_whole_file(path: &str) -> Result<Vec<u8>, PlatformError> {
    let metadata = fs::metadata(path).map_err(|source| open_error(path, source))?;

    if metadata.is_dir() {
        return Err(PlatformError::IsDirectory {
            path: path.to_string(),
        });
    }

    let file = File::open(path).map_err(|source| open_error(path, source))?;

    let expected = usize::try_from(metadata.len()).map_err(|_| PlatformError::OutOfMemory {
        path: path.to_string(),
    })?;

    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(expected)
        .map_err(|_| PlatformError::OutOfMemory {
            path: path.to_string(),
        })?;

    file
        .take(metadata.len())
        .read_to_end(&mut buffer)
        .map_err(|source| PlatformError::Read {
            path: path.to_string(),
            source,
        })?;

    if buffer.len() != expected {
        return Err(PlatformError::ShortRead {
            path: path.to_string(),
            expected,
            actual: buffer.len(),
        });
    }

    Ok(buffer)
}

fn open_error(path: &str, source: io::Error) -> PlatformError {
    if source.kind() == io::ErrorKind::NotFound {
        PlatformError::NotFound {
            path: path.to_string(),
        }
    } else {
        PlatformError::Open {
            path: path.to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn path_str(path: &std::path::Path) -> String {
        path.to_str().unwrap().to_string()
    }

    #[test]
    fn test_read_source() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("lib.js");
        fs::File::create(&file)
            .unwrap()
            .write_all(b"export const x = 1;")
            .unwrap();

        let source = FsPlatform.read_source(&path_str(&file)).unwrap();
        assert_eq!(source, b"export const x = 1;");
    }

    #[test]
    fn test_read_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("empty.js");
        fs::File::create(&file).unwrap();

        assert!(FsPlatform.read_source(&path_str(&file)).unwrap().is_empty());
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = path_str(&dir.path().join("nope.js"));

        let err = FsPlatform.read_source(&missing).unwrap_err();
        assert!(matches!(err, PlatformError::NotFound { .. }));
    }

    #[test]
    fn test_read_directory_fails() {
        let dir = tempfile::tempdir().unwrap();

        let err = FsPlatform.read_source(&path_str(dir.path())).unwrap_err();
        assert!(matches!(err, PlatformError::IsDirectory { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_canonicalize_resolves_dot_segments() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::File::create(dir.path().join("lib.js")).unwrap();

        let raw = format!("{}/sub/../lib.js", path_str(dir.path()));
        let canonical = FsPlatform.canonicalize(&raw).unwrap();
        let expected = fs::canonicalize(dir.path().join("lib.js")).unwrap();
        assert_eq!(canonical, path_str(&expected));
    }

    #[cfg(unix)]
    #[test]
    fn test_canonicalize_missing_target() {
        assert_eq!(FsPlatform.canonicalize("/definitely/not/here.js"), None);
    }
}
