// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Durable storage for the resolved endpoint address.
//!
//! The cache outlives a single invocation when the execution environment is reused.
//! It is not locked: concurrent first resolutions write the same value, so the last
//! writer wins and the worst case is one extra remote lookup.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::debug;

pub trait EndpointCache: Send + Sync {
    /// Returns the stored value, or `None` on any miss.
    fn get(&self, key: &str) -> Option<String>;
    fn put(&self, key: &str, value: &str) -> io::Result<()>;
}

/// Stores each key as a plain file under `dir`.
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl EndpointCache for FileCache {
    fn get(&self, key: &str) -> Option<String> {
        let path = self.path(key);
        match fs::read_to_string(&path) {
            Ok(contents) => {
                let value = contents.trim();
                if value.is_empty() {
                    debug!("Endpoint cache {} is empty", path.display());
                    None
                } else {
                    Some(value.to_string())
                }
            }
            Err(e) => {
                debug!("Endpoint cache {} unreadable: {}", path.display(), e);
                None
            }
        }
    }

    fn put(&self, key: &str, value: &str) -> io::Result<()> {
        fs::write(self.path(key), value.as_bytes())
    }
}

/// In-process cache, for tests and for embedders without a writable filesystem.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let cache = Self::new();
        if let Ok(mut entries) = cache.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
        cache
    }
}

impl EndpointCache for MemoryCache {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn put(&self, key: &str, value: &str) -> io::Result<()> {
        self.entries
            .lock()
            .map_err(|_| io::Error::other("memory cache lock poisoned"))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
