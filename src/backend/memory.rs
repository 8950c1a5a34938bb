//! In-memory backend for tests and benchmarks.
//!
//! This module is only compiled for tests and with the `test-utils` feature.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::tree::{SecretPath, SecretRecord};

use super::{Backend, BackendError, BackendErrorKind, ChildEntry};

/// A fixture backend holding leaves in insertion order.
///
/// Listings are derived from the stored leaf paths, so a folder exists as
/// soon as some leaf lives below it. Every call is recorded and failures can
/// be injected per path.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    leaves: Vec<(SecretPath, SecretRecord)>,
    list_failures: HashMap<String, BackendErrorKind>,
    fetch_failures: HashMap<String, BackendErrorKind>,
    calls: RefCell<Vec<String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a leaf secret at `path` (e.g. `kv/app1`).
    ///
    /// # Panics
    ///
    /// Panics if `path` has no segments.
    pub fn with_secret(mut self, path: &str, record: SecretRecord) -> Self {
        let path = SecretPath::parse(path).expect("fixture path must not be empty");
        self.leaves.push((path, record));
        self
    }

    /// Make listing `path` fail with `kind`.
    pub fn fail_list(mut self, path: &str, kind: BackendErrorKind) -> Self {
        self.list_failures.insert(path.to_string(), kind);
        self
    }

    /// Make fetching `path` fail with `kind`.
    pub fn fail_fetch(mut self, path: &str, kind: BackendErrorKind) -> Self {
        self.fetch_failures.insert(path.to_string(), kind);
        self
    }

    /// Calls made so far, as `list <path>` / `fetch <path>`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record_call(&self, op: &str, path: &SecretPath) {
        self.calls.borrow_mut().push(format!("{} {}", op, path));
    }
}

impl Backend for MemoryBackend {
    fn list_children(&self, path: &SecretPath) -> Result<Vec<ChildEntry>, BackendError> {
        self.record_call("list", path);
        if let Some(kind) = self.list_failures.get(&path.to_string()) {
            return Err(BackendError::new(path, kind.clone()));
        }

        let prefix = path.segments();
        let mut children: Vec<ChildEntry> = Vec::new();
        for (leaf, _) in &self.leaves {
            let segments = leaf.segments();
            if segments.len() <= prefix.len() || !segments.starts_with(prefix) {
                continue;
            }
            let name = segments[prefix.len()].clone();
            let entry = if segments.len() == prefix.len() + 1 {
                ChildEntry::Leaf(name)
            } else {
                ChildEntry::Intermediate(name)
            };
            if !children.contains(&entry) {
                children.push(entry);
            }
        }

        if children.is_empty() {
            return Err(BackendError::not_found(path));
        }
        Ok(children)
    }

    fn fetch_secret(&self, path: &SecretPath) -> Result<SecretRecord, BackendError> {
        self.record_call("fetch", path);
        if let Some(kind) = self.fetch_failures.get(&path.to_string()) {
            return Err(BackendError::new(path, kind.clone()));
        }

        self.leaves
            .iter()
            .rev()
            .find(|(p, _)| p == path)
            .map(|(_, r)| r.clone())
            .ok_or_else(|| BackendError::not_found(path))
    }
}
