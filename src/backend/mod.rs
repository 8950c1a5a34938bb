//! Secret storage backends
//!
//! The collector only needs two capabilities from a backend: list the
//! children under a path, and fetch the secret stored at a path. `VaultClient`
//! talks to a real KV v2 engine; `MemoryBackend` serves fixtures in tests.

#[cfg(any(test, feature = "test-utils"))]
mod memory;
mod vault;

#[cfg(any(test, feature = "test-utils"))]
pub use memory::MemoryBackend;
pub use vault::{VaultClient, VaultConfig, VaultConfigError};

use thiserror::Error;

use crate::tree::{SecretPath, SecretRecord};

/// One name returned by a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildEntry {
    /// A secret that can be fetched directly.
    Leaf(String),
    /// A folder with further children.
    Intermediate(String),
}

impl ChildEntry {
    /// Interpret a raw listing name: a trailing `/` marks a folder.
    ///
    /// Returns `None` for names that carry no segment at all.
    pub fn from_listing(raw: &str) -> Option<Self> {
        match raw.strip_suffix('/') {
            Some(name) => {
                let name = name.trim_end_matches('/');
                (!name.is_empty()).then(|| ChildEntry::Intermediate(name.to_string()))
            }
            None => (!raw.is_empty()).then(|| ChildEntry::Leaf(raw.to_string())),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ChildEntry::Leaf(name) | ChildEntry::Intermediate(name) => name,
        }
    }
}

/// Why a backend call failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendErrorKind {
    #[error("not found")]
    NotFound,

    #[error("permission denied")]
    AccessDenied,

    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

/// A failed list or fetch, tagged with the path it was issued for.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path}: {kind}")]
pub struct BackendError {
    pub path: String,
    #[source]
    pub kind: BackendErrorKind,
}

impl BackendError {
    pub fn new(path: &SecretPath, kind: BackendErrorKind) -> Self {
        Self {
            path: path.to_string(),
            kind,
        }
    }

    pub fn not_found(path: &SecretPath) -> Self {
        Self::new(path, BackendErrorKind::NotFound)
    }

    pub fn access_denied(path: &SecretPath) -> Self {
        Self::new(path, BackendErrorKind::AccessDenied)
    }

    pub fn unavailable(path: &SecretPath, reason: impl Into<String>) -> Self {
        Self::new(path, BackendErrorKind::Unavailable(reason.into()))
    }
}

/// Read-only access to a hierarchical secret store.
pub trait Backend {
    /// List the direct children of `path`, in the backend's own order.
    fn list_children(&self, path: &SecretPath) -> Result<Vec<ChildEntry>, BackendError>;

    /// Fetch the current version of the secret at `path`.
    fn fetch_secret(&self, path: &SecretPath) -> Result<SecretRecord, BackendError>;
}

impl<B: Backend + ?Sized> Backend for &B {
    fn list_children(&self, path: &SecretPath) -> Result<Vec<ChildEntry>, BackendError> {
        (**self).list_children(path)
    }

    fn fetch_secret(&self, path: &SecretPath) -> Result<SecretRecord, BackendError> {
        (**self).fetch_secret(path)
    }
}
