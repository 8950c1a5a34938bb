//! kvtree - recursively list secrets from a Vault KV v2 engine

pub mod backend;
pub mod error;
pub mod output;
pub mod tree;

pub use backend::{Backend, BackendError, BackendErrorKind, ChildEntry, VaultClient, VaultConfig};
#[cfg(any(test, feature = "test-utils"))]
pub use backend::MemoryBackend;
pub use error::{Error, Result};
pub use output::{DisplayConfig, DisplayFlags, OutputFormat, RenderError, Renderer};
pub use tree::{Collector, SecretMetadata, SecretPath, SecretRecord, SecretTree};

/// Default root path when none is given.
pub const DEFAULT_ROOT: &str = "kv";

/// Parse every root path up front, so a bad path fails before any I/O.
pub fn parse_roots<S: AsRef<str>>(raw: &[S]) -> Result<Vec<SecretPath>> {
    raw.iter()
        .map(|p| SecretPath::parse(p.as_ref()).map_err(Error::from))
        .collect()
}

/// Collect every root from `backend`, then render the result into `out`.
///
/// Nothing is written unless collection succeeds completely.
pub fn run<B, W>(backend: B, roots: &[SecretPath], config: DisplayConfig, out: &mut W) -> Result<()>
where
    B: Backend,
    W: termcolor::WriteColor,
{
    let tree = Collector::new(backend).collect(roots)?;
    Renderer::new(config).render(&tree, out)?;
    Ok(())
}
