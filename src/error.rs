//! Top-level error type for a run

use thiserror::Error;

use crate::backend::{BackendError, VaultConfigError};
use crate::output::{ConfigError, RenderError};

/// Everything that can stop a run, by kind.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("vault configuration: {0}")]
    Vault(#[from] VaultConfigError),

    #[error("reading secrets failed at {0}")]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

pub type Result<T> = std::result::Result<T, Error>;
