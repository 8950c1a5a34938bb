//! Secret tree rendering
//!
//! This module turns a collected `SecretTree` into one of several outputs:
//! - a coloured tree (default)
//! - a flat list of field names or leaf paths
//! - a JSON or YAML document mirroring the path hierarchy
//!
//! # Module Structure
//!
//! - `config` - Display flags, validation rules and the validated config
//! - `hierarchy` - Regrouping flat paths into nested segments
//! - `tree` - Tree formatter
//! - `listing` - Only-keys / only-paths projections
//! - `structured` - JSON and YAML documents
//! - `utils` - Masking and drawing helpers

mod config;
mod hierarchy;
mod listing;
mod structured;
mod tree;
mod utils;

use std::io;

use termcolor::WriteColor;
use thiserror::Error;

pub use config::{
    ConfigError, DEFAULT_PASSWORD_LENGTH, DisplayConfig, DisplayFlags, MAX_PASSWORD_LENGTH,
    OutputFormat,
};
pub use listing::{Listing, write_listing};
pub use structured::{MAX_DOCUMENT_DEPTH, build_document, write_structured};
pub use tree::TreeFormatter;
pub use utils::{MASK_CHAR, mask};

use crate::tree::SecretTree;

/// Failures while producing output.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),

    #[error("failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to encode YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("'{0}' is both a field name and a sub-path; cannot nest it in a document")]
    PathConflict(String),

    #[error("'{path}' is nested more than {limit} levels deep; use the tree output instead")]
    TooDeep { path: String, limit: usize },
}

/// Renders a collected tree according to a validated display config.
pub struct Renderer {
    config: DisplayConfig,
}

impl Renderer {
    pub fn new(config: DisplayConfig) -> Self {
        Self { config }
    }

    /// Write the whole rendering to `out` in one pass.
    pub fn render<W: WriteColor>(&self, tree: &SecretTree, out: &mut W) -> Result<(), RenderError> {
        match self.config.format() {
            OutputFormat::Json | OutputFormat::Yaml => write_structured(tree, &self.config, out),
            OutputFormat::Tree if self.config.only_keys() => {
                Ok(write_listing(tree, Listing::Keys, out)?)
            }
            OutputFormat::Tree if self.config.only_paths() => {
                Ok(write_listing(tree, Listing::Paths, out)?)
            }
            OutputFormat::Tree => Ok(TreeFormatter::new(self.config.clone()).write(tree, out)?),
        }
    }
}
