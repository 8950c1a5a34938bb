//! Secret tree collection
//!
//! This module holds the data model for a collection run and the collector
//! that fills it:
//!
//! - `SecretPath`: a location in the hierarchy
//! - `SecretRecord` / `SecretMetadata`: what lives at a leaf
//! - `SecretTree`: every leaf found, keyed by full path
//! - `Collector`: depth-first walk over a `Backend`

mod collector;
mod path;
mod record;
mod secret_tree;

pub use collector::Collector;
pub use path::{SEPARATOR, SecretPath};
pub use record::{SecretMetadata, SecretRecord};
pub use secret_tree::SecretTree;
