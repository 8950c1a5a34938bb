//! Secret paths
//!
//! A `SecretPath` is an ordered list of non-empty segments. The first segment
//! names the KV mount; the rest address a location inside it.

use std::fmt;

use crate::output::ConfigError;

/// Separator used by the backend between path segments.
pub const SEPARATOR: char = '/';

/// A location in the secret hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SecretPath {
    segments: Vec<String>,
}

impl SecretPath {
    /// Parse a user-supplied path such as `kv/app1`.
    ///
    /// Empty segments are dropped, so leading, trailing and doubled
    /// separators are tolerated. A path with no segments at all is rejected.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let segments: Vec<String> = raw
            .split(SEPARATOR)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        if segments.is_empty() {
            return Err(ConfigError::EmptyPath(raw.to_string()));
        }

        Ok(Self { segments })
    }

    /// Append one child segment, returning the new path.
    ///
    /// The segment must not be empty or contain the separator; listings from
    /// the backend are split into `ChildEntry` values before they get here.
    pub fn join(&self, segment: &str) -> Self {
        debug_assert!(!segment.is_empty() && !segment.contains(SEPARATOR));
        let mut segments = self.segments.clone();
        segments.push(segment.to_string());
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The KV mount this path lives under.
    pub fn mount(&self) -> &str {
        &self.segments[0]
    }

    /// Segments below the mount, joined with the separator ("" for the mount itself).
    pub fn sub_path(&self) -> String {
        self.segments[1..].join("/")
    }

    /// Last segment of the path.
    pub fn name(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }
}

impl fmt::Display for SecretPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}
