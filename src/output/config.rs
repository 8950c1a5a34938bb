//! Display options and their validation

use thiserror::Error;

/// Default length of the placeholder shown instead of a secret value.
pub const DEFAULT_PASSWORD_LENGTH: usize = 12;

/// Longest placeholder accepted for `--max-password-length`.
pub const MAX_PASSWORD_LENGTH: usize = 1024;

/// Errors found in the requested options, raised before any backend call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0}")]
    Conflict(&'static str),

    #[error("invalid path '{0}': no path segments")]
    EmptyPath(String),

    #[error("--max-password-length must be at most {max}, got {length}")]
    PasswordLength { length: usize, max: usize },
}

/// How the collected secrets are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human readable tree
    #[default]
    Tree,
    Json,
    Yaml,
}

/// Raw display flags as given on the command line.
///
/// These may contain conflicting combinations; call [`DisplayFlags::validate`]
/// to get a [`DisplayConfig`] the renderer accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayFlags {
    pub only_keys: bool,
    pub only_paths: bool,
    pub show_secrets: bool,
    pub show_metadata: bool,
    pub json: bool,
    pub yaml: bool,
    pub password_length: usize,
    pub use_color: bool,
}

impl Default for DisplayFlags {
    fn default() -> Self {
        Self {
            only_keys: false,
            only_paths: false,
            show_secrets: false,
            show_metadata: false,
            json: false,
            yaml: false,
            password_length: DEFAULT_PASSWORD_LENGTH,
            use_color: false,
        }
    }
}

/// A forbidden combination of flags.
struct Rule {
    applies: fn(&DisplayFlags) -> bool,
    message: &'static str,
}

/// Checked in order; the first matching rule is reported.
const RULES: &[Rule] = &[
    Rule {
        applies: |f| f.json && f.yaml,
        message: "cannot specify both --to-json and --to-yaml",
    },
    Rule {
        applies: |f| f.only_keys && f.show_secrets,
        message: "cannot specify both --only-keys and --show-secrets",
    },
    Rule {
        applies: |f| f.only_paths && f.show_secrets,
        message: "cannot specify both --only-paths and --show-secrets",
    },
    Rule {
        applies: |f| f.show_metadata && (f.only_keys || f.only_paths),
        message: "cannot specify --show-metadata in conjunction with --only-keys or --only-paths",
    },
    Rule {
        applies: |f| f.only_keys && f.only_paths,
        message: "cannot specify both --only-keys and --only-paths",
    },
];

impl DisplayFlags {
    /// Reject forbidden combinations and freeze the result.
    pub fn validate(&self) -> Result<DisplayConfig, ConfigError> {
        if let Some(rule) = RULES.iter().find(|r| (r.applies)(self)) {
            return Err(ConfigError::Conflict(rule.message));
        }
        if self.password_length > MAX_PASSWORD_LENGTH {
            return Err(ConfigError::PasswordLength {
                length: self.password_length,
                max: MAX_PASSWORD_LENGTH,
            });
        }

        let format = if self.json {
            OutputFormat::Json
        } else if self.yaml {
            OutputFormat::Yaml
        } else {
            OutputFormat::Tree
        };

        Ok(DisplayConfig {
            only_keys: self.only_keys,
            only_paths: self.only_paths,
            show_secrets: self.show_secrets,
            show_metadata: self.show_metadata,
            format,
            password_length: self.password_length,
            use_color: self.use_color,
        })
    }
}

/// Validated, immutable display configuration.
///
/// Only obtainable through [`DisplayFlags::validate`], so the renderer never
/// sees a conflicting combination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayConfig {
    only_keys: bool,
    only_paths: bool,
    show_secrets: bool,
    show_metadata: bool,
    format: OutputFormat,
    password_length: usize,
    use_color: bool,
}

impl DisplayConfig {
    pub fn only_keys(&self) -> bool {
        self.only_keys
    }

    pub fn only_paths(&self) -> bool {
        self.only_paths
    }

    pub fn show_secrets(&self) -> bool {
        self.show_secrets
    }

    pub fn show_metadata(&self) -> bool {
        self.show_metadata
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn password_length(&self) -> usize {
        self.password_length
    }

    pub fn use_color(&self) -> bool {
        self.use_color
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            only_keys: false,
            only_paths: false,
            show_secrets: false,
            show_metadata: false,
            format: OutputFormat::Tree,
            password_length: DEFAULT_PASSWORD_LENGTH,
            use_color: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every combination of the five boolean flags that feed the rules.
    fn all_combinations() -> Vec<DisplayFlags> {
        (0u8..64)
            .map(|bits| DisplayFlags {
                only_keys: bits & 1 != 0,
                only_paths: bits & 2 != 0,
                show_secrets: bits & 4 != 0,
                show_metadata: bits & 8 != 0,
                json: bits & 16 != 0,
                yaml: bits & 32 != 0,
                ..Default::default()
            })
            .collect()
    }

    fn forbidden(f: &DisplayFlags) -> bool {
        (f.json && f.yaml)
            || (f.only_keys && f.show_secrets)
            || (f.only_paths && f.show_secrets)
            || (f.show_metadata && (f.only_keys || f.only_paths))
            || (f.only_keys && f.only_paths)
    }

    #[test]
    fn test_forbidden_combinations_always_rejected() {
        for flags in all_combinations() {
            let result = flags.validate();
            assert_eq!(
                result.is_err(),
                forbidden(&flags),
                "unexpected validation result for {:?}",
                flags
            );
        }
    }

    #[test]
    fn test_json_and_yaml_message() {
        let flags = DisplayFlags {
            json: true,
            yaml: true,
            only_keys: true,
            only_paths: true,
            ..Default::default()
        };
        // The first rule in the table wins.
        assert_eq!(
            flags.validate(),
            Err(ConfigError::Conflict(
                "cannot specify both --to-json and --to-yaml"
            ))
        );
    }

    #[test]
    fn test_defaults() {
        let config = DisplayConfig::default();
        assert_eq!(config.format(), OutputFormat::Tree);
        assert_eq!(config.password_length(), DEFAULT_PASSWORD_LENGTH);
        assert!(!config.show_secrets());
        assert!(!config.only_keys());
        assert!(!config.only_paths());
        assert!(!config.show_metadata());
    }

    #[test]
    fn test_format_selection() {
        let json = DisplayFlags {
            json: true,
            ..Default::default()
        };
        assert_eq!(json.validate().unwrap().format(), OutputFormat::Json);

        let yaml = DisplayFlags {
            yaml: true,
            show_metadata: true,
            ..Default::default()
        };
        let config = yaml.validate().unwrap();
        assert_eq!(config.format(), OutputFormat::Yaml);
        assert!(config.show_metadata());
    }

    #[test]
    fn test_password_length_bounded() {
        let at_limit = DisplayFlags {
            password_length: MAX_PASSWORD_LENGTH,
            ..Default::default()
        };
        assert_eq!(
            at_limit.validate().unwrap().password_length(),
            MAX_PASSWORD_LENGTH
        );

        let huge = DisplayFlags {
            password_length: usize::MAX,
            ..Default::default()
        };
        assert_eq!(
            huge.validate(),
            Err(ConfigError::PasswordLength {
                length: usize::MAX,
                max: MAX_PASSWORD_LENGTH,
            })
        );
    }
}
