//! Configuration loader
//!
//! Loading pipeline:
//! 1. Size check and raw read
//! 2. Environment variable expansion (on raw text, before parsing)
//! 3. YAML parsing (an empty document means "all defaults")
//! 4. Overrides
//! 5. Validation

use std::path::Path;

use serde_yaml::Value;

use crate::config::schema::{ConfigOverrides, TrialConfig};
use crate::config::validation::Validator;
use crate::error::{ConfigError, ValidationIssue};

// ============================================================================
// Public API
// ============================================================================

/// Options for the configuration loader.
#[derive(Debug, Clone)]
pub struct LoaderOptions {
    /// Maximum configuration file size in bytes.
    pub max_config_size: u64,

    /// Field overrides applied after parsing and before validation.
    pub overrides: ConfigOverrides,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            max_config_size: env_or("ARROWGRID_MAX_CONFIG_SIZE", 1024 * 1024),
            overrides: ConfigOverrides::default(),
        }
    }
}

/// Result of loading a configuration file.
#[derive(Debug)]
pub struct LoadResult {
    /// The loaded and validated configuration.
    pub config: TrialConfig,

    /// Warnings encountered during loading and validation.
    pub warnings: Vec<ValidationIssue>,
}

/// Configuration loader.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: LoaderOptions,
}

impl ConfigLoader {
    /// Creates a new configuration loader with the given options.
    #[must_use]
    pub const fn new(options: LoaderOptions) -> Self {
        Self { options }
    }

    /// Loads, expands, parses, and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or too large, an environment
    /// reference cannot be resolved, YAML parsing fails, or validation
    /// reports any error.
    pub fn load(&self, path: &Path) -> Result<LoadResult, ConfigError> {
        let metadata = std::fs::metadata(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;
        if metadata.len() > self.options.max_config_size {
            return Err(ConfigError::FileTooLarge {
                path: path.to_path_buf(),
                size: metadata.len(),
                limit: self.options.max_config_size,
            });
        }

        let raw = std::fs::read_to_string(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;
        let raw = raw.strip_prefix('\u{feff}').unwrap_or(&raw);

        let expanded = expand_env(raw, path)?;
        let config = parse(&expanded, path)?.with_overrides(&self.options.overrides);

        let result = Validator::new().validate(&config);
        if result.has_errors() {
            return Err(ConfigError::ValidationError {
                path: path.display().to_string(),
                errors: result.errors,
            });
        }

        Ok(LoadResult {
            config,
            warnings: result.warnings,
        })
    }

    /// Resolves a configuration from an optional file.
    ///
    /// Without a file the defaults are used, with overrides and validation
    /// applied exactly as for a loaded file.
    ///
    /// # Errors
    ///
    /// See [`ConfigLoader::load`].
    pub fn load_or_default(&self, path: Option<&Path>) -> Result<LoadResult, ConfigError> {
        if let Some(path) = path {
            return self.load(path);
        }

        let config = TrialConfig::default().with_overrides(&self.options.overrides);
        let result = Validator::new().validate(&config);
        if result.has_errors() {
            return Err(ConfigError::ValidationError {
                path: "<defaults>".to_string(),
                errors: result.errors,
            });
        }
        Ok(LoadResult {
            config,
            warnings: result.warnings,
        })
    }
}

// ============================================================================
// Parsing
// ============================================================================

fn parse(text: &str, path: &Path) -> Result<TrialConfig, ConfigError> {
    let parse_error = |e: &serde_yaml::Error| ConfigError::ParseError {
        path: path.to_path_buf(),
        line: e.location().map(|l| l.line()),
        message: e.to_string(),
    };

    let root: Value = serde_yaml::from_str(text).map_err(|e| parse_error(&e))?;
    if root.is_null() {
        return Ok(TrialConfig::default());
    }
    serde_yaml::from_value(root).map_err(|e| parse_error(&e))
}

// ============================================================================
// Environment Variable Expansion
// ============================================================================

/// Expands `${VAR}` and `${VAR:-default}` references; `$$` is a literal `$`.
fn expand_env(raw: &str, path: &Path) -> Result<String, ConfigError> {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(idx) = rest.find('$') {
        out.push_str(&rest[..idx]);
        let tail = &rest[idx + 1..];

        if let Some(after) = tail.strip_prefix('$') {
            out.push('$');
            rest = after;
        } else if let Some(reference) = tail.strip_prefix('{') {
            let Some(close) = reference.find('}') else {
                return Err(ConfigError::ParseError {
                    path: path.to_path_buf(),
                    line: line_of(raw, raw.len() - rest.len() + idx),
                    message: "Unclosed environment variable reference".to_string(),
                });
            };
            out.push_str(&resolve_var(&reference[..close], path)?);
            rest = &reference[close + 1..];
        } else {
            out.push('$');
            rest = tail;
        }
    }

    out.push_str(rest);
    Ok(out)
}

fn resolve_var(reference: &str, path: &Path) -> Result<String, ConfigError> {
    let (name, default) = match reference.split_once(":-") {
        Some((name, default)) => (name, Some(default)),
        None => (reference, None),
    };

    match (std::env::var(name), default) {
        (Ok(value), _) => Ok(value),
        (Err(_), Some(default)) => Ok(default.to_string()),
        (Err(_), None) => Err(ConfigError::EnvVarNotSet {
            var: name.to_string(),
            location: path.display().to_string(),
        }),
    }
}

fn line_of(text: &str, byte_offset: usize) -> Option<usize> {
    text.get(..byte_offset)
        .map(|prefix| prefix.matches('\n').count() + 1)
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
