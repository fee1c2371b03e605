//! Configuration validation
//!
//! Validation collects ALL issues instead of stopping at the first one, so
//! `arrowgrid validate` can report everything wrong with a file in a single
//! pass.

use crate::config::schema::TrialConfig;
use crate::error::{Severity, ValidationIssue};

/// Grid sizes above this trigger a warning.
const LARGE_GRID_SIZE: usize = 64;

/// Largest accepted grid size. Renderers keep one cell per position.
pub const MAX_GRID_SIZE: usize = 1024;

// ============================================================================
// Public API
// ============================================================================

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Validation errors (prevent construction).
    pub errors: Vec<ValidationIssue>,

    /// Validation warnings (informational).
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Returns `true` if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns `true` if validation passed (no errors).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Configuration validator.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
}

impl Validator {
    /// Creates a new validator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates a configuration and returns every issue found.
    pub fn validate(&mut self, config: &TrialConfig) -> ValidationResult {
        self.errors.clear();
        self.warnings.clear();

        self.validate_grid(config);
        self.validate_timing(config);
        self.validate_probability("left_probability", config.left_probability);
        self.validate_probability("right_probability", config.right_probability);

        ValidationResult {
            errors: std::mem::take(&mut self.errors),
            warnings: std::mem::take(&mut self.warnings),
        }
    }

    // ========================================================================
    // Field Rules
    // ========================================================================

    fn validate_grid(&mut self, config: &TrialConfig) {
        if config.grid_size == 0 {
            self.add_error("grid_size", "Grid size must be at least 1");
            return;
        }

        if config.grid_size > MAX_GRID_SIZE {
            self.add_error(
                "grid_size",
                &format!(
                    "Grid size must be at most {MAX_GRID_SIZE}, got {}",
                    config.grid_size
                ),
            );
            return;
        }

        if config.grid_size > LARGE_GRID_SIZE {
            self.add_warning(
                "grid_size",
                &format!("Grid size is unusually large (> {LARGE_GRID_SIZE})"),
            );
        }

        // One update tick per frame, so a run places at most
        // `duration_frames` stimuli on each grid.
        let updates = usize::try_from(config.duration_frames).unwrap_or(usize::MAX);
        if config.duration_frames > 0 && config.capacity() < updates {
            self.add_warning(
                "grid_size",
                &format!(
                    "Grid capacity {} is smaller than {} updates per trial; grids will deplete",
                    config.capacity(),
                    updates
                ),
            );
        }
    }

    fn validate_timing(&mut self, config: &TrialConfig) {
        if config.duration_frames == 0 {
            self.add_error("duration_frames", "Trial duration must be at least 1 frame");
        }
        if config.tick_interval_ms == 0 {
            self.add_error("tick_interval_ms", "Tick interval must be at least 1ms");
        }
    }

    fn validate_probability(&mut self, path: &str, value: f64) {
        if !(0.0..=1.0).contains(&value) {
            self.add_error(
                path,
                &format!("Probability must be within [0, 1], got {value}"),
            );
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// Adds an error to the collection.
    fn add_error(&mut self, path: &str, message: &str) {
        self.errors.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: Severity::Error,
        });
    }

    /// Adds a warning to the collection.
    fn add_warning(&mut self, path: &str, message: &str) {
        self.warnings.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: Severity::Warning,
        });
    }
}
