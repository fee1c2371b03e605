//! Configuration module
//!
//! Loading and validation of trial configuration files, plus the overrides
//! collected from the command line.

pub mod duration;
pub mod loader;
pub mod schema;
pub mod validation;

pub use duration::parse_duration;
pub use loader::{ConfigLoader, LoadResult, LoaderOptions};
pub use schema::*;
pub use validation::{ValidationResult, Validator};
