//! Configuration validation
//!
//! Loads each file through the full loader pipeline and reports every
//! issue, without running a trial.

use std::path::Path;

use serde::Serialize;

use crate::cli::args::{OutputFormat, ValidateArgs};
use crate::config::{ConfigLoader, LoaderOptions};
use crate::error::{ArrowGridError, ConfigError, Severity, ValidationIssue};

/// Validation outcome of one file.
#[derive(Debug, Serialize)]
struct FileReport {
    file: String,
    valid: bool,
    errors: Vec<String>,
    warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
struct Summary {
    total: usize,
    valid: usize,
    invalid: usize,
}

#[derive(Debug, Serialize)]
struct Report {
    files: Vec<FileReport>,
    summary: Summary,
}

/// Validate configuration files.
///
/// # Errors
///
/// Returns the first file's error if any file fails to load or validate.
/// With `--strict`, warnings fail a file as well.
pub fn run(args: &ValidateArgs) -> Result<(), ArrowGridError> {
    let loader = ConfigLoader::new(LoaderOptions::default());
    let mut files = Vec::with_capacity(args.files.len());
    let mut first_error: Option<ConfigError> = None;

    for path in &args.files {
        tracing::info!(file = %path.display(), "validating configuration");
        let (report, error) = check(&loader, path, args.strict);
        if first_error.is_none() {
            first_error = error;
        }
        files.push(report);
    }

    let valid = files.iter().filter(|r| r.valid).count();
    let report = Report {
        summary: Summary {
            total: files.len(),
            valid,
            invalid: files.len() - valid,
        },
        files,
    };

    match args.format {
        OutputFormat::Human => print_human(&report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    first_error.map_or(Ok(()), |e| Err(e.into()))
}

fn check(loader: &ConfigLoader, path: &Path, strict: bool) -> (FileReport, Option<ConfigError>) {
    let file = path.display().to_string();
    match loader.load(path) {
        Ok(result) => {
            let warnings: Vec<String> = result.warnings.iter().map(ToString::to_string).collect();
            let error = (strict && !result.warnings.is_empty()).then(|| {
                ConfigError::ValidationError {
                    path: file.clone(),
                    errors: result
                        .warnings
                        .into_iter()
                        .map(|w| ValidationIssue {
                            severity: Severity::Error,
                            ..w
                        })
                        .collect(),
                }
            });
            let report = FileReport {
                file,
                valid: error.is_none(),
                errors: Vec::new(),
                warnings,
            };
            (report, error)
        }
        Err(e) => {
            let errors = match &e {
                ConfigError::ValidationError { errors, .. } => {
                    errors.iter().map(ToString::to_string).collect()
                }
                other => vec![other.to_string()],
            };
            let report = FileReport {
                file,
                valid: false,
                errors,
                warnings: Vec::new(),
            };
            (report, Some(e))
        }
    }
}

fn print_human(report: &Report) {
    for file in &report.files {
        let mark = if file.valid { "ok" } else { "FAILED" };
        println!("{}: {mark}", file.file);
        for line in file.errors.iter().chain(&file.warnings) {
            println!("  {line}");
        }
    }
    println!(
        "{} file(s) checked, {} valid, {} invalid",
        report.summary.total, report.summary.valid, report.summary.invalid
    );
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn config_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn valid_file_reports_no_issues() {
        let file = config_file("grid_size: 6\n");
        let (report, error) = check(&ConfigLoader::default(), file.path(), false);
        assert!(report.valid);
        assert!(report.errors.is_empty());
        assert!(error.is_none());
    }

    #[test]
    fn invalid_file_lists_every_error() {
        let file = config_file("grid_size: 0\nleft_probability: 2.0\n");
        let (report, error) = check(&ConfigLoader::default(), file.path(), false);
        assert!(!report.valid);
        assert_eq!(report.errors.len(), 2);
        assert!(matches!(error, Some(ConfigError::ValidationError { .. })));
    }

    #[test]
    fn strict_fails_on_warnings() {
        let file = config_file("grid_size: 2\n");
        let loader = ConfigLoader::default();

        let (lenient, _) = check(&loader, file.path(), false);
        assert!(lenient.valid);
        assert_eq!(lenient.warnings.len(), 1);

        let (strict, error) = check(&loader, file.path(), true);
        assert!(!strict.valid);
        let Some(ConfigError::ValidationError { errors, .. }) = error else {
            panic!("expected validation error");
        };
        assert!(errors.iter().all(|e| e.severity == Severity::Error));
    }

    #[test]
    fn missing_file_is_reported() {
        let (report, error) = check(
            &ConfigLoader::default(),
            Path::new("/nonexistent/arrowgrid.yaml"),
            false,
        );
        assert!(!report.valid);
        assert!(matches!(error, Some(ConfigError::MissingFile { .. })));
    }
}
