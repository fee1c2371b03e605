//! Diagnostic logging
//!
//! `tracing` output goes to stderr, to a file, or nowhere. The interactive
//! `run` command redraws the terminal in place, so while it owns the terminal
//! diagnostics are only written when a log file was given.

use std::fs::OpenOptions;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::ValueEnum;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use crate::cli::args::ColorChoice;

/// Overrides the verbosity-derived filter when set.
pub const LOG_LEVEL_ENV: &str = "ARROWGRID_LOG_LEVEL";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Plain text lines.
    #[default]
    Human,
    /// One JSON object per line.
    Json,
}

/// Where diagnostics are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogDestination {
    /// Standard error.
    Stderr,
    /// Appended to a file.
    File(PathBuf),
    /// Dropped.
    Off,
}

impl LogDestination {
    /// Picks the destination for one invocation.
    ///
    /// A log file always wins. Otherwise nothing is written when the output
    /// is quiet or a session display owns the terminal.
    #[must_use]
    pub fn resolve(file: Option<&Path>, owns_terminal: bool, quiet: bool) -> Self {
        match file {
            Some(path) => Self::File(path.to_path_buf()),
            None if quiet || owns_terminal => Self::Off,
            None => Self::Stderr,
        }
    }
}

/// Logging setup of one invocation.
#[derive(Debug, Clone)]
pub struct LogSettings {
    /// Line format.
    pub format: LogFormat,
    /// Number of `-v` flags.
    pub verbosity: u8,
    /// ANSI color choice for stderr.
    pub color: ColorChoice,
    /// Output target.
    pub destination: LogDestination,
}

impl LogSettings {
    /// Default filter directive.
    ///
    /// A log file was asked for explicitly, so it starts one level more
    /// verbose than stderr: `info` instead of `warn`.
    #[must_use]
    pub const fn level(&self) -> &'static str {
        let bump = matches!(self.destination, LogDestination::File(_)) as u8;
        match self.verbosity.saturating_add(bump) {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    fn ansi(&self) -> bool {
        match (&self.destination, self.color) {
            (LogDestination::Stderr, ColorChoice::Auto) => {
                std::io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none()
            }
            (LogDestination::Stderr, ColorChoice::Always) => true,
            _ => false,
        }
    }
}

/// Installs the global tracing subscriber.
///
/// Does nothing for [`LogDestination::Off`]. A second call keeps the first
/// subscriber.
///
/// # Errors
///
/// Returns an I/O error if the log file cannot be opened.
pub fn init_logging(settings: &LogSettings) -> std::io::Result<()> {
    let writer = match &settings.destination {
        LogDestination::Off => return Ok(()),
        LogDestination::Stderr => BoxMakeWriter::new(std::io::stderr),
        LogDestination::File(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            BoxMakeWriter::new(Mutex::new(file))
        }
    };

    let filter =
        EnvFilter::try_from_env(LOG_LEVEL_ENV).unwrap_or_else(|_| EnvFilter::new(settings.level()));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(settings.ansi())
        .with_target(settings.verbosity >= 2)
        .with_writer(writer);

    let _ = match settings.format {
        LogFormat::Human => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(verbosity: u8, destination: LogDestination) -> LogSettings {
        LogSettings {
            format: LogFormat::Human,
            verbosity,
            color: ColorChoice::Never,
            destination,
        }
    }

    #[test]
    fn session_terminal_silences_stderr() {
        assert_eq!(LogDestination::resolve(None, true, false), LogDestination::Off);
        assert_eq!(LogDestination::resolve(None, false, true), LogDestination::Off);
        assert_eq!(
            LogDestination::resolve(None, false, false),
            LogDestination::Stderr
        );
    }

    #[test]
    fn log_file_wins_over_terminal_and_quiet() {
        let path = Path::new("trial.log");
        assert_eq!(
            LogDestination::resolve(Some(path), true, true),
            LogDestination::File(path.to_path_buf())
        );
    }

    #[test]
    fn file_starts_one_level_more_verbose() {
        assert_eq!(settings(0, LogDestination::Stderr).level(), "warn");
        assert_eq!(settings(0, LogDestination::File("x".into())).level(), "info");
        assert_eq!(settings(2, LogDestination::Stderr).level(), "debug");
        assert_eq!(settings(2, LogDestination::File("x".into())).level(), "trace");
        assert_eq!(settings(u8::MAX, LogDestination::File("x".into())).level(), "trace");
    }

    #[test]
    fn file_output_never_uses_ansi() {
        let mut s = settings(0, LogDestination::File("x".into()));
        s.color = ColorChoice::Always;
        assert!(!s.ansi());

        s.destination = LogDestination::Stderr;
        assert!(s.ansi());
    }

    #[test]
    fn init_opens_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("arrowgrid.log");
        init_logging(&settings(1, LogDestination::File(path.clone()))).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn init_reports_unopenable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("arrowgrid.log");
        assert!(init_logging(&settings(0, LogDestination::File(path))).is_err());
    }

    #[test]
    fn off_installs_nothing() {
        init_logging(&settings(3, LogDestination::Off)).unwrap();
    }
}
