//! CLI argument definitions
//!
//! All Clap derive structs for `arrowgrid` command-line parsing.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::config::{ConfigOverrides, parse_duration};
use crate::observability::LogFormat;
use crate::trial::Choice;

// ============================================================================
// Root CLI
// ============================================================================

/// Timed two-grid arrow discrimination trials.
#[derive(Parser, Debug)]
#[command(name = "arrowgrid", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-error output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "ARROWGRID_COLOR")]
    pub color: ColorChoice,

    /// Append diagnostics to this file instead of stderr.
    #[arg(long, global = true, env = "ARROWGRID_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Diagnostic log format.
    #[arg(long, default_value = "human", global = true)]
    pub log_format: LogFormat,
}

impl Cli {
    /// Returns `true` if the command redraws the terminal in place.
    #[must_use]
    pub const fn owns_terminal(&self) -> bool {
        matches!(self.command, Commands::Run(_))
    }
}

// ============================================================================
// Commands
// ============================================================================

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run interactive trials in the terminal.
    Run(RunArgs),

    /// Run headless trials and stream the event log as JSONL.
    Simulate(SimulateArgs),

    /// Validate configuration files.
    Validate(ValidateArgs),

    /// Generate shell completion scripts.
    Completions(CompletionsArgs),

    /// Display version information.
    Version(VersionArgs),
}

/// Trial configuration source and per-field overrides.
#[derive(Args, Debug, Clone, Default)]
pub struct TrialArgs {
    /// Path to YAML configuration file.
    #[arg(short, long, env = "ARROWGRID_CONFIG")]
    pub config: Option<PathBuf>,

    /// Grid edge length.
    #[arg(long)]
    pub grid_size: Option<usize>,

    /// Trial length in frames.
    #[arg(long)]
    pub duration: Option<u32>,

    /// Timer period (e.g. `500ms`, `1s`).
    #[arg(long, value_parser = parse_interval)]
    pub interval: Option<Duration>,

    /// Bias probability of the left grid.
    #[arg(long)]
    pub left_probability: Option<f64>,

    /// Bias probability of the right grid.
    #[arg(long)]
    pub right_probability: Option<f64>,
}

impl TrialArgs {
    /// Collects the override flags.
    #[must_use]
    pub const fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            grid_size: self.grid_size,
            duration_frames: self.duration,
            tick_interval: self.interval,
            left_probability: self.left_probability,
            right_probability: self.right_probability,
        }
    }
}

fn parse_interval(s: &str) -> Result<Duration, String> {
    parse_duration(s).map_err(|e| e.to_string())
}

/// Arguments for `run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Trial configuration.
    #[command(flatten)]
    pub trial: TrialArgs,

    /// Seed for reproducible stimulus placement.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write the event log as JSONL to this file.
    #[arg(long, env = "ARROWGRID_EVENTS_FILE")]
    pub events: Option<PathBuf>,

    /// Expose Prometheus metrics on this port.
    #[arg(long, env = "ARROWGRID_METRICS_PORT")]
    pub metrics_port: Option<u16>,
}

/// Arguments for `simulate`.
#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Trial configuration.
    #[command(flatten)]
    pub trial: TrialArgs,

    /// Number of trials to run.
    #[arg(short = 'n', long, default_value_t = 1)]
    pub trials: usize,

    /// Seed for reproducible stimulus placement.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Option picked at the end of every trial.
    #[arg(long, default_value = "a")]
    pub choice: ChoiceArg,

    /// Write the event log to this file instead of stdout.
    #[arg(long)]
    pub events: Option<PathBuf>,
}

/// Arguments for `validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Configuration files to validate.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,

    /// Enable strict validation (warnings become errors).
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for shell completion generation.
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell for completion script.
    pub shell: clap_complete::Shell,
}

/// Arguments for version display.
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// CLI-Local Enums
// ============================================================================

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal support.
    #[default]
    Auto,
    /// Always use color.
    Always,
    /// Never use color.
    Never,
}

/// Output format for structured output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output.
    Json,
}

/// Answer option on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ChoiceArg {
    /// Left grid.
    A,
    /// Right grid.
    B,
}

impl From<ChoiceArg> for Choice {
    fn from(arg: ChoiceArg) -> Self {
        match arg {
            ChoiceArg::A => Self::A,
            ChoiceArg::B => Self::B,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_with_overrides() {
        let cli = Cli::try_parse_from([
            "arrowgrid",
            "run",
            "--grid-size",
            "7",
            "--interval",
            "250ms",
            "--left-probability",
            "0.3",
        ])
        .unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("Expected RunArgs");
        };
        let overrides = args.trial.overrides();
        assert_eq!(overrides.grid_size, Some(7));
        assert_eq!(overrides.tick_interval, Some(Duration::from_millis(250)));
        assert_eq!(overrides.left_probability, Some(0.3));
        assert_eq!(overrides.right_probability, None);
    }

    #[test]
    fn test_bad_interval_rejected() {
        let result = Cli::try_parse_from(["arrowgrid", "run", "--interval", "soon"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_simulate_defaults() {
        let cli = Cli::try_parse_from(["arrowgrid", "simulate"]).unwrap();
        let Commands::Simulate(args) = cli.command else {
            panic!("Expected SimulateArgs");
        };
        assert_eq!(args.trials, 1);
        assert_eq!(args.choice, ChoiceArg::A);
        assert!(args.seed.is_none());
    }

    #[test]
    fn test_help_output() {
        let result = Cli::try_parse_from(["arrowgrid", "--help"]);
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_version_output() {
        let result = Cli::try_parse_from(["arrowgrid", "--version"]);
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_color_choices_parse() {
        for variant in ["auto", "always", "never"] {
            let cli = Cli::try_parse_from(["arrowgrid", "--color", variant, "version"]);
            assert!(cli.is_ok(), "Failed to parse color={variant}");
        }
    }

    #[test]
    fn test_validate_requires_files() {
        let result = Cli::try_parse_from(["arrowgrid", "validate"]);
        assert!(result.is_err(), "Expected error for missing files");
    }

    #[test]
    fn test_completions_shells_parse() {
        for shell in ["bash", "zsh", "fish", "powershell", "elvish"] {
            let cli = Cli::try_parse_from(["arrowgrid", "completions", shell]);
            assert!(cli.is_ok(), "Failed to parse shell={shell}");
        }
    }

    #[test]
    fn test_verbose_count() {
        let cli = Cli::try_parse_from(["arrowgrid", "-vvv", "simulate"]).unwrap();
        assert_eq!(cli.verbose, 3);
    }

    #[test]
    fn test_log_flags_are_global() {
        let cli = Cli::try_parse_from([
            "arrowgrid",
            "simulate",
            "--log-file",
            "trial.log",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.log_file, Some(PathBuf::from("trial.log")));
        assert_eq!(cli.log_format, LogFormat::Json);
        assert!(!cli.owns_terminal());
    }

    #[test]
    fn test_run_owns_terminal() {
        let cli = Cli::try_parse_from(["arrowgrid", "run"]).unwrap();
        assert!(cli.owns_terminal());
    }

    #[test]
    fn test_choice_maps_to_option() {
        assert_eq!(Choice::from(ChoiceArg::A), Choice::A);
        assert_eq!(Choice::from(ChoiceArg::B), Choice::B);
    }
}
