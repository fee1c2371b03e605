//! `arrowgrid` - timed two-grid arrow discrimination trials

use clap::Parser;
use tokio_util::sync::CancellationToken;

use arrowgrid::cli::args::Cli;
use arrowgrid::cli::commands;
use arrowgrid::error::ExitCode;
use arrowgrid::observability::{LogDestination, LogSettings, init_logging};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let logging = LogSettings {
        format: cli.log_format,
        verbosity: cli.verbose,
        color: cli.color,
        destination: LogDestination::resolve(
            cli.log_file.as_deref(),
            cli.owns_terminal(),
            cli.quiet,
        ),
    };
    if let Err(e) = init_logging(&logging) {
        eprintln!("error: cannot open log file: {e}");
        std::process::exit(ExitCode::IO_ERROR);
    }

    let cancel = CancellationToken::new();

    // First signal ends the session; a second one exits immediately.
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        let Ok(mut sigterm) =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        else {
            tracing::warn!("failed to register SIGTERM handler");
            return;
        };

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }

        eprintln!("\nShutting down... (press Ctrl+C again to force)");
        signal_cancel.cancel();

        tokio::select! {
            _ = tokio::signal::ctrl_c() => std::process::exit(ExitCode::INTERRUPTED),
            _ = sigterm.recv() => std::process::exit(ExitCode::TERMINATED),
        }
    });

    let result = commands::dispatch(cli, cancel).await;

    match result {
        Ok(()) => std::process::exit(ExitCode::SUCCESS),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
