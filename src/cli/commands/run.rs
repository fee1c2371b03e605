//! Interactive terminal session
//!
//! Draws both grids on stdout and reads the subject's keys from stdin.

use tokio_util::sync::CancellationToken;

use crate::cli::args::RunArgs;
use crate::error::ArrowGridError;
use crate::observability::{JsonlSink, LogSink, NullSink};
use crate::render::TextGrid;
use crate::session::{Session, SessionParts, TerminalDisplay, spawn_stdin_reader};

use super::{load_trial_config, random_source};

/// Run trials until the subject quits, stdin closes, or a signal arrives.
///
/// # Errors
///
/// Returns a config error if the configuration is invalid, or an I/O error
/// if the events file or metrics endpoint cannot be opened.
pub async fn run(args: &RunArgs, cancel: CancellationToken) -> Result<(), ArrowGridError> {
    if let Some(port) = args.metrics_port {
        crate::observability::init_metrics(Some(port))?;
        tracing::info!(port, "Prometheus metrics endpoint started");
    }

    let config = load_trial_config(&args.trial)?;

    let sink: Box<dyn LogSink> = match &args.events {
        Some(path) => Box::new(JsonlSink::create(path).await?),
        None => Box::new(NullSink),
    };

    let left = TextGrid::new(config.grid_size);
    let right = TextGrid::new(config.grid_size);
    let session = Session::new(
        config,
        SessionParts {
            left_renderer: Box::new(left.clone()),
            right_renderer: Box::new(right.clone()),
            random: random_source(args.seed),
            sink,
            display: Box::new(TerminalDisplay::stdout(left, right)),
        },
    )?;

    let handle = session.handle();
    let reader = spawn_stdin_reader(handle.clone());
    let watcher = tokio::spawn(async move {
        cancel.cancelled().await;
        let _ = handle.shutdown();
    });

    let summary = session.run().await;
    reader.abort();
    watcher.abort();

    let picks: String = summary.selections.iter().map(|c| c.as_str()).collect();
    println!(
        "{} trial(s) completed, picks: {}",
        summary.completed_trials,
        if picks.is_empty() { "-" } else { &picks }
    );
    Ok(())
}
