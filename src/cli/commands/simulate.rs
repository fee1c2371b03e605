//! Headless trials
//!
//! Drives the engine with a [`ManualClock`], delivering every tick at once,
//! and streams the event log as JSONL. With `--seed` the output is
//! reproducible apart from timestamps.

use crate::cli::args::SimulateArgs;
use crate::clock::ManualClock;
use crate::error::ArrowGridError;
use crate::observability::{JsonlSink, LogSink};
use crate::session::SessionSummary;
use crate::trial::{Choice, EngineParts, TrialEngine};

use super::{load_trial_config, random_source};

/// Run `--trials` complete trials without a terminal.
///
/// # Errors
///
/// Returns a config error if the configuration is invalid, or an I/O error
/// if the events file cannot be created.
pub async fn run(args: &SimulateArgs) -> Result<(), ArrowGridError> {
    let config = load_trial_config(&args.trial)?;

    let sink: Box<dyn LogSink> = match &args.events {
        Some(path) => Box::new(JsonlSink::create(path).await?),
        None => Box::new(JsonlSink::stdout()),
    };

    let clock = ManualClock::new();
    let mut parts = EngineParts::headless(Box::new(clock.clone()), random_source(args.seed));
    parts.sink = sink;
    let mut engine = TrialEngine::new(config, parts)?;

    let summary = simulate(&mut engine, &clock, args.trials, args.choice.into());
    tracing::info!(
        trials = summary.completed_trials,
        entries = summary.entries,
        "simulation finished"
    );

    if args.events.is_some() {
        println!("{}", serde_json::to_string(&summary)?);
    }
    Ok(())
}

/// Runs `trials` full trials, each expiring on its own duration and ending
/// with `choice`.
pub fn simulate(
    engine: &mut TrialEngine,
    clock: &ManualClock,
    trials: usize,
    choice: Choice,
) -> SessionSummary {
    let mut summary = SessionSummary::default();

    for trial in 0..trials {
        engine.advance();
        while let Some(timer) = clock.armed().first().copied() {
            engine.tick(timer.run);
        }
        engine.select(choice);
        let done = engine.advance();

        tracing::debug!(trial, run = %done.run, "trial completed");
        summary.completed_trials += 1;
        summary.selections.extend(done.selection);
    }

    summary.entries = engine.log().len();
    summary
}
