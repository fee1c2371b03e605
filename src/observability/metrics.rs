//! Metrics collection for `arrowgrid`.
//!
//! Thin typed wrappers over the `metrics` facade. Without an installed
//! recorder every call is a no-op, so the trial core records
//! unconditionally and the CLI decides whether to export.

use std::sync::atomic::{AtomicBool, Ordering};

use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::error::ArrowGridError;
use crate::trial::{Direction, Phase, Side};

/// Guard to prevent double-initialization of the metrics recorder.
static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Initializes the global metrics recorder.
///
/// When `port` is `Some`, a Prometheus HTTP listener is started on
/// `127.0.0.1:<port>`. When `None`, the recorder is installed without an
/// HTTP endpoint.
///
/// # Errors
///
/// Returns `ArrowGridError::Io` if the recorder or HTTP listener cannot be
/// installed (e.g. port already in use).
pub fn init_metrics(port: Option<u16>) -> Result<(), ArrowGridError> {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        tracing::debug!("metrics already initialized, skipping");
        return Ok(());
    }
    port.map_or_else(
        || PrometheusBuilder::new().install_recorder().map(|_| ()),
        |p| {
            PrometheusBuilder::new()
                .with_http_listener(([127, 0, 0, 1], p))
                .install()
        },
    )
    .map_err(|e| ArrowGridError::Io(std::io::Error::other(e.to_string())))?;

    describe_metrics();
    Ok(())
}

/// Registers metric descriptions with the global recorder.
fn describe_metrics() {
    describe_counter!("arrowgrid_ticks_total", "Timer ticks handled while running");
    describe_counter!(
        "arrowgrid_stimuli_total",
        "Arrows placed, by side and direction"
    );
    describe_counter!(
        "arrowgrid_depletions_total",
        "Update ticks that found a grid full"
    );
    describe_counter!("arrowgrid_trials_total", "Completed trials");
    describe_counter!("arrowgrid_stale_ticks_total", "Ticks discarded as stale");
    describe_gauge!(
        "arrowgrid_phase",
        "Current phase (0 = stopped, 1 = running, 2 = choice)"
    );
}

/// Records one handled timer tick.
pub fn record_tick() {
    counter!("arrowgrid_ticks_total").increment(1);
}

/// Records a tick discarded because its run had ended.
pub fn record_stale_tick() {
    counter!("arrowgrid_stale_ticks_total").increment(1);
}

/// Records one placed arrow.
pub fn record_stimulus(side: Side, direction: Direction) {
    counter!(
        "arrowgrid_stimuli_total",
        "side" => side.as_str(),
        "direction" => direction.as_str()
    )
    .increment(1);
}

/// Records one depleted update on `side`.
pub fn record_depletion(side: Side) {
    counter!("arrowgrid_depletions_total", "side" => side.as_str()).increment(1);
}

/// Records a completed trial.
pub fn record_trial() {
    counter!("arrowgrid_trials_total").increment(1);
}

/// Publishes the current phase.
pub fn set_phase(phase: Phase) {
    let value = match phase {
        Phase::Stopped => 0.0,
        Phase::Running => 1.0,
        Phase::Choice => 2.0,
    };
    gauge!("arrowgrid_phase").set(value);
}
