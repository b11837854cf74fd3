//! One run: validate the config, feed a source to exactly one selector.

use std::time::Instant;

use rand::Rng;
use tracing::info;

use crate::batch::BatchTopNSelector;
use crate::config::{Mode, RunConfig};
use crate::error::Error;
use crate::histogram::{self, Histogram};
use crate::record::{Record, SampleSlot};
use crate::reservoir::{ReservoirSample, ReservoirSampler};
use crate::source::RecordSource;

/// Result of a completed run.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Exact Top-N, best first.
    Top { records: Vec<Record>, seen: u64 },
    /// Uniform sample and its arrival-order histogram.
    Sample {
        sample: ReservoirSample,
        histogram: Histogram,
    },
}

/// What a selector held when the run was cut short.
#[derive(Debug, Clone, Default)]
pub enum Partial {
    #[default]
    Nothing,
    Top(Vec<Record>),
    Sample(Vec<SampleSlot>),
}

/// A failed run, with the selector state at the point of failure.
#[derive(Debug, thiserror::Error)]
#[error("selection aborted")]
pub struct RunFailure {
    #[source]
    pub error: Error,
    pub partial: Partial,
}

impl RunFailure {
    fn bare(error: Error) -> Self {
        Self {
            error,
            partial: Partial::Nothing,
        }
    }
}

/// Run `config.mode` over `source` using the thread RNG.
pub fn run<S: RecordSource>(config: &RunConfig, source: S) -> Result<Outcome, RunFailure> {
    let mut rng = rand::rng();
    run_with_rng(config, source, &mut rng)
}

/// [`run`] with a caller-supplied RNG (only used in sample mode).
pub fn run_with_rng<S, R>(
    config: &RunConfig,
    source: S,
    rng: &mut R,
) -> Result<Outcome, RunFailure>
where
    S: RecordSource,
    R: Rng + ?Sized,
{
    config.validate().map_err(RunFailure::bare)?;
    info!(
        mode = %config.mode,
        n = config.result_count,
        order = %config.sort_order,
        "starting selection"
    );
    match config.mode {
        Mode::Batch => run_batch(config, source),
        Mode::Sample => run_sample(config, source, rng),
    }
}

fn run_batch<S: RecordSource>(config: &RunConfig, source: S) -> Result<Outcome, RunFailure> {
    let started = Instant::now();
    let mut selector = BatchTopNSelector::from_config(config).map_err(RunFailure::bare)?;
    if let Err(error) = selector.consume(source) {
        return Err(RunFailure {
            error,
            partial: Partial::Top(selector.finalize()),
        });
    }
    let seen = selector.seen();
    info!(
        seen,
        batches = selector.batches(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "selected top records"
    );
    let kept = selector.current().len();
    if kept < config.result_count {
        info!(
            requested = config.result_count,
            available = kept,
            "fewer records than requested"
        );
    }
    Ok(Outcome::Top {
        records: selector.finalize(),
        seen,
    })
}

fn run_sample<S, R>(config: &RunConfig, source: S, rng: &mut R) -> Result<Outcome, RunFailure>
where
    S: RecordSource,
    R: Rng + ?Sized,
{
    let started = Instant::now();
    let mut sampler = ReservoirSampler::from_config(config).map_err(RunFailure::bare)?;
    if let Err(error) = sampler.consume_with_rng(source, rng) {
        return Err(RunFailure {
            error,
            partial: Partial::Sample(sampler.samples().to_vec()),
        });
    }

    let partial = if sampler.is_full() {
        Partial::Nothing
    } else {
        Partial::Sample(sampler.samples().to_vec())
    };
    let sample = sampler
        .finish()
        .map_err(|error| RunFailure { error, partial })?;
    info!(
        total_items_read = sample.total_items_read(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "sampled records"
    );

    let histogram = histogram::summarize(
        sample.slots(),
        sample.total_items_read(),
        config.bucket_count,
    )
    .map_err(RunFailure::bare)?;
    Ok(Outcome::Sample { sample, histogram })
}
