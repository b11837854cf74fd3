//! `topn`: Top-N selection over unbounded `(key, value)` streams.
//!
//! Two strategies, both in bounded memory:
//! - `batch`: exact Top-N, refreshed every fixed-size batch of records.
//! - `reservoir`: uniform sample of N records in one pass (Algorithm R), with
//!   an arrival-order `histogram` to audit the sample.
//!
//! Supporting modules:
//! - `source`: the `RecordSource` trait and a line-oriented text parser.
//! - `pipeline`: runs one configured mode over one source.
//! - `report`: text/JSON rendering.
//! - `generate`: synthetic input files.

#![forbid(unsafe_code)]

pub mod batch;
pub mod config;
pub mod error;
pub mod generate;
pub mod histogram;
pub mod pipeline;
pub mod record;
pub mod report;
pub mod reservoir;
pub mod source;

pub use batch::BatchTopNSelector;
pub use config::{Mode, RunConfig};
pub use error::{Error, Result};
pub use histogram::{summarize, Bucket, Histogram};
pub use pipeline::{run, run_with_rng, Outcome, Partial, RunFailure};
pub use record::{Record, SampleSlot, SortOrder};
pub use report::{Format, Reporter};
pub use reservoir::{ReservoirSample, ReservoirSampler};
pub use source::{IterSource, LineSource, RecordSource};
