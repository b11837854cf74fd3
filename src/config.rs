//! Run configuration.
//!
//! A [`RunConfig`] is built once at startup and handed by reference to the
//! selectors. Nothing in the library reads process-wide state.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::record::SortOrder;

pub const DEFAULT_RESULT_COUNT: usize = 10;
pub const DEFAULT_BATCH_SIZE: usize = 10_000;
pub const DEFAULT_BUCKET_COUNT: usize = 10;

/// Selection strategy for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Exact Top-N via bounded batches.
    #[default]
    Batch,
    /// Uniform reservoir sample of N records.
    Sample,
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "batch" => Ok(Self::Batch),
            "sample" | "sampling" => Ok(Self::Sample),
            other => Err(Error::Configuration(format!(
                "unknown mode {other:?} (expected batch or sample)"
            ))),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Batch => "batch",
            Self::Sample => "sample",
        })
    }
}

/// Parameters for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunConfig {
    /// N: how many records to keep.
    pub result_count: usize,
    /// Records per batch (batch mode only).
    pub batch_size: usize,
    /// Histogram buckets (sample mode only).
    pub bucket_count: usize,
    pub sort_order: SortOrder,
    pub mode: Mode,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            result_count: DEFAULT_RESULT_COUNT,
            batch_size: DEFAULT_BATCH_SIZE,
            bucket_count: DEFAULT_BUCKET_COUNT,
            sort_order: SortOrder::default(),
            mode: Mode::default(),
        }
    }
}

impl RunConfig {
    pub fn with_result_count(mut self, n: usize) -> Self {
        self.result_count = n;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_bucket_count(mut self, bucket_count: usize) -> Self {
        self.bucket_count = bucket_count;
        self
    }

    pub fn with_sort_order(mut self, order: SortOrder) -> Self {
        self.sort_order = order;
        self
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Check every field the configured mode depends on.
    ///
    /// Called before any record is read.
    pub fn validate(&self) -> Result<()> {
        if self.result_count == 0 {
            return Err(Error::Configuration("result count must be > 0".into()));
        }
        match self.mode {
            Mode::Batch if self.batch_size == 0 => {
                Err(Error::Configuration("batch size must be > 0".into()))
            }
            Mode::Sample if self.bucket_count == 0 => {
                Err(Error::Configuration("bucket count must be > 0".into()))
            }
            _ => Ok(()),
        }
    }
}
