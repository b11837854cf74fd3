//! Reservoir sampling.
//!
//! Keeps a uniform sample of `k` records from a stream of unknown length in
//! one pass and `O(k)` memory, using **Algorithm R** (Vitter, 1985):
//!
//! 1. The first `k` records fill slots `0..k`.
//! 2. Record `i` (zero-based, `i >= k`) draws `r` uniformly from `[0, i]`
//!    *inclusive*. If `r < k` it replaces slot `r`, otherwise it is dropped.
//!
//! After `i + 1` records every one of them is in the reservoir with
//! probability `k / (i + 1)`. Drawing from `[0, i)` instead over-weights early
//! records; the inclusive upper bound is load-bearing.
//!
//! Each slot remembers the arrival index of its record so the final sample can
//! be audited with [`crate::histogram`].
//!
//! ## References
//!
//! - Vitter (1985): *Random Sampling with a Reservoir*, "Algorithm R".
//!
//! Notes:
//! - `*_with_rng` entrypoints exist for deterministic testing/benchmarking.

use rand::distr::{Distribution, Uniform};
use rand::Rng;
use tracing::{debug, info};

use crate::config::RunConfig;
use crate::error::{Error, Result};
use crate::record::{Record, SampleSlot};
use crate::source::RecordSource;

/// Draw uniformly from `[0, high]`.
///
/// Arrival indices are `u64`, so `high` routinely exceeds `u32::MAX` on long
/// streams. `Uniform` samples with a widening multiply and a rejection zone
/// sized to the range, which is exact for every `u64` bound. Splicing two
/// narrower draws together and reducing modulo the range would not be.
#[inline]
fn draw_inclusive<R: Rng + ?Sized>(rng: &mut R, high: u64) -> u64 {
    // Construction only fails when low > high, which 0..=high never is.
    Uniform::new_inclusive(0, high).map_or(0, |dist| dist.sample(rng))
}

/// Single-pass uniform sampler of `k` records.
#[derive(Debug, Clone)]
pub struct ReservoirSampler {
    k: usize,
    seen: u64,
    slots: Vec<SampleSlot>,
    replacements: u64,
}

impl ReservoirSampler {
    /// Create a sampler that keeps `k` records.
    ///
    /// If `k == 0`, every record is discarded and [`finish`](Self::finish)
    /// trivially succeeds; use [`from_config`](Self::from_config) to reject it.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            seen: 0,
            slots: Vec::with_capacity(k),
            replacements: 0,
        }
    }

    /// Create a sampler from a validated config.
    pub fn from_config(config: &RunConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config.result_count))
    }

    /// Offer the next record in the stream.
    #[inline]
    pub fn add(&mut self, record: Record) {
        let mut rng = rand::rng();
        self.add_with_rng(record, &mut rng);
    }

    /// Offer the next record in the stream, using a caller-supplied RNG.
    #[inline]
    pub fn add_with_rng<R: Rng + ?Sized>(&mut self, record: Record, rng: &mut R) {
        let i = self.seen;
        self.seen += 1;

        if self.k == 0 {
            return;
        }

        if self.slots.len() < self.k {
            self.slots.push(SampleSlot {
                record,
                arrival_index: i,
            });
            if self.slots.len() == self.k {
                debug!(k = self.k, "reservoir filled");
            }
            return;
        }

        let r = draw_inclusive(rng, i);
        if r < self.k as u64 {
            // Evicted record is dropped here.
            self.slots[r as usize] = SampleSlot {
                record,
                arrival_index: i,
            };
            self.replacements += 1;
        }
    }

    /// Drain `source` into the reservoir.
    ///
    /// On a source error the reservoir keeps whatever it held, so it can still
    /// be inspected for diagnostics.
    pub fn consume_with_rng<S, R>(&mut self, mut source: S, rng: &mut R) -> Result<()>
    where
        S: RecordSource,
        R: Rng + ?Sized,
    {
        while let Some(record) = source.next_record()? {
            self.add_with_rng(record, rng);
        }
        Ok(())
    }

    /// Close the run.
    ///
    /// Fails with [`Error::InsufficientStream`] if fewer than `k` records
    /// arrived.
    pub fn finish(self) -> Result<ReservoirSample> {
        if self.slots.len() < self.k {
            return Err(Error::InsufficientStream {
                required: self.k,
                available: self.seen,
            });
        }
        info!(
            k = self.k,
            total_items_read = self.seen,
            replacements = self.replacements,
            "reservoir complete"
        );
        Ok(ReservoirSample {
            slots: self.slots,
            total_items_read: self.seen,
            replacements: self.replacements,
        })
    }

    /// Drain `source` and close the run.
    pub fn run<S: RecordSource>(self, source: S) -> Result<ReservoirSample> {
        let mut rng = rand::rng();
        self.run_with_rng(source, &mut rng)
    }

    /// [`run`](Self::run) with a caller-supplied RNG.
    pub fn run_with_rng<S, R>(mut self, source: S, rng: &mut R) -> Result<ReservoirSample>
    where
        S: RecordSource,
        R: Rng + ?Sized,
    {
        self.consume_with_rng(source, rng)?;
        self.finish()
    }

    /// Current slots, in reservoir position order.
    pub fn samples(&self) -> &[SampleSlot] {
        &self.slots
    }

    /// True once the first `k` records have arrived.
    pub fn is_full(&self) -> bool {
        self.slots.len() == self.k
    }

    /// Number of records observed so far.
    pub fn seen(&self) -> u64 {
        self.seen
    }

    /// Number of times a full reservoir slot was overwritten.
    pub fn replacements(&self) -> u64 {
        self.replacements
    }
}

/// The outcome of a completed sampling run.
#[derive(Debug, Clone)]
pub struct ReservoirSample {
    slots: Vec<SampleSlot>,
    total_items_read: u64,
    replacements: u64,
}

impl ReservoirSample {
    /// Exactly `k` slots, in reservoir position order.
    pub fn slots(&self) -> &[SampleSlot] {
        &self.slots
    }

    /// Slots ordered by arrival index, for display.
    pub fn by_arrival(&self) -> Vec<&SampleSlot> {
        let mut out: Vec<&SampleSlot> = self.slots.iter().collect();
        out.sort_unstable_by_key(|s| s.arrival_index);
        out
    }

    /// Length of the stream, i.e. last arrival index + 1.
    pub fn total_items_read(&self) -> u64 {
        self.total_items_read
    }

    /// Informational: how many evictions happened.
    pub fn replacements(&self) -> u64 {
        self.replacements
    }
}
