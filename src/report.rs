//! Rendering results for people and machines.
//!
//! Text output puts only keys on stdout by default, one per line. Verbose
//! output adds the position, the value, and the delta from the previous line.
//! Sampling runs are listed in arrival order and followed by the histogram.

use std::io::{self, Write};

use serde::Serialize;

use crate::config::RunConfig;
use crate::histogram::Histogram;
use crate::pipeline::{Outcome, Partial};
use crate::record::{Record, SampleSlot, SortOrder};

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    #[default]
    Text,
    Json,
}

#[derive(Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
enum JsonReport<'a> {
    Batch {
        order: SortOrder,
        requested: usize,
        seen: u64,
        records: &'a [Record],
    },
    Sample {
        requested: usize,
        total_items_read: u64,
        replacements: u64,
        slots: Vec<&'a SampleSlot>,
        histogram: &'a Histogram,
    },
}

/// Formats run results.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reporter {
    verbose: bool,
    format: Format,
}

impl Reporter {
    pub fn new(format: Format, verbose: bool) -> Self {
        Self { verbose, format }
    }

    /// Write a completed run.
    pub fn write_outcome<W: Write>(
        &self,
        out: &mut W,
        config: &RunConfig,
        outcome: &Outcome,
    ) -> io::Result<()> {
        match self.format {
            Format::Json => self.write_json(out, config, outcome),
            Format::Text => match outcome {
                Outcome::Top { records, .. } => self.write_top(out, config, records),
                Outcome::Sample { sample, histogram } => {
                    self.write_slots(out, &sample.by_arrival())?;
                    self.write_histogram(out, histogram)
                }
            },
        }
    }

    /// Write whatever a failed run held, as text.
    pub fn write_partial<W: Write>(&self, out: &mut W, partial: &Partial) -> io::Result<()> {
        match partial {
            Partial::Nothing => Ok(()),
            Partial::Top(records) => {
                writeln!(out, "partial result ({} records):", records.len())?;
                self.write_records(out, records)
            }
            Partial::Sample(slots) => {
                writeln!(out, "partial reservoir ({} slots):", slots.len())?;
                let mut by_arrival: Vec<&SampleSlot> = slots.iter().collect();
                by_arrival.sort_unstable_by_key(|s| s.arrival_index);
                self.write_slots(out, &by_arrival)
            }
        }
    }

    fn write_json<W: Write>(
        &self,
        out: &mut W,
        config: &RunConfig,
        outcome: &Outcome,
    ) -> io::Result<()> {
        let report = match outcome {
            Outcome::Top { records, seen } => JsonReport::Batch {
                order: config.sort_order,
                requested: config.result_count,
                seen: *seen,
                records,
            },
            Outcome::Sample { sample, histogram } => JsonReport::Sample {
                requested: config.result_count,
                total_items_read: sample.total_items_read(),
                replacements: sample.replacements(),
                slots: sample.by_arrival(),
                histogram,
            },
        };
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)
    }

    fn write_top<W: Write>(
        &self,
        out: &mut W,
        config: &RunConfig,
        records: &[Record],
    ) -> io::Result<()> {
        if self.verbose {
            writeln!(out, "Top {} items ({})", config.result_count, config.sort_order)?;
            if records.len() < config.result_count {
                writeln!(
                    out,
                    "requested {} items, only {} available",
                    config.result_count,
                    records.len()
                )?;
            }
        }
        self.write_records(out, records)
    }

    fn write_records<W: Write>(&self, out: &mut W, records: &[Record]) -> io::Result<()> {
        let mut previous = records.first().map_or(0, Record::value);
        for (i, r) in records.iter().enumerate() {
            if self.verbose {
                writeln!(
                    out,
                    "[{i}]  key = {}, value = {}  (delta = {})",
                    r.key(),
                    r.value(),
                    r.value().wrapping_sub(previous)
                )?;
            } else {
                writeln!(out, "{}", r.key())?;
            }
            previous = r.value();
        }
        Ok(())
    }

    fn write_slots<W: Write>(&self, out: &mut W, slots: &[&SampleSlot]) -> io::Result<()> {
        for slot in slots {
            if self.verbose {
                writeln!(
                    out,
                    "[{}]  key = {}, value = {}",
                    slot.arrival_index,
                    slot.record.key(),
                    slot.record.value()
                )?;
            } else {
                writeln!(out, "{}", slot.record.key())?;
            }
        }
        Ok(())
    }

    fn write_histogram<W: Write>(&self, out: &mut W, histogram: &Histogram) -> io::Result<()> {
        writeln!(
            out,
            "Arrival histogram over {} records:",
            histogram.total_items_read()
        )?;
        let mut lower = 0;
        for bucket in histogram.buckets() {
            writeln!(
                out,
                "  [{}, {})  {}",
                lower, bucket.upper_bound, bucket.count
            )?;
            lower = bucket.upper_bound;
        }
        if self.verbose {
            writeln!(out, "  chi2 = {:.3}", histogram.chi_squared())?;
        }
        if !histogram.is_complete() {
            writeln!(
                out,
                "  UNASSIGNED arrival indices: {:?}",
                histogram.unassigned()
            )?;
        }
        Ok(())
    }
}
