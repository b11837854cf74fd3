//! Exact Top-N vs a reservoir sample of the same stream.
//!
//! The batch selector returns the N largest values. The reservoir returns N
//! records chosen uniformly, so its histogram should be roughly flat across
//! arrival order.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use topn::{
    generate, run_with_rng, Format, LineSource, Mode, Reporter, RunConfig, SortOrder,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut rng = ChaCha8Rng::seed_from_u64(7);

    let mut data = Vec::new();
    generate::write_records(&mut data, 10_000, &mut rng)?;

    let reporter = Reporter::new(Format::Text, true);

    let top = RunConfig::default()
        .with_result_count(5)
        .with_batch_size(1_000)
        .with_sort_order(SortOrder::Descending);
    let outcome = run_with_rng(&top, LineSource::new(data.as_slice()), &mut rng)?;
    reporter.write_outcome(&mut std::io::stdout().lock(), &top, &outcome)?;
    println!();

    let sample = RunConfig::default()
        .with_mode(Mode::Sample)
        .with_result_count(200)
        .with_bucket_count(10);
    let outcome = run_with_rng(&sample, LineSource::new(data.as_slice()), &mut rng)?;
    if let topn::Outcome::Sample { histogram, .. } = &outcome {
        println!(
            "histogram chi2 = {:.2} over {} buckets",
            histogram.chi_squared(),
            histogram.buckets().len()
        );
    }

    Ok(())
}
