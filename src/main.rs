#![forbid(unsafe_code)]

use std::env;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context};
use clap::Parser;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use topn::config::{DEFAULT_BATCH_SIZE, DEFAULT_BUCKET_COUNT, DEFAULT_RESULT_COUNT};
use topn::{generate, Format, LineSource, Mode, Reporter, RunConfig, SortOrder};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "topn: Top-N selection and reservoir sampling over (key, value) streams",
    long_about = None,
    after_help = "EXAMPLES:\n    # Ten largest values\n    topn -i data.txt\n\n    # Five smallest, verbose\n    topn -i data.txt -n 5 -s asc -v\n\n    # Uniform sample of 100 with a 20-bucket histogram\n    topn -i data.txt --mode sample -n 100 --buckets 20\n\n    # Generate 50,000 lines of test data\n    topn -g 50000 -o data.txt"
)]
struct Cli {
    /// Input file, one `<key> <integer>` record per line.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Number of records to select.
    #[arg(short = 'n', long, default_value_t = DEFAULT_RESULT_COUNT)]
    count: usize,

    /// Sort order: desc (largest first) or asc.
    #[arg(short = 's', long, default_value = "desc")]
    order: SortOrder,

    /// Selection mode: batch (exact) or sample (reservoir).
    #[arg(long, default_value = "batch")]
    mode: Mode,

    /// Records per batch in batch mode.
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Histogram buckets in sample mode.
    #[arg(long, default_value_t = DEFAULT_BUCKET_COUNT)]
    buckets: usize,

    /// Seed the RNG for reproducible sampling and generation.
    #[arg(long)]
    seed: Option<u64>,

    /// Require keys to look like URLs (contain "http").
    #[arg(long)]
    require_url: bool,

    /// Generate a test data file with this many lines.
    #[arg(short, long, value_name = "LINES", requires = "output")]
    generate: Option<u64>,

    /// Where to write generated test data.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Show index, value and delta for every result; enable debug logs.
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn run_config(&self) -> RunConfig {
        RunConfig::default()
            .with_result_count(self.count)
            .with_batch_size(self.batch_size)
            .with_bucket_count(self.buckets)
            .with_sort_order(self.order)
            .with_mode(self.mode)
    }

    fn format(&self) -> Format {
        if self.json {
            Format::Json
        } else {
            Format::Text
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("TOPN_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "topn=debug,info"
        } else {
            "topn=info,warn"
        })
    });

    let format = env::var("TOPN_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut rng: Box<dyn RngCore> = match cli.seed {
        Some(s) => Box::new(ChaCha8Rng::seed_from_u64(s)),
        None => Box::new(rand::rng()),
    };

    if let (Some(lines), Some(path)) = (cli.generate, cli.output.as_deref()) {
        generate::generate_file(path, lines, &mut *rng)
            .with_context(|| format!("failed to generate {}", path.display()))?;
    }

    let Some(input) = cli.input.as_deref() else {
        if cli.generate.is_some() {
            return Ok(());
        }
        bail!("no input file; pass --input <FILE>");
    };

    let config = cli.run_config();
    let reporter = Reporter::new(cli.format(), cli.verbose);

    let started = Instant::now();
    let file = File::open(input)
        .with_context(|| format!("failed to open input file {}", input.display()))?;
    let source = LineSource::new(BufReader::new(file)).require_url(cli.require_url);
    info!(path = %input.display(), "loading records");

    match topn::run_with_rng(&config, source, &mut *rng) {
        Ok(outcome) => {
            info!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                "run complete"
            );
            let stdout = io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            reporter.write_outcome(&mut out, &config, &outcome)?;
            out.flush()?;
            Ok(())
        }
        Err(failure) => {
            warn!(error = %failure.error, "run failed; reporting partial state");
            let mut err = io::stderr().lock();
            reporter.write_partial(&mut err, &failure.partial)?;
            Err(failure).with_context(|| format!("while processing {}", input.display()))
        }
    }
}
