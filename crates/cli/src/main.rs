use std::path::PathBuf;
use std::process;

use clap::Parser;

use meanfilter_core::image_io::domain::image_writer::OutputFormat;
use meanfilter_core::image_io::infrastructure::image_file_reader::ImageFileReader;
use meanfilter_core::image_io::infrastructure::image_file_writer::ImageFileWriter;
use meanfilter_core::partitioning::infrastructure::partitioner_factory::PartitionStrategy;
use meanfilter_core::pipeline::infrastructure::threaded_region_executor::ThreadedRegionExecutor;
use meanfilter_core::pipeline::mean_filter_use_case::{FilterConfig, MeanFilterUseCase};
use meanfilter_core::pipeline::pipeline_logger::LogPipelineLogger;
use meanfilter_core::pipeline::region_executor::{ProgressFn, RunConfig};
use meanfilter_core::shared::constants::{DEFAULT_KERNEL_SIZE, DEFAULT_OUTPUT_PATH};

/// Smooth an image with a parallel box (mean) filter.
#[derive(Parser)]
#[command(name = "mean-filter")]
struct Cli {
    /// Input image file (JPEG, PNG, ...).
    input: PathBuf,

    /// Number of workers (image regions) to split the work into.
    #[arg(allow_negative_numbers = true)]
    workers: i64,

    /// Side length of the averaging square (must be a positive odd integer).
    #[arg(long, short = 'k', default_value_t = DEFAULT_KERNEL_SIZE, allow_negative_numbers = true)]
    kernel_size: i64,

    /// Output file.
    #[arg(long, short = 'o', default_value = DEFAULT_OUTPUT_PATH)]
    output: PathBuf,

    /// How to split the image: rows or grid.
    #[arg(long, default_value = "rows")]
    partition: PartitionStrategy,

    /// Output encoding: jpeg or png.
    #[arg(long, default_value = "jpeg")]
    format: OutputFormat,

    /// Maximum OS threads in the pool (defaults to available cores).
    #[arg(long)]
    threads: Option<usize>,

    /// Print per-region progress to stderr.
    #[arg(long)]
    progress: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let executor = match cli.threads {
        Some(n) => ThreadedRegionExecutor::new().with_max_threads(n),
        None => ThreadedRegionExecutor::new(),
    };

    let mut run_config = RunConfig::default();
    if cli.progress {
        let progress: ProgressFn = Box::new(|done, total| {
            eprint!("\rFiltered region {done}/{total}");
            if done == total {
                eprintln!();
            }
            true
        });
        run_config = run_config.with_progress(progress);
    }

    let config = FilterConfig {
        kernel_size: cli.kernel_size,
        workers: clamp_workers(cli.workers),
        partition: cli.partition,
        format: cli.format,
        run: run_config,
    };

    let mut use_case = MeanFilterUseCase::new(
        Box::new(ImageFileReader::new()),
        Box::new(ImageFileWriter::new()),
        Box::new(executor),
        Box::new(LogPipelineLogger::new()),
    );
    use_case.execute(&cli.input, &cli.output, &config)?;
    Ok(())
}

fn clamp_workers(requested: i64) -> usize {
    if requested < 1 {
        log::warn!("Worker count {requested} is not positive, using 1");
        return 1;
    }
    usize::try_from(requested).unwrap_or(usize::MAX)
}
