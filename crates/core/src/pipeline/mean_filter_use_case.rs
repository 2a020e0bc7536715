use std::path::Path;
use std::time::Instant;

use crate::filtering::infrastructure::box_mean_filter::BoxMeanFilter;
use crate::image_io::domain::image_reader::ImageReader;
use crate::image_io::domain::image_writer::{ImageWriter, OutputFormat};
use crate::partitioning::infrastructure::partitioner_factory::{
    create_partitioner, PartitionStrategy,
};
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::pipeline::region_executor::{RegionExecutor, RunConfig};
use crate::shared::constants::DEFAULT_KERNEL_SIZE;
use crate::shared::filter_error::FilterError;
use crate::shared::kernel_size::KernelSize;
use crate::shared::pixel_buffer::PixelBuffer;

/// Configuration for one filter invocation.
pub struct FilterConfig {
    /// Side length of the averaging square; must be a positive odd number.
    pub kernel_size: i64,
    /// Requested worker count. 0 is treated as 1, and partitioners clamp
    /// counts the image cannot use.
    pub workers: usize,
    pub partition: PartitionStrategy,
    pub format: OutputFormat,
    pub run: RunConfig,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            kernel_size: DEFAULT_KERNEL_SIZE,
            workers: 1,
            partition: PartitionStrategy::default(),
            format: OutputFormat::default(),
            run: RunConfig::default(),
        }
    }
}

/// Single-image smoothing pipeline: validate → read → partition → filter → write.
///
/// Nothing is written unless every region was filtered successfully.
pub struct MeanFilterUseCase {
    reader: Box<dyn ImageReader>,
    writer: Box<dyn ImageWriter>,
    executor: Box<dyn RegionExecutor>,
    logger: Box<dyn PipelineLogger>,
}

impl MeanFilterUseCase {
    pub fn new(
        reader: Box<dyn ImageReader>,
        writer: Box<dyn ImageWriter>,
        executor: Box<dyn RegionExecutor>,
        logger: Box<dyn PipelineLogger>,
    ) -> Self {
        Self {
            reader,
            writer,
            executor,
            logger,
        }
    }

    /// Reads `input`, applies the mean filter, and writes the result to
    /// `output`. The kernel size is validated before any file is touched.
    pub fn execute(
        &mut self,
        input: &Path,
        output: &Path,
        config: &FilterConfig,
    ) -> Result<(), FilterError> {
        let kernel = KernelSize::new(config.kernel_size)?;

        let started = Instant::now();
        let source = self.reader.read(input)?;
        self.logger.timing("decode", elapsed_ms(started));

        let filtered = self.filter(&source, kernel, config)?;

        let started = Instant::now();
        self.writer.write(output, &filtered, config.format)?;
        self.logger.timing("encode", elapsed_ms(started));

        self.logger.info(&format!("Output written to {}", output.display()));
        self.logger.summary();
        Ok(())
    }

    /// Filters an in-memory buffer into a freshly allocated one.
    pub fn filter(
        &mut self,
        source: &PixelBuffer,
        kernel: KernelSize,
        config: &FilterConfig,
    ) -> Result<PixelBuffer, FilterError> {
        let (width, height) = source.dimensions();

        let started = Instant::now();
        let regions = create_partitioner(config.partition).partition(width, height, config.workers);
        self.logger.timing("partition", elapsed_ms(started));

        if regions.len() < config.workers {
            log::info!(
                "Using {} of {} requested workers for a {width}x{height} image",
                regions.len(),
                config.workers
            );
        }
        self.logger.metric("regions", regions.len() as f64);
        self.logger
            .metric("megapixels", (width as f64 * height as f64) / 1_000_000.0);

        let mut destination = source.blank_like();
        let started = Instant::now();
        self.executor.execute(
            source,
            &mut destination,
            &regions,
            &BoxMeanFilter::new(kernel),
            &config.run,
        )?;
        self.logger.timing("filter", elapsed_ms(started));

        Ok(destination)
    }
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filtering::domain::neighborhood_filter::NeighborhoodFilter;
    use crate::image_io::infrastructure::image_file_reader::ImageFileReader;
    use crate::image_io::infrastructure::image_file_writer::ImageFileWriter;
    use crate::pipeline::infrastructure::threaded_region_executor::ThreadedRegionExecutor;
    use crate::pipeline::pipeline_logger::NullPipelineLogger;
    use crate::shared::region::Region;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    // --- Stubs ---

    struct StubReader {
        buffer: Option<PixelBuffer>,
        reads: Arc<Mutex<usize>>,
    }

    impl StubReader {
        fn new(buffer: PixelBuffer) -> Self {
            Self {
                buffer: Some(buffer),
                reads: Arc::new(Mutex::new(0)),
            }
        }

        fn failing() -> Self {
            Self {
                buffer: None,
                reads: Arc::new(Mutex::new(0)),
            }
        }
    }

    impl ImageReader for StubReader {
        fn read(&self, path: &Path) -> Result<PixelBuffer, FilterError> {
            *self.reads.lock().unwrap() += 1;
            self.buffer.clone().ok_or_else(|| FilterError::Decode {
                path: path.to_path_buf(),
                source: image::ImageError::IoError(std::io::Error::from(
                    std::io::ErrorKind::NotFound,
                )),
            })
        }
    }

    type Written = Arc<Mutex<Vec<(PathBuf, PixelBuffer, OutputFormat)>>>;

    struct StubWriter {
        written: Written,
    }

    impl StubWriter {
        fn new() -> Self {
            Self {
                written: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    impl ImageWriter for StubWriter {
        fn write(
            &self,
            path: &Path,
            buffer: &PixelBuffer,
            format: OutputFormat,
        ) -> Result<(), FilterError> {
            self.written
                .lock()
                .unwrap()
                .push((path.to_path_buf(), buffer.clone(), format));
            Ok(())
        }
    }

    /// Delegates to the threaded executor and records each region list.
    struct RecordingExecutor {
        inner: ThreadedRegionExecutor,
        calls: Arc<Mutex<Vec<Vec<Region>>>>,
    }

    impl RecordingExecutor {
        fn new() -> Self {
            Self {
                inner: ThreadedRegionExecutor::new(),
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    impl RegionExecutor for RecordingExecutor {
        fn execute(
            &self,
            source: &PixelBuffer,
            destination: &mut PixelBuffer,
            regions: &[Region],
            filter: &dyn NeighborhoodFilter,
            config: &RunConfig,
        ) -> Result<(), FilterError> {
            self.calls.lock().unwrap().push(regions.to_vec());
            self.inner
                .execute(source, destination, regions, filter, config)
        }
    }

    struct FailingExecutor;

    impl RegionExecutor for FailingExecutor {
        fn execute(
            &self,
            _source: &PixelBuffer,
            _destination: &mut PixelBuffer,
            regions: &[Region],
            _filter: &dyn NeighborhoodFilter,
            _config: &RunConfig,
        ) -> Result<(), FilterError> {
            Err(FilterError::WorkerFault {
                region: regions[0],
                message: "boom".into(),
            })
        }
    }

    // --- Helpers ---

    fn red_dot() -> PixelBuffer {
        let mut buffer = PixelBuffer::blank(4, 4);
        buffer.set_pixel(1, 1, [255, 0, 0]);
        buffer
    }

    fn config(kernel_size: i64, workers: usize) -> FilterConfig {
        FilterConfig {
            kernel_size,
            workers,
            ..FilterConfig::default()
        }
    }

    // --- Tests ---

    #[test]
    fn test_default_config() {
        let config = FilterConfig::default();
        assert_eq!(config.kernel_size, 7);
        assert_eq!(config.format, OutputFormat::Jpeg);
        assert_eq!(config.partition, PartitionStrategy::RowStrips);
    }

    #[test]
    fn test_filters_and_writes_jpeg() {
        let writer = StubWriter::new();
        let written = writer.written.clone();
        let mut uc = MeanFilterUseCase::new(
            Box::new(StubReader::new(red_dot())),
            Box::new(writer),
            Box::new(ThreadedRegionExecutor::new()),
            Box::new(NullPipelineLogger),
        );

        uc.execute(Path::new("in.png"), Path::new("out.jpg"), &config(3, 2))
            .unwrap();

        let written = written.lock().unwrap();
        assert_eq!(written.len(), 1);
        let (path, buffer, format) = &written[0];
        assert_eq!(path, Path::new("out.jpg"));
        assert_eq!(*format, OutputFormat::Jpeg);
        assert_eq!(buffer.pixel(1, 1), [28, 0, 0]);
        assert_eq!(buffer.pixel(0, 0), [63, 0, 0]);
    }

    #[test]
    fn test_one_region_per_worker() {
        let executor = RecordingExecutor::new();
        let calls = executor.calls.clone();
        let mut uc = MeanFilterUseCase::new(
            Box::new(StubReader::new(PixelBuffer::blank(10, 10))),
            Box::new(StubWriter::new()),
            Box::new(executor),
            Box::new(NullPipelineLogger),
        );

        uc.execute(Path::new("in.png"), Path::new("out.jpg"), &config(3, 4))
            .unwrap();

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].len(), 4);
        Region::verify_cover(&calls[0], 10, 10).unwrap();
    }

    #[test]
    fn test_worker_count_clamped_to_rows() {
        let executor = RecordingExecutor::new();
        let calls = executor.calls.clone();
        let mut uc = MeanFilterUseCase::new(
            Box::new(StubReader::new(PixelBuffer::blank(10, 3))),
            Box::new(StubWriter::new()),
            Box::new(executor),
            Box::new(NullPipelineLogger),
        );

        uc.execute(Path::new("in.png"), Path::new("out.jpg"), &config(3, 64))
            .unwrap();
        assert_eq!(calls.lock().unwrap()[0].len(), 3);
    }

    #[test]
    fn test_invalid_kernel_rejected_before_reading() {
        let reader = StubReader::new(red_dot());
        let reads = reader.reads.clone();
        let writer = StubWriter::new();
        let written = writer.written.clone();
        let mut uc = MeanFilterUseCase::new(
            Box::new(reader),
            Box::new(writer),
            Box::new(ThreadedRegionExecutor::new()),
            Box::new(NullPipelineLogger),
        );

        let err = uc
            .execute(Path::new("in.png"), Path::new("out.jpg"), &config(4, 2))
            .unwrap_err();

        assert!(matches!(err, FilterError::InvalidKernelSize(4)));
        assert_eq!(*reads.lock().unwrap(), 0);
        assert!(written.lock().unwrap().is_empty());
    }

    #[test]
    fn test_decode_failure_dispatches_nothing() {
        let executor = RecordingExecutor::new();
        let calls = executor.calls.clone();
        let writer = StubWriter::new();
        let written = writer.written.clone();
        let mut uc = MeanFilterUseCase::new(
            Box::new(StubReader::failing()),
            Box::new(writer),
            Box::new(executor),
            Box::new(NullPipelineLogger),
        );

        let err = uc
            .execute(Path::new("missing.png"), Path::new("out.jpg"), &config(3, 2))
            .unwrap_err();

        assert_eq!(err.stage(), "decode");
        assert!(calls.lock().unwrap().is_empty());
        assert!(written.lock().unwrap().is_empty());
    }

    #[test]
    fn test_worker_fault_writes_nothing() {
        let writer = StubWriter::new();
        let written = writer.written.clone();
        let mut uc = MeanFilterUseCase::new(
            Box::new(StubReader::new(red_dot())),
            Box::new(writer),
            Box::new(FailingExecutor),
            Box::new(NullPipelineLogger),
        );

        let err = uc
            .execute(Path::new("in.png"), Path::new("out.jpg"), &config(3, 2))
            .unwrap_err();

        assert_eq!(err.stage(), "processing");
        assert!(written.lock().unwrap().is_empty());
    }

    #[test]
    fn test_output_format_passed_to_writer() {
        let writer = StubWriter::new();
        let written = writer.written.clone();
        let mut uc = MeanFilterUseCase::new(
            Box::new(StubReader::new(red_dot())),
            Box::new(writer),
            Box::new(ThreadedRegionExecutor::new()),
            Box::new(NullPipelineLogger),
        );
        let config = FilterConfig {
            format: OutputFormat::Png,
            ..config(3, 1)
        };

        uc.execute(Path::new("in.jpg"), Path::new("out.png"), &config)
            .unwrap();
        assert_eq!(written.lock().unwrap()[0].2, OutputFormat::Png);
    }

    #[test]
    fn test_filter_in_memory_grid_matches_strips() {
        let source = red_dot();
        let mut uc = MeanFilterUseCase::new(
            Box::new(StubReader::failing()),
            Box::new(StubWriter::new()),
            Box::new(ThreadedRegionExecutor::new()),
            Box::new(NullPipelineLogger),
        );
        let kernel = KernelSize::new(3).unwrap();
        let strips = uc.filter(&source, kernel, &config(3, 4)).unwrap();
        let grid_config = FilterConfig {
            partition: PartitionStrategy::Grid,
            ..config(3, 4)
        };
        let grid = uc.filter(&source, kernel, &grid_config).unwrap();
        assert_eq!(strips, grid);
    }

    #[test]
    fn test_end_to_end_with_files() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input.png");
        let output = dir.path().join("out/filtered.png");
        let mut img = image::RgbImage::new(4, 4);
        img.put_pixel(1, 1, image::Rgb([255, 0, 0]));
        img.save(&input).unwrap();

        let mut uc = MeanFilterUseCase::new(
            Box::new(ImageFileReader::new()),
            Box::new(ImageFileWriter::new()),
            Box::new(ThreadedRegionExecutor::new()),
            Box::new(NullPipelineLogger),
        );
        let config = FilterConfig {
            format: OutputFormat::Png,
            ..config(3, 2)
        };
        uc.execute(&input, &output, &config).unwrap();

        let result = image::open(&output).unwrap().to_rgb8();
        assert_eq!(result.get_pixel(1, 1).0, [28, 0, 0]);
        assert_eq!(result.get_pixel(0, 0).0, [63, 0, 0]);
    }
}
