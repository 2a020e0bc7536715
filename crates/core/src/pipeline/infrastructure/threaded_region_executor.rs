use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam_channel::{Receiver, Sender};

use crate::filtering::domain::neighborhood_filter::NeighborhoodFilter;
use crate::filtering::infrastructure::box_mean_filter::BoxMeanFilter;
use crate::pipeline::region_executor::{RegionExecutor, RunConfig};
use crate::shared::filter_error::FilterError;
use crate::shared::kernel_size::KernelSize;
use crate::shared::pixel_buffer::{PixelBuffer, CHANNELS};
use crate::shared::region::Region;

/// Filters regions on a fixed pool of scoped threads fed by a work queue.
///
/// Layout: `queue → N workers → outcome channel → caller`
///
/// The destination is split into disjoint mutable row segments before any
/// thread starts, so each worker owns exactly the pixels of the region it
/// is processing and no locking is needed. The source is shared read-only.
pub struct ThreadedRegionExecutor {
    max_threads: Option<usize>,
}

impl ThreadedRegionExecutor {
    pub fn new() -> Self {
        Self { max_threads: None }
    }

    /// Caps the pool size. Without a cap the pool uses the available
    /// hardware parallelism.
    pub fn with_max_threads(mut self, max_threads: usize) -> Self {
        self.max_threads = Some(max_threads.max(1));
        self
    }

    fn thread_count(&self, tasks: usize) -> usize {
        let limit = self.max_threads.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        });
        limit.min(tasks).max(1)
    }
}

impl Default for ThreadedRegionExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl RegionExecutor for ThreadedRegionExecutor {
    fn execute(
        &self,
        source: &PixelBuffer,
        destination: &mut PixelBuffer,
        regions: &[Region],
        filter: &dyn NeighborhoodFilter,
        config: &RunConfig,
    ) -> Result<(), FilterError> {
        if source.dimensions() != destination.dimensions() {
            return Err(FilterError::DimensionMismatch {
                source_dims: source.dimensions(),
                dest_dims: destination.dimensions(),
            });
        }
        let (width, height) = source.dimensions();
        Region::verify_cover(regions, width, height)?;

        if config.cancelled.load(Ordering::Relaxed) {
            return Err(FilterError::Cancelled);
        }
        if regions.is_empty() {
            return Ok(());
        }

        let total = regions.len();
        let threads = self.thread_count(total);
        log::debug!("Dispatching {total} regions to {threads} worker threads");

        let (task_tx, task_rx) = crossbeam_channel::unbounded::<RegionTask<'_>>();
        for task in carve_tasks(destination, regions) {
            // Receiver is alive in this scope, so the queue cannot be closed.
            let _ = task_tx.send(task);
        }
        drop(task_tx);

        let (outcome_tx, outcome_rx) = crossbeam_channel::unbounded::<Result<Region, FilterError>>();
        // Stop requested by the progress callback for this run only; the
        // caller's flag is never written.
        let stop = StopSignal {
            external: &*config.cancelled,
            local: AtomicBool::new(false),
        };
        let stop = &stop;

        let first_fault = std::thread::scope(|scope| {
            for _ in 0..threads {
                let tasks = task_rx.clone();
                let outcomes = outcome_tx.clone();
                scope.spawn(move || run_worker(tasks, outcomes, source, filter, stop));
            }
            drop(task_rx);
            drop(outcome_tx);

            collect_outcomes(outcome_rx, total, config, stop)
        });

        if let Some(fault) = first_fault {
            return Err(fault);
        }
        if stop.is_set() {
            return Err(FilterError::Cancelled);
        }
        Ok(())
    }
}

/// Filters `source` into `destination` with an unweighted `kernel`-sized
/// mean, one worker per region.
pub fn run(
    source: &PixelBuffer,
    destination: &mut PixelBuffer,
    regions: &[Region],
    kernel: KernelSize,
) -> Result<(), FilterError> {
    ThreadedRegionExecutor::new().execute(
        source,
        destination,
        regions,
        &BoxMeanFilter::new(kernel),
        &RunConfig::default(),
    )
}

/// Cancellation seen by workers: the caller's flag or a stop requested
/// through the progress callback during this run.
struct StopSignal<'a> {
    external: &'a AtomicBool,
    local: AtomicBool,
}

impl StopSignal<'_> {
    fn is_set(&self) -> bool {
        self.external.load(Ordering::Relaxed) || self.local.load(Ordering::Relaxed)
    }

    fn request(&self) {
        self.local.store(true, Ordering::Relaxed);
    }
}

/// One region's exclusive share of the destination: a row segment per
/// image row it spans, top to bottom.
struct RegionTask<'a> {
    region: Region,
    rows: Vec<&'a mut [u8]>,
}

impl RegionTask<'_> {
    fn process(self, source: &PixelBuffer, filter: &dyn NeighborhoodFilter) {
        let Region { x0, y0, .. } = self.region;
        for (dy, row) in self.rows.into_iter().enumerate() {
            filter.filter_row_segment(source, y0 + dy as u32, x0, row);
        }
    }
}

/// Splits `destination` into per-region row segments.
///
/// `regions` must already be verified as an exact cover; each image row is
/// then cut left to right at region boundaries with `split_at_mut`, so the
/// borrow checker proves the segments disjoint. Rows are swept top to bottom
/// keeping only the regions that span the current row.
fn carve_tasks<'a>(destination: &'a mut PixelBuffer, regions: &[Region]) -> Vec<RegionTask<'a>> {
    let stride = destination.stride();
    let mut tasks: Vec<RegionTask<'a>> = regions
        .iter()
        .map(|&region| RegionTask {
            region,
            rows: Vec::with_capacity(region.height() as usize),
        })
        .collect();

    let mut by_start: Vec<usize> = (0..regions.len()).collect();
    by_start.sort_by_key(|&i| (regions[i].y0, regions[i].x0));
    let mut pending = by_start.into_iter().peekable();
    let mut active: Vec<usize> = Vec::new();

    for (y, row) in destination.data_mut().chunks_exact_mut(stride).enumerate() {
        let y = y as u32;
        let before = active.len();
        active.retain(|&i| regions[i].contains_row(y));
        let mut changed = active.len() != before;
        while let Some(i) = pending.next_if(|&i| regions[i].y0 <= y) {
            active.push(i);
            changed = true;
        }
        if changed {
            active.sort_by_key(|&i| regions[i].x0);
        }

        let mut rest: &'a mut [u8] = row;
        let mut cursor = 0u32;

        for &i in &active {
            let region = regions[i];
            let skip = region.x0.saturating_sub(cursor) as usize * CHANNELS;
            let len = region.width() as usize * CHANNELS;

            let (head, tail) = std::mem::take(&mut rest).split_at_mut(skip + len);
            let (_, segment) = head.split_at_mut(skip);
            tasks[i].rows.push(segment);

            rest = tail;
            cursor = region.x1;
        }
    }
    tasks
}

fn run_worker(
    tasks: Receiver<RegionTask<'_>>,
    outcomes: Sender<Result<Region, FilterError>>,
    source: &PixelBuffer,
    filter: &dyn NeighborhoodFilter,
    stop: &StopSignal<'_>,
) {
    for task in tasks {
        if stop.is_set() {
            break;
        }
        let region = task.region;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| task.process(source, filter)))
            .map(|()| region)
            .map_err(|payload| FilterError::WorkerFault {
                region,
                message: panic_message(payload.as_ref()),
            });
        if outcomes.send(outcome).is_err() {
            break;
        }
    }
}

/// Drains worker outcomes until every worker has exited; reports progress
/// and keeps the first fault. Other workers keep running after a fault.
fn collect_outcomes(
    outcomes: Receiver<Result<Region, FilterError>>,
    total: usize,
    config: &RunConfig,
    stop: &StopSignal<'_>,
) -> Option<FilterError> {
    let mut first_fault = None;
    let mut done = 0usize;

    for outcome in outcomes {
        match outcome {
            Ok(region) => {
                done += 1;
                log::trace!("Region {region:?} done ({done}/{total})");
                if let Some(ref callback) = config.on_progress {
                    if !callback(done, total) {
                        stop.request();
                    }
                }
            }
            Err(fault) => {
                log::warn!("{fault}");
                if first_fault.is_none() {
                    first_fault = Some(fault);
                }
            }
        }
    }
    first_fault
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}
