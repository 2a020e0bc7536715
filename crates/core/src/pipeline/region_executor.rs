use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::filtering::domain::neighborhood_filter::NeighborhoodFilter;
use crate::shared::filter_error::FilterError;
use crate::shared::pixel_buffer::PixelBuffer;
use crate::shared::region::Region;

/// Progress callback: `(regions_done, regions_total)`. Returning `false`
/// requests cancellation.
pub type ProgressFn = Box<dyn Fn(usize, usize) -> bool + Send>;

/// Per-run controls shared with the executor.
#[derive(Default)]
pub struct RunConfig {
    pub cancelled: Arc<AtomicBool>,
    pub on_progress: Option<ProgressFn>,
}

impl RunConfig {
    pub fn with_progress(mut self, on_progress: ProgressFn) -> Self {
        self.on_progress = Some(on_progress);
        self
    }

    pub fn with_cancel_flag(mut self, cancelled: Arc<AtomicBool>) -> Self {
        self.cancelled = cancelled;
        self
    }
}

/// Abstracts how regions of the destination are filtered.
///
/// This is a port (application-layer interface). Implementations must not
/// return until every region has been processed or abandoned, and must
/// only write `destination` pixels that lie inside `regions`.
pub trait RegionExecutor: Send {
    fn execute(
        &self,
        source: &PixelBuffer,
        destination: &mut PixelBuffer,
        regions: &[Region],
        filter: &dyn NeighborhoodFilter,
        config: &RunConfig,
    ) -> Result<(), FilterError>;
}
