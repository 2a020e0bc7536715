use crate::partitioning::domain::partitioner::Partitioner;
use crate::shared::region::Region;

use super::spans::split_evenly;

/// Splits the image into full-width horizontal strips of near-equal height.
///
/// The worker count is clamped to `1..=height`, so a tall request on a short
/// image yields one row per strip and leaves the extra workers unused.
#[derive(Clone, Copy, Debug, Default)]
pub struct RowStripPartitioner;

impl RowStripPartitioner {
    pub fn new() -> Self {
        Self
    }
}

impl Partitioner for RowStripPartitioner {
    fn partition(&self, width: u32, height: u32, workers: usize) -> Vec<Region> {
        if width == 0 || height == 0 {
            return Vec::new();
        }
        let strips = clamp_workers(workers, height);
        split_evenly(height, strips)
            .into_iter()
            .map(|(y0, y1)| Region::new(0, y0, width, y1))
            .collect()
    }
}

pub(crate) fn clamp_workers(workers: usize, limit: u32) -> u32 {
    let requested = u32::try_from(workers).unwrap_or(u32::MAX).max(1);
    requested.min(limit)
}
