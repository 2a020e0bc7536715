use crate::shared::region::Region;

/// Domain interface for splitting an image into regions, one per worker.
///
/// Implementations must return an exact cover of `[0, width) × [0, height)`:
/// no gaps, no overlaps, no empty regions, and never more regions than
/// `workers`. A `workers` of 0 is treated as 1.
pub trait Partitioner: Send + Sync {
    fn partition(&self, width: u32, height: u32, workers: usize) -> Vec<Region>;
}
