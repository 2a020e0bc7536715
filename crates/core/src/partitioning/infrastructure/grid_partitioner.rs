use crate::partitioning::domain::partitioner::Partitioner;
use crate::shared::region::Region;

use super::row_strip_partitioner::clamp_workers;
use super::spans::split_evenly;

/// Splits the image into a `rows × cols` grid of tiles.
///
/// Picks the factorization that puts the most workers to use, breaking ties
/// in favour of tiles closest to square. Narrow images degrade to strips.
#[derive(Clone, Copy, Debug, Default)]
pub struct GridPartitioner;

impl GridPartitioner {
    pub fn new() -> Self {
        Self
    }
}

impl Partitioner for GridPartitioner {
    fn partition(&self, width: u32, height: u32, workers: usize) -> Vec<Region> {
        if width == 0 || height == 0 {
            return Vec::new();
        }
        let pixels = (width as u64 * height as u64).min(u32::MAX as u64) as u32;
        let workers = clamp_workers(workers, pixels);
        let (rows, cols) = choose_grid(width, height, workers);

        let row_spans = split_evenly(height, rows);
        let col_spans = split_evenly(width, cols);
        row_spans
            .iter()
            .flat_map(|&(y0, y1)| {
                col_spans
                    .iter()
                    .map(move |&(x0, x1)| Region::new(x0, y0, x1, y1))
            })
            .collect()
    }
}

/// Returns `(rows, cols)` with `rows <= height`, `cols <= width` and
/// `rows * cols <= workers`.
fn choose_grid(width: u32, height: u32, workers: u32) -> (u32, u32) {
    let mut best = (1, 1);
    let mut best_used = 1;
    let mut best_skew = f64::INFINITY;

    for rows in 1..=workers.min(height) {
        let cols = (workers / rows).min(width);
        let used = rows * cols;
        let tile_w = width as f64 / cols as f64;
        let tile_h = height as f64 / rows as f64;
        let skew = (tile_w / tile_h).ln().abs();

        if used > best_used || (used == best_used && skew < best_skew) {
            best = (rows, cols);
            best_used = used;
            best_skew = skew;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    /// Counts how many regions claim each pixel.
    fn coverage(regions: &[Region], width: u32, height: u32) -> Vec<u32> {
        let mut hits = vec![0u32; (width * height) as usize];
        for r in regions {
            for y in r.y0..r.y1 {
                for x in r.x0..r.x1 {
                    hits[(y * width + x) as usize] += 1;
                }
            }
        }
        hits
    }

    #[test]
    fn test_square_image_four_workers_is_two_by_two() {
        let regions = GridPartitioner::new().partition(8, 8, 4);
        assert_eq!(
            regions,
            vec![
                Region::new(0, 0, 4, 4),
                Region::new(4, 0, 8, 4),
                Region::new(0, 4, 4, 8),
                Region::new(4, 4, 8, 8),
            ]
        );
    }

    #[test]
    fn test_wide_image_prefers_columns() {
        assert_eq!(choose_grid(1000, 10, 4), (1, 4));
    }

    #[test]
    fn test_tall_image_prefers_rows() {
        assert_eq!(choose_grid(10, 1000, 4), (4, 1));
    }

    #[test]
    fn test_prime_worker_count_uses_all_workers() {
        let (rows, cols) = choose_grid(100, 100, 7);
        assert_eq!(rows * cols, 7);
    }

    #[test]
    fn test_single_pixel_image() {
        let regions = GridPartitioner::new().partition(1, 1, 8);
        assert_eq!(regions, vec![Region::new(0, 0, 1, 1)]);
    }

    #[test]
    fn test_workers_clamped_to_pixel_count() {
        let regions = GridPartitioner::new().partition(2, 2, 100);
        assert_eq!(regions.len(), 4);
        assert!(regions.iter().all(|r| r.area() == 1));
    }

    #[test]
    fn test_zero_workers_treated_as_one() {
        let regions = GridPartitioner::new().partition(5, 5, 0);
        assert_eq!(regions, vec![Region::new(0, 0, 5, 5)]);
    }

    #[rstest]
    #[case(1, 1, 1)]
    #[case(4, 4, 2)]
    #[case(7, 13, 6)]
    #[case(13, 7, 5)]
    #[case(640, 480, 8)]
    #[case(1, 50, 9)]
    #[case(50, 1, 9)]
    fn test_every_pixel_claimed_once(
        #[case] width: u32,
        #[case] height: u32,
        #[case] workers: usize,
    ) {
        let regions = GridPartitioner::new().partition(width, height, workers);
        assert!(regions.len() <= workers);
        assert!(coverage(&regions, width, height).iter().all(|&n| n == 1));
    }

    #[test]
    fn test_exact_cover_exhaustive_small() {
        let partitioner = GridPartitioner::new();
        for width in 1..=9 {
            for height in 1..=9 {
                for workers in 1..=12 {
                    let regions = partitioner.partition(width, height, workers);
                    assert!(regions.len() <= workers);
                    assert!(
                        Region::verify_cover(&regions, width, height).is_ok(),
                        "{width}x{height} with {workers} workers"
                    );
                }
            }
        }
    }

    #[test]
    fn test_one_tile_per_pixel_verifies() {
        let regions = GridPartitioner::new().partition(300, 300, 90_000);
        assert_eq!(regions.len(), 90_000);
        assert!(regions.iter().all(|r| r.area() == 1));
        Region::verify_cover(&regions, 300, 300).unwrap();
    }
}
