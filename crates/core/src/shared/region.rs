use crate::shared::filter_error::FilterError;

/// A half-open rectangle `[x0, x1) × [y0, y1)` of destination pixels owned
/// by exactly one worker for the duration of a filter run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Region {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl Region {
    pub fn new(x0: u32, y0: u32, x1: u32, y1: u32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> u32 {
        self.x1.saturating_sub(self.x0)
    }

    pub fn height(&self) -> u32 {
        self.y1.saturating_sub(self.y0)
    }

    pub fn area(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.area() == 0
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1
    }

    pub fn contains_row(&self, y: u32) -> bool {
        y >= self.y0 && y < self.y1
    }

    pub fn intersection_area(&self, other: &Region) -> u64 {
        let ix0 = self.x0.max(other.x0);
        let iy0 = self.y0.max(other.y0);
        let ix1 = self.x1.min(other.x1);
        let iy1 = self.y1.min(other.y1);
        ix1.saturating_sub(ix0) as u64 * iy1.saturating_sub(iy0) as u64
    }

    /// Checks that `regions` partition `[0, width) × [0, height)` exactly:
    /// every region is non-empty and in bounds, no two overlap, and together
    /// they account for every pixel.
    ///
    /// Runs in `O(width * height)` regardless of the region count, using a
    /// one-byte-per-pixel hit map.
    pub fn verify_cover(regions: &[Region], width: u32, height: u32) -> Result<(), FilterError> {
        for r in regions {
            if r.is_empty() {
                return Err(FilterError::InvalidPartition(format!("empty region {r:?}")));
            }
            if r.x1 > width || r.y1 > height {
                return Err(FilterError::InvalidPartition(format!(
                    "region {r:?} exceeds {width}x{height} image"
                )));
            }
        }

        let covered: u64 = regions.iter().map(Region::area).sum();
        let expected = width as u64 * height as u64;
        if covered != expected {
            return Err(FilterError::InvalidPartition(format!(
                "regions cover {covered} of {expected} pixels"
            )));
        }

        // Equal area plus no double hits means every pixel is hit once.
        let stride = width as usize;
        let mut hits = vec![false; stride * height as usize];
        for r in regions {
            for y in r.y0 as usize..r.y1 as usize {
                let row = &mut hits[y * stride + r.x0 as usize..y * stride + r.x1 as usize];
                if row.iter().any(|&hit| hit) {
                    return Err(FilterError::InvalidPartition(format!(
                        "region {r:?} overlaps another region"
                    )));
                }
                row.fill(true);
            }
        }
        Ok(())
    }
}
