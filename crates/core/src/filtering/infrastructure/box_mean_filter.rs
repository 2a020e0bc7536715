use ndarray::{s, ArrayView3, Axis};

use crate::filtering::domain::neighborhood_filter::NeighborhoodFilter;
use crate::shared::kernel_size::KernelSize;
use crate::shared::pixel_buffer::{PixelBuffer, CHANNELS};

/// Unweighted mean over a square `k × k` neighborhood.
///
/// Neighbors outside the image are skipped rather than padded, so edge and
/// corner pixels average over fewer samples.
#[derive(Clone, Copy, Debug)]
pub struct BoxMeanFilter {
    kernel: KernelSize,
}

impl BoxMeanFilter {
    pub fn new(kernel: KernelSize) -> Self {
        Self { kernel }
    }

    pub fn kernel(&self) -> KernelSize {
        self.kernel
    }
}

impl NeighborhoodFilter for BoxMeanFilter {
    fn apply(&self, source: &PixelBuffer, x: u32, y: u32) -> [u8; 3] {
        average(source, x, y, self.kernel)
    }

    fn filter_row_segment(&self, source: &PixelBuffer, y: u32, x0: u32, out: &mut [u8]) {
        let view = source.as_ndarray();
        for (i, px) in out.chunks_exact_mut(CHANNELS).enumerate() {
            px.copy_from_slice(&average_view(&view, x0 + i as u32, y, self.kernel));
        }
    }
}

/// Mean color of the in-bounds part of the `kernel`-sized square centered
/// on `(x, y)`. Each channel is floor-divided by the number of samples.
pub fn average(source: &PixelBuffer, x: u32, y: u32, kernel: KernelSize) -> [u8; 3] {
    average_view(&source.as_ndarray(), x, y, kernel)
}

fn average_view(view: &ArrayView3<'_, u8>, x: u32, y: u32, kernel: KernelSize) -> [u8; 3] {
    let (height, width, _) = view.dim();
    let pad = kernel.pad() as usize;
    let (x, y) = (x as usize, y as usize);

    // Clipping the window to the image is the same as skipping
    // out-of-bounds offsets. The center is always inside, so count >= 1.
    let window = view.slice(s![
        y.saturating_sub(pad)..(y + pad + 1).min(height),
        x.saturating_sub(pad)..(x + pad + 1).min(width),
        ..
    ]);
    let count = (window.len_of(Axis(0)) * window.len_of(Axis(1))) as u64;

    let mut sums = [0u64; 3];
    for px in window.lanes(Axis(2)) {
        for (sum, &value) in sums.iter_mut().zip(px.iter()) {
            *sum += value as u64;
        }
    }
    sums.map(|sum| (sum / count) as u8)
}
