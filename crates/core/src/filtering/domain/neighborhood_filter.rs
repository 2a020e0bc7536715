use crate::shared::pixel_buffer::{PixelBuffer, CHANNELS};

/// Domain interface for a per-pixel neighborhood filter.
///
/// Implementations read only from `source` and must be pure: the same
/// coordinates always produce the same color, whichever thread asks.
pub trait NeighborhoodFilter: Send + Sync {
    /// Computes the filtered color for the pixel at `(x, y)`.
    fn apply(&self, source: &PixelBuffer, x: u32, y: u32) -> [u8; 3];

    /// Fills `out` with filtered pixels `(x0.., y)`; `out` holds whole RGB
    /// triples. Override when per-row setup can be hoisted out of the loop.
    fn filter_row_segment(&self, source: &PixelBuffer, y: u32, x0: u32, out: &mut [u8]) {
        for (i, px) in out.chunks_exact_mut(CHANNELS).enumerate() {
            px.copy_from_slice(&self.apply(source, x0 + i as u32, y));
        }
    }
}
