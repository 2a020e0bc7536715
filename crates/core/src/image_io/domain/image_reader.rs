use std::path::Path;

use crate::shared::filter_error::FilterError;
use crate::shared::pixel_buffer::PixelBuffer;

/// Decodes an image file into an RGB8 buffer.
pub trait ImageReader: Send {
    fn read(&self, path: &Path) -> Result<PixelBuffer, FilterError>;
}
