use std::path::Path;

use crate::image_io::domain::image_reader::ImageReader;
use crate::shared::filter_error::FilterError;
use crate::shared::pixel_buffer::PixelBuffer;

/// Decodes any format the `image` crate supports and converts it to RGB8.
///
/// Alpha is dropped; grayscale and 16-bit inputs are widened/narrowed.
pub struct ImageFileReader;

impl ImageFileReader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageFileReader {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageReader for ImageFileReader {
    fn read(&self, path: &Path) -> Result<PixelBuffer, FilterError> {
        let img = image::open(path)
            .map_err(|source| FilterError::Decode {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgb8();

        let (width, height) = img.dimensions();
        log::debug!("Decoded {} ({width}x{height})", path.display());
        Ok(PixelBuffer::new(img.into_raw(), width, height))
    }
}
