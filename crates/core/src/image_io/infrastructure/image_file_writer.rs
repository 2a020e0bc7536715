use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ImageError, RgbImage};

use crate::image_io::domain::image_writer::{ImageWriter, OutputFormat};
use crate::shared::constants::JPEG_QUALITY;
use crate::shared::filter_error::FilterError;
use crate::shared::pixel_buffer::PixelBuffer;

/// Writes a buffer to disk with the `image` crate, always in the requested
/// format regardless of the path's extension.
pub struct ImageFileWriter {
    jpeg_quality: u8,
}

impl ImageFileWriter {
    pub fn new() -> Self {
        Self {
            jpeg_quality: JPEG_QUALITY,
        }
    }

    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }

    fn encode(
        &self,
        path: &Path,
        buffer: &PixelBuffer,
        format: OutputFormat,
    ) -> Result<(), ImageError> {
        // Ensure parent directory exists (infrastructure concern)
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let img = RgbImage::from_raw(buffer.width(), buffer.height(), buffer.data().to_vec())
            .ok_or_else(|| {
                ImageError::IoError(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "buffer length does not match its dimensions",
                ))
            })?;

        let mut out = BufWriter::new(File::create(path)?);
        match format {
            OutputFormat::Jpeg => {
                img.write_with_encoder(JpegEncoder::new_with_quality(&mut out, self.jpeg_quality))?
            }
            OutputFormat::Png => img.write_with_encoder(PngEncoder::new(&mut out))?,
        }
        out.flush()?;
        Ok(())
    }
}

impl Default for ImageFileWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageWriter for ImageFileWriter {
    fn write(
        &self,
        path: &Path,
        buffer: &PixelBuffer,
        format: OutputFormat,
    ) -> Result<(), FilterError> {
        self.encode(path, buffer, format)
            .map_err(|source| FilterError::Encode {
                path: path.to_path_buf(),
                source,
            })?;
        log::debug!("Encoded {} as {format}", path.display());
        Ok(())
    }
}
