use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::shared::filter_error::FilterError;
use crate::shared::pixel_buffer::PixelBuffer;

/// Encoding used for the filtered output, independent of the input format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Jpeg,
    Png,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(OutputFormat::Jpeg),
            "png" => Ok(OutputFormat::Png),
            other => Err(format!("Format must be 'jpeg' or 'png', got '{other}'")),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Jpeg => write!(f, "jpeg"),
            OutputFormat::Png => write!(f, "png"),
        }
    }
}

/// Encodes a buffer to an image file.
pub trait ImageWriter: Send {
    fn write(&self, path: &Path, buffer: &PixelBuffer, format: OutputFormat)
        -> Result<(), FilterError>;
}
