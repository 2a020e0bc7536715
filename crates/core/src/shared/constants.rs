/// Side length of the averaging neighborhood when none is given.
pub const DEFAULT_KERNEL_SIZE: i64 = 7;

pub const DEFAULT_OUTPUT_PATH: &str = "filtered_output.jpg";

/// Quality used when encoding JPEG output.
pub const JPEG_QUALITY: u8 = 90;
