pub mod constants;
pub mod filter_error;
pub mod kernel_size;
pub mod pixel_buffer;
pub mod region;
