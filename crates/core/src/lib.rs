pub mod filtering;
pub mod image_io;
pub mod partitioning;
pub mod pipeline;
pub mod shared;
