pub mod grid_partitioner;
pub mod partitioner_factory;
pub mod row_strip_partitioner;
mod spans;
