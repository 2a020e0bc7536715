pub mod threaded_region_executor;
