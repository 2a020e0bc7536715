pub mod infrastructure;
pub mod mean_filter_use_case;
pub mod pipeline_logger;
pub mod region_executor;
