pub mod box_mean_filter;
