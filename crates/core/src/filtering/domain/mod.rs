pub mod neighborhood_filter;
