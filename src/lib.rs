pub mod api;
pub mod config;
pub mod reading_store;
pub mod summary;
