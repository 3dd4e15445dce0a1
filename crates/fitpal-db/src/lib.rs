pub mod config;
pub mod models;
pub mod pool;
pub mod queries;
