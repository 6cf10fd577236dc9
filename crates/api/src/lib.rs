pub mod app;
pub mod cache;
pub mod config;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod routes;
