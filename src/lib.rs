pub mod app;
pub mod config;
pub mod constants;
pub mod credentials;
pub mod error;
pub mod infra;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod server;
pub mod types;
