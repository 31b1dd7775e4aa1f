pub mod http_client;
pub mod rows_file;
pub mod sheets_client;
pub mod source_factory;
pub mod static_liveness;
pub mod token_provider;
