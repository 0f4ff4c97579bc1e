pub mod classifier_client;
pub mod config;
pub mod config_cache;
