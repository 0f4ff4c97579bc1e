pub mod config_transfer;
pub mod reconciler;
pub mod transition_engine;
pub mod workbench_session;
