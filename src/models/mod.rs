pub mod config;
pub mod config_validator;
pub mod dry_run_mode;
pub mod error;
pub mod notification;
pub mod run_result;
