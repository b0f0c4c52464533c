//! Utilities shared across the sextant workspace.

pub mod log_setup;

pub use log_setup::{init_test_logging, setup_logging, LogConfig, LogSetupError};
