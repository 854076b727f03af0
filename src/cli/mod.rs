//! CLI module for FileBuddy
//!
//! Handles command-line argument parsing and configuration management.

pub mod config;
pub mod args;

pub use config::{Config, LoggingConfig, ToolsConfig};
pub use args::{call_arguments, Args, Commands, Verbosity};
