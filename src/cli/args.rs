//! Command-line argument parsing for FileBuddy
//!
//! Provides clap-based CLI with subcommands and verbosity control.

use clap::{Parser, Subcommand};
use serde_json::{Map, Value};
use std::path::PathBuf;

/// FileBuddy - Filesystem tools for chat agents
#[derive(Parser, Debug)]
#[command(name = "filebuddy")]
#[command(author = "Jerome (Kubashen) Naidoo")]
#[command(version)]
#[command(about = "Agent-callable filesystem tools behind one tool-calling interface", long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level: -q (quiet), default (normal), -v (verbose), -vv (very verbose)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List available tools
    Tools,

    /// Print function-calling definitions as JSON
    Schema {
        /// Only this tool
        #[arg(long)]
        tool: Option<String>,
    },

    /// Invoke one tool
    Call {
        /// Tool name
        tool: String,

        /// Arguments as a JSON object
        #[arg(long)]
        args: Option<String>,

        /// Set a single string argument (repeatable)
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Read JSON tool calls from stdin, one per line, and run them concurrently
    Batch,

    /// Display current configuration
    Config,
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::VeryVerbose,
            }
        }
    }
}

/// Merge `--args` JSON with `--set key=value` pairs; pairs win
pub fn call_arguments(args: Option<&str>, set: &[String]) -> Result<Value, String> {
    let mut object = match args {
        None => Map::new(),
        Some(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => map,
            Ok(other) => return Err(format!("--args must be a JSON object, got {}", other)),
            Err(e) => return Err(format!("--args is not valid JSON: {}", e)),
        },
    };

    for pair in set {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| format!("--set expects KEY=VALUE, got '{}'", pair))?;
        object.insert(key.to_string(), Value::String(value.to_string()));
    }

    Ok(Value::Object(object))
}

impl Verbosity {
    /// Check if should print the end-of-run summary
    pub fn show_summary(&self) -> bool {
        matches!(self, Verbosity::Verbose | Verbosity::VeryVerbose)
    }
}
