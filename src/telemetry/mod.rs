//! Telemetry for FileBuddy
//!
//! Installs the global tracing subscriber and renders end-of-run
//! execution summaries. Logs always go to stderr so stdout stays
//! reserved for tool output.

use crate::cli::{LoggingConfig, Verbosity};
use crate::errors::{FileBuddyError, Result};
use crate::tools::ToolStats;
use std::fmt::Write as _;
use tracing_subscriber::EnvFilter;

/// Filter directive for the given config level and CLI verbosity
pub fn filter_directive(level: &str, verbosity: Verbosity) -> String {
    match verbosity {
        Verbosity::Quiet => "error".to_string(),
        Verbosity::Normal => level.to_string(),
        Verbosity::Verbose => "filebuddy=info,warn".to_string(),
        Verbosity::VeryVerbose => "filebuddy=debug,info".to_string(),
    }
}

/// Install the global subscriber; `RUST_LOG` takes precedence when set
pub fn init_tracing(config: &LoggingConfig, verbosity: Verbosity) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(filter_directive(&config.level, verbosity))
            .map_err(|e| FileBuddyError::LoggingError(e.to_string()))?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let installed = if config.format == "json" {
        builder.json().try_init()
    } else {
        builder.compact().try_init()
    };

    installed.map_err(|e| FileBuddyError::LoggingError(e.to_string()))
}

/// Human-readable summary of a run
pub fn summary(stats: &ToolStats) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "\n📊 Session Summary");
    let _ = writeln!(out, "─────────────────────────────────────");
    let _ = writeln!(out, "Tools executed:    {}", stats.total_executions);
    let _ = writeln!(out, "Succeeded:         {}", stats.successful_executions);
    let _ = writeln!(out, "Failed:            {}", stats.failed_executions);
    let _ = writeln!(
        out,
        "Success rate:      {:.1}%",
        stats.success_rate() * 100.0
    );
    let _ = writeln!(
        out,
        "Average duration:  {:.1}ms",
        stats.average_duration_ms()
    );
    for (kind, count) in &stats.failures_by_kind {
        let _ = writeln!(out, "  {:<16} {}", format!("{:?}:", kind), count);
    }

    out
}
