//! FileBuddy - Main CLI Entry Point

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use filebuddy::{
    cli::{call_arguments, Args, Commands, Config, Verbosity},
    telemetry,
    tools::{parse_calls, ToolRuntime},
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    telemetry::init_tracing(&config.logging, args.verbosity())
        .context("Failed to initialize logging")?;

    match &args.command {
        Commands::Tools => {
            list_tools(&config)?;
        }
        Commands::Schema { tool } => {
            print_schema(&config, tool.as_deref())?;
        }
        Commands::Call {
            tool,
            args: raw,
            set,
            json,
        } => {
            let ok = run_call(&config, tool, raw.as_deref(), set, *json).await?;
            if !ok {
                std::process::exit(1);
            }
        }
        Commands::Batch => {
            run_batch(&config, args.verbosity()).await?;
        }
        Commands::Config => {
            show_config(&args, &config)?;
        }
    }

    Ok(())
}

fn list_tools(config: &Config) -> Result<()> {
    let runtime = ToolRuntime::new(config)?;

    for schema in runtime.get_registry().schemas() {
        let marker = if schema.read_only {
            "read-only".green()
        } else {
            "writes".yellow()
        };
        println!("{:<12} [{}] {}", schema.name.bold(), marker, schema.description);
    }

    Ok(())
}

fn print_schema(config: &Config, tool: Option<&str>) -> Result<()> {
    let runtime = ToolRuntime::new(config)?;

    let definitions = match tool {
        None => runtime.definitions(),
        Some(name) => {
            let found = runtime
                .get_registry()
                .get(name)
                .with_context(|| format!("Unknown tool: {}", name))?;
            vec![found.schema().to_definition()]
        }
    };

    println!("{}", serde_json::to_string_pretty(&definitions)?);
    Ok(())
}

async fn run_call(
    config: &Config,
    tool: &str,
    raw: Option<&str>,
    set: &[String],
    json: bool,
) -> Result<bool> {
    let runtime = ToolRuntime::new(config)?;
    let call_args = call_arguments(raw, set).map_err(anyhow::Error::msg)?;

    let result = runtime.execute(tool, &call_args).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if result.is_success() {
        println!("{}", result.render());
    } else {
        eprintln!("{}", result.render().red());
    }

    Ok(result.is_success())
}

async fn run_batch(config: &Config, verbosity: Verbosity) -> Result<()> {
    let runtime = ToolRuntime::new(config)?;

    let mut input = String::new();
    tokio::io::stdin()
        .read_to_string(&mut input)
        .await
        .context("Failed to read stdin")?;
    let calls = parse_calls(&input)?;

    let results = runtime.execute_batch(&calls).await;

    let mut stdout = tokio::io::stdout();
    for result in &results {
        let mut line = serde_json::to_string(result)?;
        line.push('\n');
        stdout.write_all(line.as_bytes()).await?;
    }
    stdout.flush().await?;

    if verbosity.show_summary() {
        eprint!("{}", telemetry::summary(&runtime.stats()));
    }

    Ok(())
}

fn show_config(args: &Args, config: &Config) -> Result<()> {
    let source = match (&args.config, Config::default_path()) {
        (Some(path), _) => path.display().to_string(),
        (None, Some(path)) if path.exists() => path.display().to_string(),
        _ => "built-in defaults".to_string(),
    };

    println!("{} {}", "# Source:".dimmed(), source);
    print!("{}", config.to_toml()?);

    Ok(())
}
