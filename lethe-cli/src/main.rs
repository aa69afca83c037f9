//! Lethe CLI
//!
//! Inspect and edit any configured cache instance from the command line.
//! Points at the same YAML configuration the application uses, so what you
//! see here is exactly what the application sees.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use lethe::{Cache, CacheConfig, Instance};
use serde_json::Value;
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser)]
#[command(name = "lethe-cli")]
#[command(about = "Inspect and edit lethe cache instances", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the cache configuration file
    #[arg(short, long, default_value = "cache.yml")]
    config: PathBuf,

    /// Instance name (defaults to "default")
    #[arg(short, long)]
    instance: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Get a value
    Get {
        key: String,

        /// Print the stored text without decoding it
        #[arg(long)]
        raw: bool,
    },

    /// Set a value, parsed as JSON when possible
    Set {
        key: String,
        value: String,

        /// Time-to-live in seconds
        #[arg(short, long)]
        ttl: Option<u64>,
    },

    /// Get multiple values
    Mget { keys: Vec<String> },

    /// Clear one or more keys
    Del { keys: Vec<String> },

    /// List keys, optionally scoped to a sub-namespace
    Keys { namespace: Option<String> },

    /// Clear every key in the instance, or in a sub-namespace
    Flush { namespace: Option<String> },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    let config = CacheConfig::from_file(&cli.config)
        .with_context(|| format!("failed to load config from {}", cli.config.display()))?;
    debug!("loaded config from {}", cli.config.display());

    let cache = Cache::new(config);
    let instance = cache.instance(cli.instance.as_deref())?;

    match cli.command {
        Commands::Get { key, raw } => cmd_get(&instance, &key, raw),
        Commands::Set { key, value, ttl } => cmd_set(&instance, &key, &value, ttl),
        Commands::Mget { keys } => cmd_mget(&instance, &keys),
        Commands::Del { keys } => cmd_del(&instance, &keys),
        Commands::Keys { namespace } => cmd_keys(&instance, namespace.as_deref()),
        Commands::Flush { namespace } => cmd_flush(&instance, namespace.as_deref()),
    }
}

fn cmd_get(instance: &Instance, key: &str, raw: bool) -> Result<()> {
    if raw {
        match instance.get_raw(key)? {
            Some(value) => println!("{value}"),
            None => println!("{}", "(nil)".dimmed()),
        }
        return Ok(());
    }

    match instance.get(key)? {
        Some(value) => println!("{}", render(&value)),
        None => println!("{}", "(nil)".dimmed()),
    }
    Ok(())
}

fn cmd_set(instance: &Instance, key: &str, value: &str, ttl: Option<u64>) -> Result<()> {
    // Structured input is stored structured; anything else is a string
    let value: Value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));

    instance.set(key, value, ttl)?;
    println!("{}", "OK".green());
    Ok(())
}

fn cmd_mget(instance: &Instance, keys: &[String]) -> Result<()> {
    let refs: Vec<&str> = keys.iter().map(String::as_str).collect();
    let values = instance.mget(&refs)?;

    for key in keys {
        match values.get(key).and_then(Option::as_ref) {
            Some(value) => println!("{key}: {}", render(value)),
            None => println!("{key}: {}", "(nil)".dimmed()),
        }
    }
    Ok(())
}

fn cmd_del(instance: &Instance, keys: &[String]) -> Result<()> {
    let refs: Vec<&str> = keys.iter().map(String::as_str).collect();
    instance.mclear(&refs)?;
    println!("{}", "OK".green());
    Ok(())
}

fn cmd_keys(instance: &Instance, namespace: Option<&str>) -> Result<()> {
    let mut keys = instance.keys(namespace)?;
    keys.sort();

    if keys.is_empty() {
        println!("{}", "(empty)".dimmed());
        return Ok(());
    }

    for key in keys {
        println!("{key}");
    }
    Ok(())
}

fn cmd_flush(instance: &Instance, namespace: Option<&str>) -> Result<()> {
    instance.flush(namespace)?;
    println!("{}", "OK".green());
    Ok(())
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{s}\""),
        other => other.to_string(),
    }
}
