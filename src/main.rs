//! structkit - command-line front end
//!
//! Reads JSON documents from files (or stdin for `-`) and prints the result
//! of a structural operation as JSON on stdout. Logs go to stderr.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde_json::json;
use tokio::io::AsyncReadExt;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use structkit::{
    deep_clone, deep_equal, deep_merge, diff, flatten, hash, unflatten, CachedFilter, Config,
    FilterOptions, Object, Value,
};

#[derive(Parser, Debug)]
#[command(name = "structkit")]
#[command(about = "Structural hashing, comparison and transformation of JSON documents", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the base64 SHA-256 of the canonical form
    Hash {
        /// Input document, `-` for stdin
        file: PathBuf,
    },

    /// Print whether two documents are deeply equal
    Equals { a: PathBuf, b: PathBuf },

    /// Print a deep clone with dangerous keys removed
    Clone { file: PathBuf },

    /// Deep merge `source` into `target`
    Merge { target: PathBuf, source: PathBuf },

    /// Flatten nested objects into joined keys
    Flatten {
        file: PathBuf,

        /// Key separator (defaults to FLATTEN_SEPARATOR or ".")
        #[arg(short, long)]
        separator: Option<String>,
    },

    /// Rebuild nested objects from joined keys
    Unflatten {
        file: PathBuf,

        /// Key separator (defaults to FLATTEN_SEPARATOR or ".")
        #[arg(short, long)]
        separator: Option<String>,
    },

    /// Print added, removed and changed top-level keys
    Diff { before: PathBuf, after: PathBuf },

    /// Print the items of an array that match a filter object
    Filter {
        /// Array of items
        items: PathBuf,

        /// Filter object; keys may be dot paths
        filter: PathBuf,

        /// Compare strings ignoring case
        #[arg(long)]
        case_insensitive: bool,

        /// Compare by identity instead of deep equality
        #[arg(long)]
        strict: bool,

        /// Accept filter keys that are not safe paths
        #[arg(long)]
        no_validate_paths: bool,

        /// Include cache statistics in the output
        #[arg(long)]
        stats: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" for this crate, can be overridden with RUST_LOG
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "structkit=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();
    config.validate().context("invalid environment configuration")?;
    debug!(?config, "configuration loaded");

    let output = run(cli.command, &config).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn run(command: Commands, config: &Config) -> anyhow::Result<serde_json::Value> {
    let output = match command {
        Commands::Hash { file } => {
            let value = read_value(&file).await?;
            json!(hash(&value)?)
        }
        Commands::Equals { a, b } => {
            let (a, b) = (read_value(&a).await?, read_value(&b).await?);
            json!(deep_equal(&a, &b))
        }
        Commands::Clone { file } => {
            let value = read_value(&file).await?;
            to_output(&deep_clone(&value)?)?
        }
        Commands::Merge { target, source } => {
            let target = read_object(&target).await?;
            let source = read_object(&source).await?;
            to_output(&deep_merge(&target, &source)?.into_value())?
        }
        Commands::Flatten { file, separator } => {
            let object = read_object(&file).await?;
            let separator = separator.unwrap_or_else(|| config.flatten_separator.clone());
            to_output(&flatten(&object, &separator)?.into_value())?
        }
        Commands::Unflatten { file, separator } => {
            let object = read_object(&file).await?;
            let separator = separator.unwrap_or_else(|| config.flatten_separator.clone());
            to_output(&unflatten(&object, &separator).into_value())?
        }
        Commands::Diff { before, after } => {
            let before = read_object(&before).await?;
            let after = read_object(&after).await?;
            to_output(&diff(&before, &after)?.to_value())?
        }
        Commands::Filter {
            items,
            filter,
            case_insensitive,
            strict,
            no_validate_paths,
            stats,
        } => {
            let items = match read_value(&items).await? {
                Value::List(items) => items.borrow().clone(),
                other => bail!("{} must hold an array, found {}", items.display(), other.type_name()),
            };
            let filter = read_object(&filter).await?;
            let options = FilterOptions {
                case_insensitive_strings: case_insensitive,
                use_deep_equal: !strict,
                validate_paths: !no_validate_paths,
            };

            let mut cached = CachedFilter::from_config(config, options)?;
            let kept = cached.filter(&items, &filter).await;
            info!(total = items.len(), kept = kept.len(), "filter applied");

            let kept = to_output(&Value::list(kept))?;
            if stats {
                json!({ "items": kept, "stats": cached.stats() })
            } else {
                kept
            }
        }
    };
    Ok(output)
}

// == Input ==
async fn read_value(path: &Path) -> anyhow::Result<Value> {
    let text = if path == Path::new("-") {
        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .context("failed to read stdin")?;
        text
    } else {
        tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?
    };
    Value::parse_json(&text).with_context(|| format!("failed to parse {}", path.display()))
}

async fn read_object(path: &Path) -> anyhow::Result<Object> {
    match read_value(path).await? {
        Value::Map(object) => Ok(object.borrow().clone()),
        other => bail!("{} must hold an object, found {}", path.display(), other.type_name()),
    }
}

// == Output ==
fn to_output(value: &Value) -> anyhow::Result<serde_json::Value> {
    Ok(structkit::value::to_json(value)?.unwrap_or(serde_json::Value::Null))
}
