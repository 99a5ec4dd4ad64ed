use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use kura::cache::DiskCache;
use kura::config::Config;
use std::io::Write;
use std::path::PathBuf;

/// Default lifetime for entries written from the command line (one hour)
const DEFAULT_TTL_MILLIS: i64 = 60 * 60 * 1000;

/// Kura - disk-resident key/value cache
#[derive(Parser, Debug)]
#[command(name = "kura")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Cache root directory (overrides the configuration file)
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Disk budget in bytes (overrides the configuration file)
    #[arg(long)]
    max_size: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print cache statistics as JSON
    Stats,
    /// List cached keys from least to most recently used
    Keys,
    /// Report whether a key is indexed
    Has { key: String },
    /// Write a cached payload to stdout
    Get {
        key: String,
        /// Print the entry metadata as JSON instead of the payload
        #[arg(long)]
        meta: bool,
    },
    /// Store a payload
    Put {
        key: String,
        /// Payload given inline
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        value: Option<String>,
        /// Read the payload from a file
        #[arg(long)]
        file: Option<PathBuf>,
        /// Lifetime in milliseconds; negative stores an already expired entry
        #[arg(long, default_value_t = DEFAULT_TTL_MILLIS, allow_negative_numbers = true)]
        ttl_ms: i64,
    },
    /// Mark an entry as needing refresh
    Invalidate {
        key: String,
        /// Expire the entry as well
        #[arg(long)]
        full: bool,
    },
    /// Delete an entry
    Remove { key: String },
    /// Delete every cached file
    Clear,
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => Config::default(),
    };

    if let Some(dir) = &args.cache_dir {
        config.cache.cache_dir = dir.clone();
    }
    if let Some(max_size) = args.max_size {
        config.cache.max_cache_size_bytes = max_size;
    }

    config
        .validate()
        .map_err(anyhow::Error::msg)
        .context("Invalid configuration")?;
    Ok(config)
}

fn run(cache: &DiskCache, command: Command) -> Result<()> {
    let mut stdout = std::io::stdout().lock();

    match command {
        Command::Stats => {
            serde_json::to_writer_pretty(&mut stdout, &cache.stats())?;
            writeln!(stdout)?;
        }
        Command::Keys => {
            for key in cache.keys() {
                writeln!(stdout, "{}", key)?;
            }
        }
        Command::Has { key } => {
            writeln!(stdout, "{}", cache.has(&key))?;
        }
        Command::Get { key, meta } => {
            let Some(entry) = cache.get(&key) else {
                bail!("No fresh entry for key '{}'", key);
            };
            if meta {
                let header = cache
                    .header(&key)
                    .with_context(|| format!("Entry for '{}' disappeared", key))?;
                serde_json::to_writer_pretty(&mut stdout, &header)?;
                writeln!(stdout)?;
            } else {
                stdout.write_all(&entry.data)?;
            }
        }
        Command::Put {
            key,
            value,
            file,
            ttl_ms,
        } => {
            let data = match (value, file) {
                (Some(value), _) => value.into_bytes(),
                (None, Some(path)) => std::fs::read(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                (None, None) => bail!("Either --value or --file is required"),
            };
            cache
                .put(&key, data, ttl_ms)
                .with_context(|| format!("Failed to store '{}'", key))?;
        }
        Command::Invalidate { key, full } => {
            cache
                .invalidate(&key, full)
                .with_context(|| format!("Failed to invalidate '{}'", key))?;
        }
        Command::Remove { key } => cache.remove(&key),
        Command::Clear => cache.clear(),
    }

    stdout.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;

    kura::logging::init_subscriber(&config.logging)
        .map_err(|e| anyhow::anyhow!(e))
        .context("Failed to initialize logging subsystem")?;

    tracing::debug!(
        cache_dir = %config.cache.cache_dir.display(),
        max_cache_size_bytes = config.cache.max_cache_size_bytes,
        "Configuration loaded successfully"
    );

    let cache = DiskCache::new(config.cache)?;
    cache.initialize();

    run(&cache, args.command)
}
