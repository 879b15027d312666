//! # Cache Command Implementation
//!
//! This module implements the `cache` subcommand, which manages the on-disk
//! cache of directory responses used by `fill`.
//!
//! ## Subcommands
//!
//! - **`list`**: Display all cached responses with their size and age
//! - **`clean`**: Remove cached responses based on filters (--all, --older-than)

use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;

use dmrfill::cache::{format_size, parse_duration, CacheEntry, ResponseCache, DEFAULT_MAX_AGE};

/// Manage the directory response cache
#[derive(Args, Debug)]
pub struct CacheArgs {
    /// The directory holding cached responses.
    ///
    /// If not provided, it defaults to the system's cache directory
    /// (e.g., `~/.cache/dmrfill` on Linux).
    #[arg(long, value_name = "DIR", env = "DMRFILL_CACHE")]
    pub cache_dir: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: CacheSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum CacheSubcommand {
    /// List all cached responses
    List(ListArgs),
    /// Remove cached responses
    Clean(CleanArgs),
}

/// Arguments for the cache list command
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the cache clean command
#[derive(Args, Debug)]
pub struct CleanArgs {
    /// Show what would be deleted without actually deleting anything
    #[arg(long)]
    pub dry_run: bool,

    /// Delete all cached responses
    #[arg(long)]
    pub all: bool,

    /// Delete entries older than the specified duration
    ///
    /// Duration format: number followed by unit (s, m, h, d, w)
    /// Examples: "30m", "1h", "7d", "2w"
    #[arg(long, value_name = "DURATION")]
    pub older_than: Option<String>,
}

#[derive(Debug, Serialize)]
struct JsonEntry<'a> {
    url: &'a str,
    path: String,
    size: u64,
    age_secs: u64,
}

/// Execute the `cache` command.
pub fn execute(args: CacheArgs) -> Result<()> {
    let root = args.cache_dir.unwrap_or_else(ResponseCache::default_root);
    let cache = ResponseCache::new(root, DEFAULT_MAX_AGE);
    match args.command {
        CacheSubcommand::List(list_args) => execute_list(&cache, list_args),
        CacheSubcommand::Clean(clean_args) => execute_clean(&cache, clean_args),
    }
}

/// Execute the `cache list` command.
fn execute_list(cache: &ResponseCache, args: ListArgs) -> Result<()> {
    let entries = cache
        .entries()
        .with_context(|| format!("Unable to read cache {}", cache.root().display()))?;
    let now = SystemTime::now();

    if args.json {
        let json: Vec<JsonEntry> = entries
            .iter()
            .map(|e| JsonEntry {
                url: &e.url,
                path: e.path.display().to_string(),
                size: e.size,
                age_secs: e.age(now).as_secs(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No cached responses found in: {}", cache.root().display());
        return Ok(());
    }

    println!("Cached responses in {}:\n", cache.root().display());
    println!("{:>10} {:>8}  URL", "SIZE", "AGE");
    println!("{}", "-".repeat(80));
    for entry in &entries {
        println!(
            "{:>10} {:>8}  {}",
            format_size(entry.size),
            format_age(entry.age(now)),
            entry.url
        );
    }
    let total: u64 = entries.iter().map(|e| e.size).sum();
    println!(
        "\nTotal: {} cached responses ({})",
        entries.len(),
        format_size(total)
    );
    Ok(())
}

/// Execute the `cache clean` command.
fn execute_clean(cache: &ResponseCache, args: CleanArgs) -> Result<()> {
    if !args.all && args.older_than.is_none() {
        return Err(dmrfill::suggestions::cache_clean_no_filter());
    }
    let older_than = args
        .older_than
        .as_deref()
        .map(parse_duration)
        .transpose()
        .context("Invalid --older-than duration")?;

    let entries = cache
        .entries()
        .with_context(|| format!("Unable to read cache {}", cache.root().display()))?;
    let selected = select_for_cleanup(&entries, args.all, older_than, SystemTime::now());
    if selected.is_empty() {
        println!("No cache entries match the specified criteria.");
        return Ok(());
    }

    let total: u64 = selected.iter().map(|e| e.size).sum();
    if args.dry_run {
        println!("Cache entries that would be deleted:\n");
        for entry in &selected {
            println!("  {} ({})", entry.url, format_size(entry.size));
        }
        println!(
            "\nTotal: {} entries ({})\nDry run mode - no changes were made.",
            selected.len(),
            format_size(total)
        );
        return Ok(());
    }

    let mut deleted = 0;
    let mut failed = 0;
    for entry in &selected {
        match cache.remove(entry) {
            Ok(()) => deleted += 1,
            Err(e) => {
                failed += 1;
                eprintln!("Failed to delete {}: {}", entry.path.display(), e);
            }
        }
    }
    println!("Deleted {} cache entries ({}).", deleted, format_size(total));
    if failed > 0 {
        anyhow::bail!("Failed to delete {} cache entries", failed);
    }
    Ok(())
}

/// Entries to delete: everything with `all`, otherwise those at least
/// `older_than` old. Entries with an unknown time count as old.
fn select_for_cleanup(
    entries: &[CacheEntry],
    all: bool,
    older_than: Option<Duration>,
    now: SystemTime,
) -> Vec<CacheEntry> {
    entries
        .iter()
        .filter(|entry| {
            if all {
                return true;
            }
            match (older_than, entry.last_modified) {
                (Some(_), None) => true,
                (Some(threshold), Some(_)) => entry.age(now) >= threshold,
                (None, _) => false,
            }
        })
        .cloned()
        .collect()
}

/// Format an age compactly, e.g. `45s`, `12m`, `3h`, `2d`.
fn format_age(age: Duration) -> String {
    let secs = age.as_secs();
    match secs {
        0..=59 => format!("{}s", secs),
        60..=3599 => format!("{}m", secs / 60),
        3600..=86399 => format!("{}h", secs / 3600),
        _ => format!("{}d", secs / 86400),
    }
}
