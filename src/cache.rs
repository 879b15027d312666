//! On-disk cache of directory responses.
//!
//! Each response is stored as a small JSON envelope holding the request URL
//! and the response body, at `<root>/<hh>/<sha256>.json` where `<sha256>` is
//! the hex digest of the URL and `<hh>` its first two characters. An entry is
//! fresh while its modification time is within the cache's maximum age.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use log::debug;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Default freshness of cached responses.
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(3600);

const ENTRY_EXTENSION: &str = "json";

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    url: String,
    body: String,
}

/// A response stored in the cache.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub url: String,
    pub path: PathBuf,
    pub size: u64,
    pub last_modified: Option<SystemTime>,
}

impl CacheEntry {
    /// Age relative to `now`; entries with unknown or future times count as
    /// age zero.
    pub fn age(&self, now: SystemTime) -> Duration {
        self.last_modified
            .and_then(|t| now.duration_since(t).ok())
            .unwrap_or_default()
    }
}

/// Directory-backed response cache.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    root: PathBuf,
    max_age: Duration,
}

impl ResponseCache {
    pub fn new(root: impl Into<PathBuf>, max_age: Duration) -> Self {
        Self {
            root: root.into(),
            max_age,
        }
    }

    /// The platform cache directory for dmrfill, e.g. `~/.cache/dmrfill`.
    pub fn default_root() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from(".dmrfill-cache"))
            .join("dmrfill")
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, url: &str) -> PathBuf {
        let digest = hex::encode(Sha256::digest(url.as_bytes()));
        self.root
            .join(&digest[..2])
            .join(format!("{}.{}", digest, ENTRY_EXTENSION))
    }

    /// Returns the cached body for `url` if there is a fresh entry.
    ///
    /// Stale, unreadable or foreign entries are treated as misses.
    pub fn get(&self, url: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(url);
        let Ok(meta) = fs::metadata(&path) else {
            return Ok(None);
        };
        let age = meta
            .modified()
            .ok()
            .and_then(|t| SystemTime::now().duration_since(t).ok())
            .unwrap_or_default();
        if age > self.max_age {
            debug!("Cache entry for {} is stale ({}s old)", url, age.as_secs());
            return Ok(None);
        }
        let raw = fs::read(&path)?;
        match serde_json::from_slice::<Envelope>(&raw) {
            Ok(envelope) if envelope.url == url => Ok(Some(envelope.body.into_bytes())),
            Ok(_) => Ok(None),
            Err(e) => {
                debug!("Ignoring unreadable cache entry {}: {}", path.display(), e);
                Ok(None)
            }
        }
    }

    /// Stores the body for `url`. Bodies that are not UTF-8 are not cached.
    pub fn put(&self, url: &str, body: &[u8]) -> Result<()> {
        let Ok(body) = std::str::from_utf8(body) else {
            debug!("Not caching non-text response from {}", url);
            return Ok(());
        };
        let path = self.path_for(url);
        let dir = path.parent().ok_or_else(|| Error::Cache {
            message: format!("invalid cache path {}", path.display()),
        })?;
        fs::create_dir_all(dir).map_err(|e| Error::Cache {
            message: format!("cannot create {}: {}", dir.display(), e),
        })?;
        let envelope = Envelope {
            url: url.to_string(),
            body: body.to_string(),
        };
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec(&envelope)?)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    /// Lists all entries, sorted by URL. A missing root has no entries.
    pub fn entries(&self) -> Result<Vec<CacheEntry>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for item in WalkDir::new(&self.root).min_depth(2).max_depth(2) {
            let item = item.map_err(|e| Error::Cache {
                message: e.to_string(),
            })?;
            let path = item.path();
            if !item.file_type().is_file()
                || path.extension().and_then(|e| e.to_str()) != Some(ENTRY_EXTENSION)
            {
                continue;
            }
            let Ok(meta) = item.metadata() else {
                continue;
            };
            let url = fs::read(path)
                .ok()
                .and_then(|raw| serde_json::from_slice::<Envelope>(&raw).ok())
                .map(|e| e.url)
                .unwrap_or_else(|| "(unreadable)".to_string());
            entries.push(CacheEntry {
                url,
                path: path.to_path_buf(),
                size: meta.len(),
                last_modified: meta.modified().ok(),
            });
        }
        entries.sort_by(|a, b| a.url.cmp(&b.url).then_with(|| a.path.cmp(&b.path)));
        Ok(entries)
    }

    pub fn remove(&self, entry: &CacheEntry) -> Result<()> {
        fs::remove_file(&entry.path).map_err(|e| Error::Cache {
            message: format!("cannot delete {}: {}", entry.path.display(), e),
        })
    }
}

/// Parses a duration such as `30s`, `15m`, `1h`, `7d` or `2w`.
pub fn parse_duration(text: &str) -> Result<Duration> {
    let invalid = |message: String| Error::Config {
        message,
        hint: Some("Use a number followed by a unit (s, m, h, d, w), e.g. '1h' or '7d'".to_string()),
    };
    let text = text.trim().to_lowercase();
    if text.is_empty() {
        return Err(invalid("duration cannot be empty".to_string()));
    }
    let split = text
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(text.len());
    if split == 0 {
        return Err(invalid(format!("duration '{}' must start with a number", text)));
    }
    let (number, unit) = text.split_at(split);
    let number: f64 = number
        .parse()
        .map_err(|_| invalid(format!("invalid number in duration '{}'", text)))?;
    let seconds = match unit {
        "s" | "sec" | "second" | "seconds" => number,
        "m" | "min" | "minute" | "minutes" => number * 60.0,
        "h" | "hr" | "hour" | "hours" => number * 3600.0,
        "d" | "day" | "days" => number * 86400.0,
        "w" | "week" | "weeks" => number * 604800.0,
        _ => return Err(invalid(format!("invalid duration unit '{}'", unit))),
    };
    Ok(Duration::from_secs(seconds as u64))
}

/// Formats a byte count for humans.
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", bytes, UNITS[unit_idx])
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}
