use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result, anyhow};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{ETAG, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED};
use serde::{Deserialize, Serialize};

const CACHE_VERSION: u32 = 1;
const CACHE_DIR: &str = "matchday_terminal";
const CACHE_FILE: &str = "http_cache.json";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct HttpCacheFile {
    version: u32,
    entries: HashMap<String, CacheEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    body: String,
    etag: Option<String>,
    last_modified: Option<String>,
    fetched_at: u64,
}

/// Conditional-GET cache for JSON bodies.
///
/// The owner decides where (and whether) the cache is persisted; there is no
/// process-wide instance.
#[derive(Debug)]
pub struct HttpCache {
    path: Option<PathBuf>,
    file: Mutex<HttpCacheFile>,
}

impl HttpCache {
    /// Cache persisted under the user's cache directory, if one can be found.
    pub fn open_default() -> Self {
        match app_cache_dir() {
            Some(dir) => Self::open(dir.join(CACHE_FILE)),
            None => Self::in_memory(),
        }
    }

    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file = load_cache_file(&path);
        Self {
            path: Some(path),
            file: Mutex::new(file),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            path: None,
            file: Mutex::new(HttpCacheFile {
                version: CACHE_VERSION,
                entries: HashMap::new(),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.file
            .lock()
            .expect("http cache lock poisoned")
            .entries
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn fetch_json_cached(&self, client: &Client, url: &str) -> Result<String> {
        let cached_entry = {
            let guard = self.file.lock().expect("http cache lock poisoned");
            guard.entries.get(url).cloned()
        };

        let mut req = client.get(url);
        if let Some(entry) = cached_entry.as_ref() {
            if let Some(etag) = entry.etag.as_ref() {
                req = req.header(IF_NONE_MATCH, etag);
            }
            if let Some(last_modified) = entry.last_modified.as_ref() {
                req = req.header(IF_MODIFIED_SINCE, last_modified);
            }
        }

        let resp = req.send().context("request failed")?;
        let status = resp.status();
        let headers = resp.headers().clone();
        if status == StatusCode::NOT_MODIFIED {
            if let Some(entry) = cached_entry {
                tracing::debug!(url, "served from http cache");
                return Ok(entry.body);
            }
            return Err(anyhow!("received 304 without cache body"));
        }

        let body = resp.text().context("failed reading body")?;
        if !status.is_success() {
            return Err(anyhow!("http {}: {}", status, truncate(&body, 200)));
        }

        let etag = headers
            .get(ETAG)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());
        let last_modified = headers
            .get(LAST_MODIFIED)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());

        self.store(
            url,
            CacheEntry {
                body: body.clone(),
                etag,
                last_modified,
                fetched_at: system_time_to_secs(SystemTime::now()).unwrap_or_default(),
            },
        );
        Ok(body)
    }

    fn store(&self, key: &str, entry: CacheEntry) {
        let mut guard = self.file.lock().expect("http cache lock poisoned");
        guard.version = CACHE_VERSION;
        guard.entries.insert(key.to_string(), entry);
        if let Some(path) = self.path.as_deref() {
            if let Err(err) = save_cache_file(path, &guard) {
                tracing::warn!(error = %err, "failed to persist http cache");
            }
        }
    }
}

pub fn app_cache_dir() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(CACHE_DIR));
        }
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR))
}

fn load_cache_file(path: &Path) -> HttpCacheFile {
    let Ok(raw) = fs::read_to_string(path) else {
        return HttpCacheFile::default();
    };
    let cache = serde_json::from_str::<HttpCacheFile>(&raw).unwrap_or_default();
    if cache.version != CACHE_VERSION {
        return HttpCacheFile::default();
    }
    cache
}

fn save_cache_file(path: &Path, cache: &HttpCacheFile) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).ok();
    }
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string(cache).context("serialize http cache")?;
    fs::write(&tmp, json).context("write http cache")?;
    fs::rename(&tmp, path).context("swap http cache")?;
    Ok(())
}

fn truncate(body: &str, max: usize) -> &str {
    match body.char_indices().nth(max) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

fn system_time_to_secs(time: SystemTime) -> Option<u64> {
    time.duration_since(UNIX_EPOCH).ok().map(|d| d.as_secs())
}
