//! Response cache.
//!
//! Bodies of successful GETs keyed by URL. A byte-bounded memory layer holds
//! the most recent bodies; an optional directory persists every body so later
//! runs can reuse them.

use std::collections::{HashMap, VecDeque};
use std::hash::Hasher;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use fnv::FnvHasher;
use tokio::sync::RwLock;

use crate::config::CACHE_MEMORY_BUDGET_BYTES;

/// Recent bodies, evicted oldest-first once `budget` bytes are exceeded.
struct MemoryLayer {
    entries: HashMap<String, Arc<str>>,
    order: VecDeque<String>,
    bytes: usize,
    budget: usize,
}

impl MemoryLayer {
    fn new(budget: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            bytes: 0,
            budget,
        }
    }

    fn insert(&mut self, url: &str, body: Arc<str>) {
        if let Some(old) = self.entries.remove(url) {
            self.bytes -= old.len();
            self.order.retain(|u| u != url);
        }
        // Too large to keep; disk still has it when configured
        if body.len() > self.budget {
            return;
        }
        while self.bytes + body.len() > self.budget {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            if let Some(evicted) = self.entries.remove(&oldest) {
                self.bytes -= evicted.len();
            }
        }
        self.bytes += body.len();
        self.order.push_back(url.to_string());
        self.entries.insert(url.to_string(), body);
    }
}

/// Response cache with a bounded memory layer and an optional on-disk layer.
///
/// Disk entries are named by an FNV hash of the URL. The URL itself is stored
/// on the first line and compared on read, so a hash collision is a miss.
pub struct ResponseCache {
    memory: RwLock<MemoryLayer>,
    dir: Option<PathBuf>,
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self {
            memory: RwLock::new(MemoryLayer::new(CACHE_MEMORY_BUDGET_BYTES)),
            dir: None,
        }
    }
}

impl ResponseCache {
    /// Memory-only cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache backed by `dir`. The directory is created if missing.
    pub async fn with_dir(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self {
            dir: Some(dir),
            ..Self::default()
        })
    }

    /// Caps the memory layer at `bytes` of body text. 0 disables it.
    pub fn with_memory_budget(self, bytes: usize) -> Self {
        Self {
            memory: RwLock::new(MemoryLayer::new(bytes)),
            ..self
        }
    }

    pub async fn get(&self, url: &str) -> Option<Arc<str>> {
        if let Some(body) = self.memory.read().await.entries.get(url) {
            return Some(Arc::clone(body));
        }

        let dir = self.dir.as_ref()?;
        let body: Arc<str> = read_entry(&entry_path(dir, url), url).await?.into();
        self.memory.write().await.insert(url, Arc::clone(&body));
        Some(body)
    }

    /// Stores `body`. Disk write failures are logged and otherwise ignored.
    pub async fn put(&self, url: &str, body: Arc<str>) {
        if let Some(dir) = &self.dir {
            let contents = format!("{}\n{}", url, body);
            let path = entry_path(dir, url);
            if let Err(e) = tokio::fs::write(&path, contents).await {
                log::warn!("Failed to write cache entry {}: {}", path.display(), e);
            }
        }
        self.memory.write().await.insert(url, body);
    }

    /// Entries currently held in memory.
    pub async fn len(&self) -> usize {
        self.memory.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.memory.read().await.entries.is_empty()
    }

    /// Body bytes currently held in memory.
    pub async fn memory_bytes(&self) -> usize {
        self.memory.read().await.bytes
    }
}

fn cache_key(url: &str) -> u64 {
    let mut hasher = FnvHasher::default();
    hasher.write(url.as_bytes());
    hasher.finish()
}

fn entry_path(dir: &Path, url: &str) -> PathBuf {
    dir.join(format!("{:016x}.html", cache_key(url)))
}

async fn read_entry(path: &Path, url: &str) -> Option<String> {
    let contents = tokio::fs::read_to_string(path).await.ok()?;
    let (stored_url, body) = contents.split_once('\n')?;
    if stored_url != url {
        log::debug!("Cache key collision for {}", url);
        return None;
    }
    Some(body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_roundtrip() {
        let cache = ResponseCache::new();
        assert!(cache.get("https://x.test/a").await.is_none());
        cache.put("https://x.test/a", Arc::from("<html>a</html>")).await;
        assert_eq!(
            cache.get("https://x.test/a").await.as_deref(),
            Some("<html>a</html>")
        );
        assert!(cache.get("https://x.test/b").await.is_none());
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_disk_entries_survive_new_instance() {
        let dir = tempfile::tempdir().expect("tempdir");
        {
            let cache = ResponseCache::with_dir(dir.path()).await.expect("cache");
            cache.put("https://x.test/a", Arc::from("line1\nline2")).await;
        }
        let cache = ResponseCache::with_dir(dir.path()).await.expect("cache");
        assert_eq!(
            cache.get("https://x.test/a").await.as_deref(),
            Some("line1\nline2")
        );
    }

    #[tokio::test]
    async fn test_disk_entry_with_other_url_is_a_miss() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = entry_path(dir.path(), "https://x.test/a");
        tokio::fs::write(&path, "https://x.test/other\nbody")
            .await
            .expect("write");
        let cache = ResponseCache::with_dir(dir.path()).await.expect("cache");
        assert!(cache.get("https://x.test/a").await.is_none());
    }

    #[tokio::test]
    async fn test_memory_layer_evicts_oldest_past_budget() {
        let cache = ResponseCache::new().with_memory_budget(10);
        cache.put("https://x.test/a", Arc::from("aaaa")).await;
        cache.put("https://x.test/b", Arc::from("bbbb")).await;
        cache.put("https://x.test/c", Arc::from("cccc")).await;

        assert_eq!(cache.len().await, 2);
        assert_eq!(cache.memory_bytes().await, 8);
        assert!(cache.get("https://x.test/a").await.is_none());
        assert_eq!(cache.get("https://x.test/c").await.as_deref(), Some("cccc"));
    }

    #[tokio::test]
    async fn test_replacing_entry_does_not_double_count() {
        let cache = ResponseCache::new().with_memory_budget(10);
        cache.put("https://x.test/a", Arc::from("aaaa")).await;
        cache.put("https://x.test/a", Arc::from("aaaaaa")).await;
        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.memory_bytes().await, 6);
    }

    #[tokio::test]
    async fn test_oversized_body_skips_memory_but_reaches_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = ResponseCache::with_dir(dir.path())
            .await
            .expect("cache")
            .with_memory_budget(4);
        cache.put("https://x.test/big", Arc::from("0123456789")).await;

        assert!(cache.is_empty().await);
        assert_eq!(
            cache.get("https://x.test/big").await.as_deref(),
            Some("0123456789")
        );
    }

    #[test]
    fn test_cache_key_is_stable() {
        assert_eq!(cache_key("https://x.test/a"), cache_key("https://x.test/a"));
        assert_ne!(cache_key("https://x.test/a"), cache_key("https://x.test/b"));
    }
}
