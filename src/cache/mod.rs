use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::provider::{DynProvider, Provider};
use crate::wire::ChatRequest;

/// Short-lived memo of replies keyed by the serialized conversation.
pub trait ReplyCache: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn put(&self, key: &str, reply: &str);
}

pub type DynCache = Arc<dyn ReplyCache>;

/// Cache that never remembers anything (`--no-cache`).
pub struct NoCache;

impl ReplyCache for NoCache {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn put(&self, _key: &str, _reply: &str) {}
}

struct Entry {
    reply: String,
    stored_at: Instant,
}

/// In-memory cache whose entries expire `ttl` after being stored.
pub struct TtlCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, Entry>>,
}

impl TtlCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entries: Mutex::new(HashMap::new()) }
    }

    fn get_at(&self, key: &str, now: Instant) -> Option<String> {
        let mut entries = self.entries.lock();
        // drop everything stale while we hold the lock
        entries.retain(|_, e| now.saturating_duration_since(e.stored_at) < self.ttl);
        entries.get(key).map(|e| e.reply.clone())
    }

    fn put_at(&self, key: &str, reply: &str, now: Instant) {
        self.entries
            .lock()
            .insert(key.to_string(), Entry { reply: reply.to_string(), stored_at: now });
    }
}

impl ReplyCache for TtlCache {
    fn get(&self, key: &str) -> Option<String> {
        self.get_at(key, Instant::now())
    }

    fn put(&self, key: &str, reply: &str) {
        self.put_at(key, reply, Instant::now())
    }
}

pub fn make_cache(ttl_secs: u64, disabled: bool) -> DynCache {
    if disabled || ttl_secs == 0 {
        Arc::new(NoCache)
    } else {
        Arc::new(TtlCache::new(Duration::from_secs(ttl_secs)))
    }
}

/// Provider wrapper that consults a [`ReplyCache`] before the real call.
/// Only successful replies are stored.
pub struct CachedProvider {
    inner: DynProvider,
    cache: DynCache,
}

impl CachedProvider {
    pub fn new(inner: DynProvider, cache: DynCache) -> Self {
        Self { inner, cache }
    }
}

#[async_trait]
impl Provider for CachedProvider {
    async fn complete(&self, req: &ChatRequest) -> anyhow::Result<String> {
        let key = req.messages.cache_key();
        if let Some(hit) = self.cache.get(&key) {
            log::debug!("reply cache hit ({} messages)", req.messages.len());
            return Ok(hit);
        }
        log::debug!("reply cache miss ({} messages)", req.messages.len());
        let reply = self.inner.complete(req).await?;
        self.cache.put(&key, &reply);
        Ok(reply)
    }
}
