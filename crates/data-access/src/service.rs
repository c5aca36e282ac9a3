//! The session data cache.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use projection::CoordinateField;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};
use visor_common::{Alert, CacheKey};
use visor_protocol::VisorApi;

use crate::cache::{store_for, CacheStore};
use crate::config::DataAccessConfig;
use crate::error::Result;
use crate::loader::{assemble, coordinate_names, load_coordinates, load_payload, VisorData};

/// A cached load result; `None` records a failed load.
pub type CacheEntry = Option<Arc<VisorData>>;

type PendingLoad = Shared<BoxFuture<'static, CacheEntry>>;

/// Coordinate cache key: `(domain, instance, coordx, coordy)`.
type CoordKey = (String, String, String, String);

/// Notifications published while loading.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheEvent {
    LoadingStarted { key: CacheKey },
    /// Sent after every started load, successful or not.
    LoadingEnded { key: CacheKey, ok: bool },
    Alert(Alert),
}

/// Cache counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Loads that joined a fetch already in flight.
    pub coalesced: u64,
    pub entries: usize,
    /// Entries recording a failed load.
    pub negative_entries: usize,
    pub evictions: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses + self.coalesced;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

struct Inner {
    api: Arc<dyn VisorApi>,
    config: DataAccessConfig,
    store: Mutex<Box<dyn CacheStore<CacheEntry>>>,
    in_flight: Mutex<HashMap<CacheKey, PendingLoad>>,
    coords: Mutex<HashMap<CoordKey, Arc<CoordinateField>>>,
    events: broadcast::Sender<CacheEvent>,
    hits: AtomicU64,
    misses: AtomicU64,
    coalesced: AtomicU64,
}

/// Memoizing loader for `(domain, instance, variable)` triples.
///
/// A key is fetched at most once per session: successes and failures are
/// both cached, and concurrent loads of one key share a single fetch.
/// Cheap to clone; clones share the cache.
#[derive(Clone)]
pub struct DataCache {
    inner: Arc<Inner>,
}

impl DataCache {
    pub fn new(api: Arc<dyn VisorApi>, config: DataAccessConfig) -> Self {
        let (events, _) = broadcast::channel(64);
        let store = store_for(config.cache_capacity);
        Self {
            inner: Arc::new(Inner {
                api,
                config,
                store: Mutex::new(store),
                in_flight: Mutex::new(HashMap::new()),
                coords: Mutex::new(HashMap::new()),
                events,
                hits: AtomicU64::new(0),
                misses: AtomicU64::new(0),
                coalesced: AtomicU64::new(0),
            }),
        }
    }

    pub fn api(&self) -> Arc<dyn VisorApi> {
        self.inner.api.clone()
    }

    pub fn config(&self) -> &DataAccessConfig {
        &self.inner.config
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.inner.events.subscribe()
    }

    /// Load one variable. Never fails: any failure resolves to `None`,
    /// which is cached like a success.
    pub async fn load(&self, domain: &str, instance: &str, variable: &str) -> CacheEntry {
        let key = match CacheKey::new(domain, instance, variable) {
            Ok(key) => key,
            Err(err) => {
                warn!(domain, instance, variable, error = %err, "Invalid cache key");
                return None;
            }
        };
        self.load_key(&key).await
    }

    pub async fn load_key(&self, key: &CacheKey) -> CacheEntry {
        if let Some(entry) = self.inner.store.lock().await.get(key) {
            self.inner.hits.fetch_add(1, Ordering::Relaxed);
            debug!(key = %key, negative = entry.is_none(), "Cache hit");
            return entry;
        }

        let pending = {
            let mut in_flight = self.inner.in_flight.lock().await;
            if let Some(pending) = in_flight.get(key) {
                self.inner.coalesced.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key, "Joining in-flight load");
                pending.clone()
            } else {
                // The leader may have finished between the two lookups.
                if let Some(entry) = self.inner.store.lock().await.get(key) {
                    self.inner.hits.fetch_add(1, Ordering::Relaxed);
                    return entry;
                }
                self.inner.misses.fetch_add(1, Ordering::Relaxed);
                let pending = Self::fetch(self.inner.clone(), key.clone())
                    .boxed()
                    .shared();
                in_flight.insert(key.clone(), pending.clone());
                pending
            }
        };

        pending.await
    }

    /// Cached entry without fetching.
    pub async fn peek(&self, key: &CacheKey) -> Option<CacheEntry> {
        self.inner.store.lock().await.get(key)
    }

    pub async fn stats(&self) -> CacheStats {
        let store = self.inner.store.lock().await;
        CacheStats {
            hits: self.inner.hits.load(Ordering::Relaxed),
            misses: self.inner.misses.load(Ordering::Relaxed),
            coalesced: self.inner.coalesced.load(Ordering::Relaxed),
            entries: store.len(),
            negative_entries: store.count_where(&|entry: &CacheEntry| entry.is_none()),
            evictions: store.evictions(),
        }
    }

    /// Drop every cached entry, including coordinate fields.
    pub async fn clear(&self) {
        self.inner.store.lock().await.clear();
        self.inner.coords.lock().await.clear();
        info!("Cleared data cache");
    }

    async fn fetch(inner: Arc<Inner>, key: CacheKey) -> CacheEntry {
        let _ = inner
            .events
            .send(CacheEvent::LoadingStarted { key: key.clone() });
        info!(key = %key, "Loading variable");

        let entry = match Self::build(&inner, &key).await {
            Ok(data) => {
                debug!(
                    key = %key,
                    shape = ?data.payload.shape(),
                    sources = data.source_axis_len(),
                    "Loaded variable"
                );
                Some(Arc::new(data))
            }
            Err(err) => {
                warn!(key = %key, error = %err, "Load failed, caching negative entry");
                let _ = inner
                    .events
                    .send(CacheEvent::Alert(err.alert(key.variable())));
                None
            }
        };

        inner.store.lock().await.insert(key.clone(), entry.clone());
        inner.in_flight.lock().await.remove(&key);
        let _ = inner.events.send(CacheEvent::LoadingEnded {
            key,
            ok: entry.is_some(),
        });
        entry
    }

    async fn build(inner: &Inner, key: &CacheKey) -> Result<VisorData> {
        let api = inner.api.as_ref();
        let payload = load_payload(api, key).await?;
        let (coordx, coordy) = coordinate_names(&payload)?;
        let coords = Self::coordinates(inner, key, &coordx, &coordy).await?;
        Ok(assemble(api, &inner.config, key, payload, coords).await)
    }

    async fn coordinates(
        inner: &Inner,
        key: &CacheKey,
        coordx: &str,
        coordy: &str,
    ) -> Result<Arc<CoordinateField>> {
        let coord_key = (
            key.domain().to_string(),
            key.instance().to_string(),
            coordx.to_string(),
            coordy.to_string(),
        );
        if let Some(field) = inner.coords.lock().await.get(&coord_key) {
            return Ok(field.clone());
        }

        let field = Arc::new(
            load_coordinates(
                inner.api.as_ref(),
                key.domain(),
                key.instance(),
                coordx,
                coordy,
            )
            .await?,
        );
        debug!(
            domain = key.domain(),
            instance = key.instance(),
            coordx,
            coordy,
            "Cached coordinate field"
        );
        inner.coords.lock().await.insert(coord_key, field.clone());
        Ok(field)
    }
}
