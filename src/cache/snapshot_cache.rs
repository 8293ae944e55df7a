//! Cache de snapshots con expiración
//!
//! Guarda pares (valor, momento de carga) por clave. El reloj se inyecta
//! para poder probar la expiración sin esperar.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::cache::cache_config::CacheConfig;

/// Fuente de la hora actual
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Reloj del sistema
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Reloj controlado manualmente, para pruebas y reprocesos
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Valor en cache con su momento de carga
#[derive(Debug)]
pub struct CacheEntry<V> {
    pub value: Arc<V>,
    pub fetched_at: DateTime<Utc>,
}

impl<V> Clone for CacheEntry<V> {
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
            fetched_at: self.fetched_at,
        }
    }
}

impl<V> CacheEntry<V> {
    /// Expira cuando ha pasado `ttl` o más desde la carga
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.fetched_at >= ttl
    }
}

/// Estadísticas del cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries_created: u64,
    pub entries_expired: u64,
}

/// Almacén con clave de snapshots (reporte, roster) con TTL explícito
pub struct SnapshotCache<K, V> {
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
    stats: RwLock<CacheStats>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<K, V> SnapshotCache<K, V>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
{
    pub fn new(config: &CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            stats: RwLock::new(CacheStats::default()),
            ttl: config.ttl(),
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn is_expired(&self, entry: &CacheEntry<V>) -> bool {
        entry.is_expired(self.clock.now(), self.ttl)
    }

    /// Valor vigente para la clave; una entrada vencida se elimina y cuenta como miss
    pub async fn get(&self, key: &K) -> Option<CacheEntry<V>> {
        let mut entries = self.entries.write().await;
        let mut stats = self.stats.write().await;

        let expired = entries.get(key).map(|entry| self.is_expired(entry));
        match expired {
            Some(true) => {
                entries.remove(key);
                stats.entries_expired += 1;
                stats.misses += 1;
                debug!("Cache miss (expirado) para {:?}", key);
                None
            }
            Some(false) => {
                stats.hits += 1;
                debug!("Cache hit para {:?}", key);
                entries.get(key).cloned()
            }
            None => {
                stats.misses += 1;
                debug!("Cache miss para {:?}", key);
                None
            }
        }
    }

    pub async fn insert(&self, key: K, value: V) -> CacheEntry<V> {
        let entry = CacheEntry {
            value: Arc::new(value),
            fetched_at: self.clock.now(),
        };

        self.entries.write().await.insert(key, entry.clone());
        self.stats.write().await.entries_created += 1;
        entry
    }

    pub async fn invalidate(&self, key: &K) -> bool {
        self.entries.write().await.remove(key).is_some()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
        info!("Cache de snapshots limpiado completamente");
    }

    /// Elimina las entradas vencidas y devuelve cuántas se quitaron
    pub async fn cleanup_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now, self.ttl));
        let removed = before - entries.len();

        if removed > 0 {
            self.stats.write().await.entries_expired += removed as u64;
            info!("Cache cleanup: {} entradas expiradas eliminadas", removed);
        }
        removed
    }

    pub async fn stats(&self) -> CacheStats {
        *self.stats.read().await
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn setup(ttl_seconds: u64) -> (Arc<ManualClock>, SnapshotCache<String, Vec<u32>>) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap(),
        ));
        let config = CacheConfig { ttl_seconds };
        let cache = SnapshotCache::new(&config, clock.clone());
        (clock, cache)
    }

    #[tokio::test]
    async fn test_cache_basic_operations() {
        let (_clock, cache) = setup(300);
        let key = "reporte".to_string();

        assert!(cache.get(&key).await.is_none());
        cache.insert(key.clone(), vec![1, 2, 3]).await;

        let cached = cache.get(&key).await.unwrap();
        assert_eq!(*cached.value, vec![1, 2, 3]);

        let stats = cache.stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries_created, 1);
    }

    #[tokio::test]
    async fn test_entry_expires_after_ttl() {
        let (clock, cache) = setup(300);
        let key = "roster".to_string();
        cache.insert(key.clone(), vec![7]).await;

        clock.advance(Duration::seconds(299));
        assert!(cache.get(&key).await.is_some());

        clock.advance(Duration::seconds(1));
        assert!(cache.get(&key).await.is_none());
        assert_eq!(cache.len().await, 0);
        assert_eq!(cache.stats().await.entries_expired, 1);
    }

    #[tokio::test]
    async fn test_cleanup_and_invalidate() {
        let (clock, cache) = setup(60);
        cache.insert("a".to_string(), vec![]).await;
        clock.advance(Duration::seconds(30));
        cache.insert("b".to_string(), vec![]).await;
        clock.advance(Duration::seconds(30));

        assert_eq!(cache.cleanup_expired().await, 1);
        assert_eq!(cache.len().await, 1);

        assert!(cache.invalidate(&"b".to_string()).await);
        assert!(!cache.invalidate(&"b".to_string()).await);
        assert_eq!(cache.len().await, 0);
    }

    #[test]
    fn test_is_expired_predicate() {
        let loaded = Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap();
        let entry = CacheEntry {
            value: Arc::new(()),
            fetched_at: loaded,
        };
        let ttl = Duration::minutes(5);
        assert!(!entry.is_expired(loaded + Duration::minutes(4), ttl));
        assert!(entry.is_expired(loaded + Duration::minutes(5), ttl));
    }
}
