//! Cache
//!
//! Este módulo contiene el cache de snapshots con expiración explícita.

pub mod cache_config;
pub mod snapshot_cache;

pub use cache_config::CacheConfig;
pub use snapshot_cache::{Clock, ManualClock, SnapshotCache, SystemClock};
