//! Configuración de cache
//!
//! Este módulo contiene la configuración para el cache de reporte y roster.

use serde::{Deserialize, Serialize};

/// Configuración del cache
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Vigencia de un snapshot cargado
    pub ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: 300, // 5 minutos
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> chrono::Duration {
        // Tope de 10 años para no desbordar chrono::Duration
        chrono::Duration::seconds(self.ttl_seconds.min(315_360_000) as i64)
    }
}
