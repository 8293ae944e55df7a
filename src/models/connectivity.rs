//! Categorías de frescura de conectividad
//!
//! Cuatro rangos ordenados, del más fresco al más antiguo. El orden del enum
//! es el orden canónico usado en histogramas y ordenamientos.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Rango de antigüedad de la última señal de un canal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum FreshnessCategory {
    /// 0 a 2 días (incluye fechas futuras)
    #[serde(rename = "Conectado 0-2")]
    Conectado = 0,
    /// 3 a 14 días
    #[serde(rename = "Intermitente 3-14")]
    Intermitente = 1,
    /// 15 a 30 días
    #[serde(rename = "Limitado 15-30+")]
    Limitado = 2,
    /// 31 días o más, o sin timestamp
    #[serde(rename = "Desconectado 31+")]
    Desconectado = 3,
}

impl FreshnessCategory {
    /// Todas las categorías en orden canónico
    pub const ALL: [FreshnessCategory; 4] = [
        FreshnessCategory::Conectado,
        FreshnessCategory::Intermitente,
        FreshnessCategory::Limitado,
        FreshnessCategory::Desconectado,
    ];

    /// La categoría asignada a un canal sin señal
    pub const STALEST: FreshnessCategory = FreshnessCategory::Desconectado;

    /// Posición en el orden canónico (0 = más fresco)
    pub fn ordinal(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            FreshnessCategory::Conectado => "Conectado 0-2",
            FreshnessCategory::Intermitente => "Intermitente 3-14",
            FreshnessCategory::Limitado => "Limitado 15-30+",
            FreshnessCategory::Desconectado => "Desconectado 31+",
        }
    }

    /// Cualquier categoría distinta de "Conectado" requiere seguimiento
    pub fn is_problem(self) -> bool {
        self != FreshnessCategory::Conectado
    }
}

impl fmt::Display for FreshnessCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
