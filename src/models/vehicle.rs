//! Modelo de VehicleRecord
//!
//! Una fila del reporte de registros de vehículos: identificadores del
//! dispositivo, timestamps normalizados y los campos derivados por canal.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::connectivity::FreshnessCategory;

/// Identificadores de un dispositivo, ya normalizados
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    #[serde(rename = "IMEI")]
    pub imei: String,
    #[serde(rename = "VIN")]
    pub vin: Option<String>,
    pub license_plate: Option<String>,
}

/// Fila del reporte después del normalizador de timestamps
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    pub identity: DeviceIdentity,
    pub device_model: Option<String>,
    pub source: Option<String>,
    pub can_timestamp: Option<NaiveDateTime>,
    pub gps_timestamp: Option<NaiveDateTime>,
    pub last_update_utc: Option<NaiveDateTime>,
}

/// Registro de vehículo enriquecido con el estado de ambos canales
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleRecord {
    #[serde(flatten)]
    pub identity: DeviceIdentity,
    pub device_model: Option<String>,
    pub source: Option<String>,
    pub can_timestamp: Option<NaiveDateTime>,
    pub gps_timestamp: Option<NaiveDateTime>,
    pub last_update_utc: Option<NaiveDateTime>,
    /// Días desde el último dato CAN
    pub days_can: Option<i64>,
    pub estado_telemetria: FreshnessCategory,
    /// Días desde el último fix GPS
    pub days_gps: Option<i64>,
    pub gps_status_any: FreshnessCategory,
}

impl VehicleRecord {
    pub fn imei(&self) -> &str {
        &self.identity.imei
    }

    /// Identificadores disponibles para la búsqueda libre
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.identity.imei.as_str())
            .chain(self.identity.vin.as_deref())
            .chain(self.identity.license_plate.as_deref())
    }

    /// Telemetría o GPS fuera de "Conectado 0-2"
    pub fn has_problem(&self) -> bool {
        self.estado_telemetria.is_problem() || self.gps_status_any.is_problem()
    }
}
