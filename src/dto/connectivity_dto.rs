use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::analytics::{CategoryHistogram, ChannelKpi, HistogramBar};
use crate::models::connectivity::FreshnessCategory;
use crate::models::vehicle::VehicleRecord;
use crate::utils::validation::validate_search_text;

pub const MAX_PROBLEM_LIMIT: usize = 5000;

// Query de búsqueda del resumen
#[derive(Debug, Default, Deserialize, Validate)]
pub struct SummaryQuery {
    #[validate(length(max = 64), custom = "validate_search_text")]
    pub q: Option<String>,
}

// Query de la tabla de unidades con problemas
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ProblemsQuery {
    #[validate(length(max = 64), custom = "validate_search_text")]
    pub q: Option<String>,
    #[validate(range(min = 1, max = 5000))]
    pub limit: Option<usize>,
}

// Color del gauge y de la barra de desconectados
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GaugeLevel {
    Verde,
    Amarillo,
    Rojo,
}

impl GaugeLevel {
    /// Nivel del gauge según el % OK (verde >= green, amarillo >= yellow)
    pub fn for_ok_pct(ok_pct: f64, green: f64, yellow: f64) -> Self {
        if ok_pct >= green {
            GaugeLevel::Verde
        } else if ok_pct >= yellow {
            GaugeLevel::Amarillo
        } else {
            GaugeLevel::Rojo
        }
    }

    /// Nivel de la barra de desconectados: rojo desde 30%, amarillo desde 15%
    pub fn for_offline_pct(offline_pct: f64) -> Self {
        if offline_pct >= 30.0 {
            GaugeLevel::Rojo
        } else if offline_pct >= 15.0 {
            GaugeLevel::Amarillo
        } else {
            GaugeLevel::Verde
        }
    }
}

// Umbrales verde/amarillo de un gauge
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GaugeThresholds {
    pub green: f64,
    pub yellow: f64,
}

pub const TELEMETRY_GAUGE: GaugeThresholds = GaugeThresholds {
    green: 80.0,
    yellow: 60.0,
};

pub const GPS_GAUGE: GaugeThresholds = GaugeThresholds {
    green: 85.0,
    yellow: 70.0,
};

// Tarjeta de gauge del dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GaugeCard {
    pub title: String,
    pub subtitle: String,
    pub total: usize,
    pub ok_pct: f64,
    pub ok_count: usize,
    pub offline_count: usize,
    pub offline_pct: f64,
    pub level: GaugeLevel,
    pub offline_level: GaugeLevel,
    pub thresholds: GaugeThresholds,
}

impl GaugeCard {
    pub fn new(
        title: impl Into<String>,
        subtitle: impl Into<String>,
        kpi: &ChannelKpi,
        thresholds: GaugeThresholds,
    ) -> Self {
        let ok_pct = kpi.ok_pct.clamp(0.0, 100.0);
        let ok_count = kpi.ok_count.min(kpi.total);
        let offline_pct = if kpi.total > 0 {
            ((100.0 - ok_pct) * 100.0).round() / 100.0
        } else {
            0.0
        };

        Self {
            title: title.into(),
            subtitle: subtitle.into(),
            total: kpi.total,
            ok_pct,
            ok_count,
            offline_count: kpi.total - ok_count,
            offline_pct,
            level: GaugeLevel::for_ok_pct(ok_pct, thresholds.green, thresholds.yellow),
            offline_level: GaugeLevel::for_offline_pct(offline_pct),
            thresholds,
        }
    }
}

// Histograma por estado con su título
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramPanel {
    pub title: String,
    pub bars: Vec<HistogramBar>,
}

impl HistogramPanel {
    pub fn new(title: impl Into<String>, histogram: &CategoryHistogram) -> Self {
        Self {
            title: title.into(),
            bars: histogram.bars(),
        }
    }
}

// Response del resumen de conectividad
#[derive(Debug, Clone, Serialize)]
pub struct ConnectivitySummaryResponse {
    pub report_file: String,
    pub reference_date: String,
    pub roster_units: usize,
    pub filtered_units: usize,
    pub query: Option<String>,
    pub telemetria: GaugeCard,
    pub gps: GaugeCard,
    pub histograma_telemetria: HistogramPanel,
    pub histograma_gps: HistogramPanel,
}

// Fila de la tabla de unidades con problemas
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProblemRow {
    #[serde(rename = "IMEI")]
    pub imei: String,
    #[serde(rename = "VIN")]
    pub vin: Option<String>,
    pub license_plate: Option<String>,
    pub device_model: Option<String>,
    pub source: Option<String>,
    pub days_can: Option<i64>,
    pub estado_telemetria: FreshnessCategory,
    pub days_gps: Option<i64>,
    pub gps_status_any: FreshnessCategory,
    pub last_update_utc: Option<NaiveDateTime>,
}

impl From<&VehicleRecord> for ProblemRow {
    fn from(record: &VehicleRecord) -> Self {
        Self {
            imei: record.identity.imei.clone(),
            vin: record.identity.vin.clone(),
            license_plate: record.identity.license_plate.clone(),
            device_model: record.device_model.clone(),
            source: record.source.clone(),
            days_can: record.days_can,
            estado_telemetria: record.estado_telemetria,
            days_gps: record.days_gps,
            gps_status_any: record.gps_status_any,
            last_update_utc: record.last_update_utc,
        }
    }
}

// Response de la tabla de problemas
#[derive(Debug, Clone, Serialize)]
pub struct ProblemsResponse {
    pub report_file: String,
    /// Unidades con problemas antes de aplicar el límite
    pub total: usize,
    pub limit: usize,
    pub rows: Vec<ProblemRow>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::aggregator::channel_kpi;

    fn kpi(ok: usize, total: usize) -> ChannelKpi {
        let days = (0..total).map(|i| {
            if i < ok {
                (Some(1), FreshnessCategory::Conectado)
            } else {
                (None, FreshnessCategory::Desconectado)
            }
        });
        channel_kpi(days, 30)
    }

    #[test]
    fn test_gauge_card_levels() {
        let card = GaugeCard::new("Telemetría", "30 días", &kpi(6, 10), TELEMETRY_GAUGE);
        assert_eq!(card.ok_pct, 60.0);
        assert_eq!(card.offline_count, 4);
        assert_eq!(card.offline_pct, 40.0);
        assert_eq!(card.level, GaugeLevel::Amarillo);
        assert_eq!(card.offline_level, GaugeLevel::Rojo);

        let card = GaugeCard::new("GPS", "15 días", &kpi(9, 10), GPS_GAUGE);
        assert_eq!(card.level, GaugeLevel::Verde);
        assert_eq!(card.offline_level, GaugeLevel::Verde);
    }

    #[test]
    fn test_gauge_card_empty() {
        let card = GaugeCard::new("GPS", "15 días", &kpi(0, 0), GPS_GAUGE);
        assert_eq!(card.ok_pct, 0.0);
        assert_eq!(card.offline_pct, 0.0);
        assert_eq!(card.offline_count, 0);
        assert_eq!(card.level, GaugeLevel::Rojo);
        assert_eq!(card.offline_level, GaugeLevel::Verde);
    }

    #[test]
    fn test_offline_pct_is_rounded() {
        let card = GaugeCard::new("Telemetría", "30 días", &kpi(1, 3), TELEMETRY_GAUGE);
        assert_eq!(card.ok_pct, 33.33);
        assert_eq!(card.offline_pct, 66.67);
    }

    #[test]
    fn test_query_validation() {
        let query = ProblemsQuery {
            q: Some("x".repeat(65)),
            limit: Some(10),
        };
        assert!(query.validate().is_err());

        let query = ProblemsQuery {
            q: None,
            limit: Some(0),
        };
        assert!(query.validate().is_err());

        let query = ProblemsQuery {
            q: Some("AB-12".to_string()),
            limit: Some(MAX_PROBLEM_LIMIT),
        };
        assert!(query.validate().is_ok());
    }
}
