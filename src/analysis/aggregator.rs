//! Agregador de KPIs de conectividad
//!
//! Conteos OK por canal, porcentajes, histogramas por categoría y el
//! listado de unidades con problemas.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::models::analytics::{CategoryHistogram, ChannelKpi, ConnectivityKpis};
use crate::models::connectivity::FreshnessCategory;
use crate::models::vehicle::VehicleRecord;

/// Umbrales de días para considerar un canal "OK"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KpiThresholds {
    pub telemetry_ok_days: i64,
    pub gps_ok_days: i64,
}

impl Default for KpiThresholds {
    fn default() -> Self {
        Self {
            telemetry_ok_days: 30,
            gps_ok_days: 15,
        }
    }
}

/// Porcentaje redondeado a 2 decimales; 0.0 si no hay unidades
pub fn safe_pct(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (count as f64 / total as f64 * 100.0 * 100.0).round() / 100.0
}

/// KPIs de un canal a partir de (días, categoría) por fila
pub fn channel_kpi<I>(channel: I, threshold_days: i64) -> ChannelKpi
where
    I: IntoIterator<Item = (Option<i64>, FreshnessCategory)>,
{
    let mut total = 0;
    let mut ok_count = 0;
    let mut histogram = CategoryHistogram::default();

    for (days, category) in channel {
        total += 1;
        // Sin timestamp no hay días, así que nunca cuenta como OK
        if days.is_some_and(|d| d <= threshold_days) {
            ok_count += 1;
        }
        histogram.record(category);
    }

    ChannelKpi {
        total,
        ok_count,
        ok_pct: safe_pct(ok_count, total),
        threshold_days,
        histogram,
    }
}

/// Unidades con telemetría o GPS fuera de "Conectado 0-2", las más
/// antiguas primero (días CAN, luego días GPS; sin dato al final)
pub fn problem_units(records: &[VehicleRecord]) -> Vec<VehicleRecord> {
    let mut problems: Vec<VehicleRecord> = records
        .iter()
        .filter(|record| record.has_problem())
        .cloned()
        .collect();

    problems.sort_by(|a, b| {
        desc_nulls_last(a.days_can, b.days_can).then(desc_nulls_last(a.days_gps, b.days_gps))
    });
    problems
}

fn desc_nulls_last(a: Option<i64>, b: Option<i64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn summarize(records: &[VehicleRecord], thresholds: KpiThresholds) -> ConnectivityKpis {
    let telemetria = channel_kpi(
        records.iter().map(|r| (r.days_can, r.estado_telemetria)),
        thresholds.telemetry_ok_days,
    );
    let gps = channel_kpi(
        records.iter().map(|r| (r.days_gps, r.gps_status_any)),
        thresholds.gps_ok_days,
    );

    ConnectivityKpis {
        total: records.len(),
        telemetria,
        gps,
        problems: problem_units(records),
    }
}
