//! Normalizador de timestamps
//!
//! Convierte las columnas `can_timestamp`, `gps_timestamp` y
//! `last_update_utc` a `NaiveDateTime` en hora UTC. Los valores que no se
//! pueden interpretar quedan como `None`; nunca es un error. Una columna
//! ausente se comporta igual que una columna llena de valores faltantes.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::{debug, warn};

use crate::analysis::columns::{
    self, normalize_identifier, optional_identifier, CanonicalSchema, REPORT_COLUMNS,
};
use crate::models::report::ReportTable;
use crate::models::vehicle::{DeviceIdentity, NormalizedRecord};
use crate::utils::errors::AppResult;

/// Marcadores de valor faltante que exportan las planillas y pandas
const MISSING_MARKERS: &[&str] = &["", "nat", "nan", "none", "null", "n/a"];

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Interpreta un timestamp crudo como hora UTC sin zona.
///
/// Los valores con offset se convierten a UTC; los valores sin zona se
/// asumen ya en UTC.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if is_missing_marker(raw) {
        return None;
    }

    let value = strip_utc_suffix(raw.trim());
    let value = expand_offset(value);

    if let Ok(dt) = DateTime::parse_from_rfc3339(&value) {
        return Some(dt.naive_utc());
    }

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&value, format) {
            return Some(dt.naive_utc());
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&value, format) {
            return Some(dt);
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(&value, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

fn strip_utc_suffix(value: &str) -> &str {
    ["UTC", "utc", "GMT"]
        .iter()
        .find_map(|suffix| value.strip_suffix(suffix))
        .map(str::trim_end)
        .unwrap_or(value)
}

/// `Z` → `+00:00`, `+03` → `+03:00`
fn expand_offset(value: &str) -> String {
    if let Some(stripped) = value.strip_suffix(['Z', 'z']) {
        return format!("{stripped}+00:00");
    }

    let bytes = value.as_bytes();
    let n = bytes.len();
    let has_time = value.contains(':');
    if has_time
        && n > 3
        && matches!(bytes[n - 3], b'+' | b'-')
        && bytes[n - 2].is_ascii_digit()
        && bytes[n - 1].is_ascii_digit()
        && bytes[n - 4].is_ascii_digit()
    {
        return format!("{value}:00");
    }

    value.to_string()
}

/// Normaliza el reporte completo.
///
/// Resuelve el esquema canónico (falla si no hay columna IMEI) y produce
/// una fila normalizada por cada fila del CSV.
pub fn normalize_report(table: &ReportTable) -> AppResult<Vec<NormalizedRecord>> {
    let schema = CanonicalSchema::resolve("reporte de vehículos", &table.headers, REPORT_COLUMNS)?;
    Ok(normalize_rows(table, &schema))
}

pub fn normalize_rows(table: &ReportTable, schema: &CanonicalSchema) -> Vec<NormalizedRecord> {
    let mut unparseable = [0usize; 3];
    let timestamp_columns = [
        columns::CAN_TIMESTAMP,
        columns::GPS_TIMESTAMP,
        columns::LAST_UPDATE_UTC,
    ];

    for canonical in timestamp_columns {
        if !schema.has(canonical) {
            debug!("Columna {} ausente: se trata como sin señal", canonical);
        }
    }

    let records = (0..table.len())
        .map(|row| {
            let mut parsed = [None; 3];
            for (i, canonical) in timestamp_columns.iter().enumerate() {
                let raw = schema.value(table, row, canonical);
                parsed[i] = raw.and_then(parse_timestamp);
                if parsed[i].is_none() && raw.is_some_and(|r| !is_missing_marker(r)) {
                    unparseable[i] += 1;
                }
            }

            NormalizedRecord {
                identity: DeviceIdentity {
                    imei: normalize_identifier(
                        schema.value(table, row, columns::IMEI).unwrap_or_default(),
                    ),
                    vin: optional_identifier(schema.value(table, row, columns::VIN)),
                    license_plate: optional_identifier(
                        schema.value(table, row, columns::LICENSE_PLATE),
                    ),
                },
                device_model: optional_identifier(schema.value(table, row, columns::DEVICE_MODEL)),
                source: optional_identifier(schema.value(table, row, columns::SOURCE)),
                can_timestamp: parsed[0],
                gps_timestamp: parsed[1],
                last_update_utc: parsed[2],
            }
        })
        .collect();

    for (canonical, count) in timestamp_columns.iter().zip(unparseable) {
        if count > 0 {
            warn!("{} valores no interpretables en {} (se tratan como faltantes)", count, canonical);
        }
    }

    records
}

fn is_missing_marker(raw: &str) -> bool {
    let value = raw.trim();
    MISSING_MARKERS
        .iter()
        .any(|marker| value.eq_ignore_ascii_case(marker))
}
