//! Resolución de columnas
//!
//! Tabla declarativa nombre canónico → sinónimos aceptados. Cada tabla se
//! resuelve una sola vez al cargarse; el resto del pipeline trabaja solo con
//! nombres canónicos.

use std::collections::HashMap;

use crate::models::report::ReportTable;
use crate::utils::errors::{AppError, AppResult};

pub const IMEI: &str = "IMEI";
pub const VIN: &str = "VIN";
pub const LICENSE_PLATE: &str = "license_plate";
pub const CAN_TIMESTAMP: &str = "can_timestamp";
pub const GPS_TIMESTAMP: &str = "gps_timestamp";
pub const LAST_UPDATE_UTC: &str = "last_update_utc";
pub const DEVICE_MODEL: &str = "device_model";
pub const SOURCE: &str = "source";

/// Columna canónica y las grafías aceptadas, en orden de preferencia
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub canonical: &'static str,
    pub synonyms: &'static [&'static str],
    pub required: bool,
}

/// Columnas del CSV de registros de vehículos
pub const REPORT_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec {
        canonical: IMEI,
        synonyms: &["IMEI", "imei", "Imei"],
        required: true,
    },
    ColumnSpec {
        canonical: VIN,
        synonyms: &["VIN", "vin"],
        required: false,
    },
    ColumnSpec {
        canonical: LICENSE_PLATE,
        synonyms: &["license_plate", "patente", "Patente"],
        required: false,
    },
    ColumnSpec {
        canonical: CAN_TIMESTAMP,
        synonyms: &["can_timestamp"],
        required: false,
    },
    ColumnSpec {
        canonical: GPS_TIMESTAMP,
        synonyms: &["gps_timestamp"],
        required: false,
    },
    ColumnSpec {
        canonical: LAST_UPDATE_UTC,
        synonyms: &["last_update_utc"],
        required: false,
    },
    ColumnSpec {
        canonical: DEVICE_MODEL,
        synonyms: &["device_model"],
        required: false,
    },
    ColumnSpec {
        canonical: SOURCE,
        synonyms: &["source"],
        required: false,
    },
];

/// Columnas del archivo maestro de la flota
pub const ROSTER_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec {
        canonical: IMEI,
        synonyms: &[
            "IMEI",
            "imei",
            "Imei",
            "IMEI_master",
            "imei_master",
            "IMEI_status",
            "imei_status",
        ],
        required: true,
    },
    ColumnSpec {
        canonical: VIN,
        synonyms: &["VIN", "VIN_master", "VIN_status", "vin", "vin_master", "vin_status"],
        required: false,
    },
    ColumnSpec {
        canonical: LICENSE_PLATE,
        synonyms: &[
            "license_plate",
            "Patente",
            "patente",
            "license_plate_status",
            "license_plate_master",
        ],
        required: false,
    },
];

/// Posición de cada columna canónica dentro de una tabla concreta
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalSchema {
    columns: HashMap<&'static str, usize>,
}

impl CanonicalSchema {
    /// Resuelve los encabezados contra la tabla de sinónimos.
    ///
    /// Primero se busca coincidencia exacta (tras recortar espacios) en el
    /// orden de preferencia; si no hay, coincidencia sin distinguir mayúsculas.
    /// Una columna requerida ausente es un error de configuración.
    pub fn resolve(table: &str, headers: &[String], specs: &[ColumnSpec]) -> AppResult<Self> {
        let cleaned: Vec<String> = headers.iter().map(|h| clean_header(h)).collect();
        let mut columns = HashMap::new();

        for spec in specs {
            match find_column(&cleaned, spec.synonyms) {
                Some(index) => {
                    columns.insert(spec.canonical, index);
                }
                None if spec.required => {
                    return Err(AppError::MissingColumn {
                        table: table.to_string(),
                        canonical: spec.canonical.to_string(),
                        accepted: spec.synonyms.iter().map(|s| s.to_string()).collect(),
                        found: cleaned,
                    });
                }
                None => {}
            }
        }

        Ok(Self { columns })
    }

    pub fn index(&self, canonical: &str) -> Option<usize> {
        self.columns.get(canonical).copied()
    }

    pub fn has(&self, canonical: &str) -> bool {
        self.columns.contains_key(canonical)
    }

    /// Valor crudo de una columna canónica; `None` si la columna no existe
    pub fn value<'a>(&self, table: &'a ReportTable, row: usize, canonical: &str) -> Option<&'a str> {
        self.index(canonical).and_then(|column| table.cell(row, column))
    }
}

fn clean_header(header: &str) -> String {
    header.trim_start_matches('\u{feff}').trim().to_string()
}

fn find_column(headers: &[String], synonyms: &[&str]) -> Option<usize> {
    synonyms
        .iter()
        .find_map(|synonym| headers.iter().position(|h| h == synonym))
        .or_else(|| {
            synonyms.iter().find_map(|synonym| {
                headers
                    .iter()
                    .position(|h| h.eq_ignore_ascii_case(synonym))
            })
        })
}

/// Normaliza un identificador para compararlo entre fuentes.
///
/// Recorta espacios y deshace la representación numérica de planillas
/// (`"123.0"` → `"123"`).
pub fn normalize_identifier(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.strip_suffix(".0") {
        Some(digits) if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => {
            digits.to_string()
        }
        _ => trimmed.to_string(),
    }
}

/// Identificador opcional: vacío equivale a ausente
pub fn optional_identifier(raw: Option<&str>) -> Option<String> {
    raw.map(normalize_identifier).filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_resolves_report_synonyms() {
        let schema = CanonicalSchema::resolve(
            "reporte",
            &headers(&["imei", "vin", "patente", "gps_timestamp"]),
            REPORT_COLUMNS,
        )
        .unwrap();

        assert_eq!(schema.index(IMEI), Some(0));
        assert_eq!(schema.index(VIN), Some(1));
        assert_eq!(schema.index(LICENSE_PLATE), Some(2));
        assert_eq!(schema.index(GPS_TIMESTAMP), Some(3));
        assert!(!schema.has(CAN_TIMESTAMP));
    }

    #[test]
    fn test_prefers_exact_canonical_spelling() {
        let schema = CanonicalSchema::resolve(
            "reporte",
            &headers(&["imei", "IMEI"]),
            REPORT_COLUMNS,
        )
        .unwrap();
        assert_eq!(schema.index(IMEI), Some(1));
    }

    #[test]
    fn test_roster_suffixed_synonyms_and_padded_headers() {
        let schema = CanonicalSchema::resolve(
            "master",
            &headers(&[" IMEI_master ", "VIN_status", "Patente"]),
            ROSTER_COLUMNS,
        )
        .unwrap();

        assert_eq!(schema.index(IMEI), Some(0));
        assert_eq!(schema.index(VIN), Some(1));
        assert_eq!(schema.index(LICENSE_PLATE), Some(2));
    }

    #[test]
    fn test_case_variant_is_accepted() {
        let schema =
            CanonicalSchema::resolve("master", &headers(&["ImEi_MaStEr"]), ROSTER_COLUMNS).unwrap();
        assert_eq!(schema.index(IMEI), Some(0));
    }

    #[test]
    fn test_missing_imei_is_configuration_error() {
        let err = CanonicalSchema::resolve(
            "master",
            &headers(&["VIN", "Patente"]),
            ROSTER_COLUMNS,
        )
        .unwrap_err();

        match err {
            AppError::MissingColumn {
                canonical, found, accepted, ..
            } => {
                assert_eq!(canonical, IMEI);
                assert_eq!(found, vec!["VIN".to_string(), "Patente".to_string()]);
                assert!(accepted.contains(&"IMEI_status".to_string()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_normalize_identifier() {
        assert_eq!(normalize_identifier(" 123 "), "123");
        assert_eq!(normalize_identifier("351680012345678.0"), "351680012345678");
        assert_eq!(normalize_identifier("AB12.0"), "AB12.0");
        assert_eq!(normalize_identifier(".0"), ".0");
        assert_eq!(optional_identifier(Some("   ")), None);
        assert_eq!(optional_identifier(None), None);
        assert_eq!(optional_identifier(Some(" KJ-LP-21")), Some("KJ-LP-21".to_string()));
    }
}
