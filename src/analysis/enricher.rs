//! Enriquecedor de conectividad
//!
//! Aplica el clasificador por separado a telemetría (`can_timestamp`) y a
//! GPS (`gps_timestamp`). Un canal puede estar fresco mientras el otro está
//! desconectado.

use crate::analysis::classifier::{classify, ReferenceDate};
use crate::models::vehicle::{NormalizedRecord, VehicleRecord};

pub fn enrich_record(record: NormalizedRecord, today: ReferenceDate) -> VehicleRecord {
    let telemetria = classify(record.can_timestamp, today);
    let gps = classify(record.gps_timestamp, today);

    VehicleRecord {
        identity: record.identity,
        device_model: record.device_model,
        source: record.source,
        can_timestamp: record.can_timestamp,
        gps_timestamp: record.gps_timestamp,
        last_update_utc: record.last_update_utc,
        days_can: telemetria.days,
        estado_telemetria: telemetria.category,
        days_gps: gps.days,
        gps_status_any: gps.category,
    }
}

/// Enriquece todas las filas contra la misma fecha de referencia
pub fn enrich(records: Vec<NormalizedRecord>, today: ReferenceDate) -> Vec<VehicleRecord> {
    records
        .into_iter()
        .map(|record| enrich_record(record, today))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::timestamps::normalize_report;
    use crate::models::connectivity::FreshnessCategory;
    use crate::models::report::ReportTable;
    use chrono::NaiveDate;

    fn today() -> ReferenceDate {
        ReferenceDate::new(NaiveDate::from_ymd_opt(2024, 6, 30).unwrap())
    }

    fn table(headers: &[&str], rows: &[&[&str]]) -> ReportTable {
        ReportTable::new(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn test_channels_are_independent() {
        let report = table(
            &["IMEI", "can_timestamp", "gps_timestamp"],
            &[&["1", "2024-06-29T10:00:00Z", "2024-04-01T10:00:00Z"]],
        );
        let records = enrich(normalize_report(&report).unwrap(), today());

        assert_eq!(records[0].days_can, Some(1));
        assert_eq!(records[0].estado_telemetria, FreshnessCategory::Conectado);
        assert_eq!(records[0].days_gps, Some(90));
        assert_eq!(records[0].gps_status_any, FreshnessCategory::Desconectado);
        assert!(records[0].has_problem());
    }

    #[test]
    fn test_absent_source_column_is_stalest_for_every_row() {
        let report = table(
            &["IMEI", "can_timestamp"],
            &[&["1", "2024-06-30 08:00:00"], &["2", ""]],
        );
        let records = enrich(normalize_report(&report).unwrap(), today());

        assert!(records
            .iter()
            .all(|r| r.days_gps.is_none() && r.gps_status_any == FreshnessCategory::Desconectado));
        assert_eq!(records[0].estado_telemetria, FreshnessCategory::Conectado);
        assert_eq!(records[1].estado_telemetria, FreshnessCategory::Desconectado);
    }

    #[test]
    fn test_unparseable_timestamp_is_stalest() {
        let report = table(
            &["IMEI", "can_timestamp", "gps_timestamp"],
            &[&["1", "sin dato", "2024-06-20"]],
        );
        let records = enrich(normalize_report(&report).unwrap(), today());

        assert_eq!(records[0].can_timestamp, None);
        assert_eq!(records[0].estado_telemetria, FreshnessCategory::Desconectado);
        assert_eq!(records[0].gps_status_any, FreshnessCategory::Intermitente);
    }
}
