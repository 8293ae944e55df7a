use std::fs;
use std::path::Path;

use chrono::{Duration, NaiveDate};
use fleet_connectivity::analysis::aggregator::{summarize, KpiThresholds};
use fleet_connectivity::analysis::classifier::ReferenceDate;
use fleet_connectivity::analysis::roster_filter::{self, SearchQuery};
use fleet_connectivity::models::connectivity::FreshnessCategory;
use fleet_connectivity::models::roster::RosterIndex;
use fleet_connectivity::services::connectivity_service::load_report;
use fleet_connectivity::services::roster_loader::load_roster;
use fleet_connectivity::utils::errors::AppError;

fn today() -> ReferenceDate {
    ReferenceDate::new(NaiveDate::from_ymd_opt(2024, 6, 30).unwrap())
}

fn days_ago(days: i64) -> String {
    (today().date() - Duration::days(days))
        .and_hms_opt(9, 30, 0)
        .unwrap()
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

/// 10 filas: 3 sin can_timestamp y edades [1,5,16,31,2,14,30]
fn write_scenario(dir: &Path) -> (std::path::PathBuf, std::path::PathBuf) {
    let mut report = String::from("\u{feff}imei,Patente,can_timestamp,gps_timestamp\n");
    let ages = [Some(1), Some(5), Some(16), Some(31), Some(2), Some(14), Some(30), None, None, None];
    for (i, age) in ages.iter().enumerate() {
        let can = age.map(days_ago).unwrap_or_default();
        report.push_str(&format!("{},PAT-{},{},{}\n", 1000 + i, i, can, days_ago(1)));
    }
    // Fuera del roster
    report.push_str(&format!("9999,PAT-X,{},\n", days_ago(90)));

    let report_path = dir.join("vehicles_records_latest.csv");
    fs::write(&report_path, report).unwrap();

    let mut roster = String::from("IMEI_status,VIN_master\n");
    for i in 0..10 {
        roster.push_str(&format!("{} ,V{}\n", 1000 + i, i));
    }
    let roster_path = dir.join("master_Flota.csv");
    fs::write(&roster_path, roster).unwrap();

    (report_path, roster_path)
}

#[test]
fn test_ten_row_scenario_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let (report_path, roster_path) = write_scenario(dir.path());

    let report = load_report(&report_path, today()).unwrap();
    let roster = RosterIndex::from_entries(&load_roster(&roster_path).unwrap());
    assert_eq!(report.records.len(), 11);
    assert_eq!(roster.len(), 10);

    let filtered = roster_filter::apply(&report.records, &roster, None);
    let kpis = summarize(&filtered, KpiThresholds::default());

    assert_eq!(kpis.total, 10);
    let histogram = &kpis.telemetria.histogram;
    assert_eq!(histogram.count(FreshnessCategory::Conectado), 2);
    assert_eq!(histogram.count(FreshnessCategory::Intermitente), 2);
    assert_eq!(histogram.count(FreshnessCategory::Limitado), 2);
    assert_eq!(histogram.count(FreshnessCategory::Desconectado), 4);
    assert_eq!(histogram.total(), kpis.total);
    assert_eq!(kpis.telemetria.ok_count, 6);
    assert_eq!(kpis.telemetria.ok_pct, 60.0);

    assert_eq!(kpis.gps.ok_count, 10);
    assert_eq!(kpis.gps.ok_pct, 100.0);

    // Días CAN descendente, sin dato al final
    let days: Vec<Option<i64>> = kpis.problems.iter().map(|r| r.days_can).collect();
    assert_eq!(
        days,
        vec![Some(31), Some(30), Some(16), Some(14), Some(5), None, None, None]
    );
    assert!(kpis.problems.iter().all(|r| r.imei() != "9999"));
}

#[test]
fn test_search_is_subset_of_roster_filter() {
    let dir = tempfile::tempdir().unwrap();
    let (report_path, roster_path) = write_scenario(dir.path());

    let report = load_report(&report_path, today()).unwrap();
    let roster = RosterIndex::from_entries(&load_roster(&roster_path).unwrap());
    let by_roster = roster_filter::apply(&report.records, &roster, None);

    let query = SearchQuery::parse(Some(" pat-1 "));
    let searched = roster_filter::apply(&report.records, &roster, query.as_ref());

    assert_eq!(searched.len(), 1);
    assert!(searched.iter().all(|r| by_roster.contains(r)));

    let nothing = SearchQuery::parse(Some("pat-x"));
    assert!(roster_filter::apply(&report.records, &roster, nothing.as_ref()).is_empty());
}

#[test]
fn test_report_without_imei_column() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vehicles_records_latest.csv");
    fs::write(&path, "VIN,can_timestamp\nV1,2024-06-01\n").unwrap();

    match load_report(&path, today()).unwrap_err() {
        AppError::MissingColumn { canonical, accepted, found, .. } => {
            assert_eq!(canonical, "IMEI");
            assert!(accepted.contains(&"imei".to_string()));
            assert_eq!(found, vec!["VIN", "can_timestamp"]);
        }
        other => panic!("error inesperado: {other:?}"),
    }
}

#[test]
fn test_garbage_timestamps_are_missing_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vehicles_records_latest.csv");
    fs::write(
        &path,
        "IMEI,can_timestamp,gps_timestamp\n1,no-date,NaT\n2,2024-06-29T10:00:00Z\n",
    )
    .unwrap();

    let report = load_report(&path, today()).unwrap();
    assert_eq!(report.records[0].days_can, None);
    assert_eq!(report.records[0].estado_telemetria, FreshnessCategory::Desconectado);
    assert_eq!(report.records[1].days_can, Some(1));
    assert_eq!(report.records[1].gps_status_any, FreshnessCategory::Desconectado);
}

#[test]
fn test_unreadable_spreadsheet() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("master_Flota.xlsx");
    fs::write(&path, "esto no es un xlsx").unwrap();

    let err = load_roster(&path).unwrap_err();
    assert!(matches!(err, AppError::Spreadsheet(_)));
    assert!(!err.is_configuration());
}
