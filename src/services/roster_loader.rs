//! Carga del roster maestro de la flota
//!
//! Acepta planillas (.xlsx/.xls/.ods, solo la primera hoja) o CSV. Todas
//! las celdas se leen como texto.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use tracing::info;

use crate::analysis::columns::{
    self, normalize_identifier, optional_identifier, CanonicalSchema, ROSTER_COLUMNS,
};
use crate::models::report::ReportTable;
use crate::models::roster::MasterRosterEntry;
use crate::services::report_loader::load_csv_table;
use crate::utils::errors::{missing_file_error, AppError, AppResult};

/// Lee el archivo maestro y resuelve sus columnas
pub fn load_roster(path: &Path) -> AppResult<Vec<MasterRosterEntry>> {
    if !path.is_file() {
        return Err(missing_file_error(
            "el archivo maestro de flota",
            path,
            "Revisa MASTER_PATH.",
        ));
    }

    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    let table = if is_csv {
        load_csv_table(path)?
    } else {
        read_first_sheet(path)?
    };

    let entries = roster_entries(&table)?;
    info!("🚛 Roster {}: {} filas", path.display(), entries.len());
    Ok(entries)
}

/// Convierte la tabla del maestro en entradas con nombres canónicos
pub fn roster_entries(table: &ReportTable) -> AppResult<Vec<MasterRosterEntry>> {
    let schema = CanonicalSchema::resolve("master", &table.headers, ROSTER_COLUMNS)?;

    Ok((0..table.len())
        .map(|row| MasterRosterEntry {
            imei: normalize_identifier(schema.value(table, row, columns::IMEI).unwrap_or_default()),
            vin: optional_identifier(schema.value(table, row, columns::VIN)),
            license_plate: optional_identifier(schema.value(table, row, columns::LICENSE_PLATE)),
        })
        .collect())
}

fn read_first_sheet(path: &Path) -> AppResult<ReportTable> {
    let spreadsheet_error =
        |e: calamine::Error| AppError::Spreadsheet(format!("{}: {}", path.display(), e));

    let mut workbook = open_workbook_auto(path).map_err(spreadsheet_error)?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| AppError::Spreadsheet(format!("{}: el libro no tiene hojas", path.display())))?;
    let range = workbook.worksheet_range(&sheet).map_err(spreadsheet_error)?;

    let mut rows = range.rows().map(|row| row.iter().map(cell_text).collect::<Vec<_>>());
    let headers = rows.next().unwrap_or_default();
    Ok(ReportTable::new(headers, rows.collect()))
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        // IMEIs guardados como número en la planilla
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e17 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> ReportTable {
        ReportTable::new(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn test_roster_synonyms_are_resolved() {
        let t = table(
            &[" IMEI_master ", "VIN_status", "Patente"],
            &[&["123 ", "V1", "AB-12"], &["456.0", "", ""]],
        );
        let entries = roster_entries(&t).unwrap();

        assert_eq!(entries[0].imei, "123");
        assert_eq!(entries[0].vin.as_deref(), Some("V1"));
        assert_eq!(entries[0].license_plate.as_deref(), Some("AB-12"));
        assert_eq!(entries[1].imei, "456");
        assert_eq!(entries[1].vin, None);
    }

    #[test]
    fn test_roster_without_imei_column() {
        let t = table(&["VIN", "Patente"], &[&["V1", "AB-12"]]);
        match roster_entries(&t).unwrap_err() {
            AppError::MissingColumn { table, found, .. } => {
                assert_eq!(table, "master");
                assert_eq!(found, vec!["VIN", "Patente"]);
            }
            other => panic!("error inesperado: {other:?}"),
        }
    }

    #[test]
    fn test_numeric_cells_render_as_integers() {
        assert_eq!(cell_text(&Data::Float(356938035643809.0)), "356938035643809");
        assert_eq!(cell_text(&Data::Int(42)), "42");
        assert_eq!(cell_text(&Data::Empty), "");
    }
}
