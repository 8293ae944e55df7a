//! Carga del CSV de registros de vehículos
//!
//! Lee el CSV completo como texto; las filas más cortas o más largas que el
//! encabezado se aceptan tal cual.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ByteRecord, ReaderBuilder};
use tracing::info;

use crate::models::report::ReportTable;
use crate::utils::errors::{missing_file_error, AppResult};

/// Lee un CSV con encabezados desde disco
pub fn load_csv_table(path: &Path) -> AppResult<ReportTable> {
    if !path.is_file() {
        return Err(missing_file_error(
            "el CSV de registros",
            path,
            "Ejecuta el job diario o revisa STATUS_CSV_PATH.",
        ));
    }

    let table = read_csv_table(File::open(path)?)?;
    info!(
        "📄 {} leído: {} filas, {} columnas",
        path.display(),
        table.len(),
        table.headers.len()
    );
    Ok(table)
}

/// Lee un CSV con encabezados desde cualquier fuente
pub fn read_csv_table<R: Read>(source: R) -> AppResult<ReportTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(source);

    let headers = record_to_strings(reader.byte_headers()?);
    let mut rows = Vec::new();
    let mut record = ByteRecord::new();
    while reader.read_byte_record(&mut record)? {
        rows.push(record_to_strings(&record));
    }

    Ok(ReportTable::new(headers, rows))
}

fn record_to_strings(record: &ByteRecord) -> Vec<String> {
    record
        .iter()
        .map(|field| String::from_utf8_lossy(field).into_owned())
        .collect()
}
