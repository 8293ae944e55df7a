//! Filtro por roster maestro
//!
//! Primero se conservan solo los IMEIs del roster; después, si hay término
//! de búsqueda, solo las filas donde algún identificador (IMEI, VIN o
//! patente) lo contiene sin distinguir mayúsculas.

use tracing::debug;

use crate::analysis::columns::normalize_identifier;
use crate::models::roster::RosterIndex;
use crate::models::vehicle::VehicleRecord;

/// Término de búsqueda normalizado; vacío equivale a sin búsqueda
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery(String);

impl SearchQuery {
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        raw.map(str::trim)
            .filter(|q| !q.is_empty())
            .map(|q| Self(q.to_uppercase()))
    }

    pub fn matches(&self, record: &VehicleRecord) -> bool {
        record
            .identifiers()
            .any(|id| id.to_uppercase().contains(&self.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Solo las filas cuyo IMEI pertenece al roster
pub fn filter_by_roster(records: &[VehicleRecord], roster: &RosterIndex) -> Vec<VehicleRecord> {
    records
        .iter()
        .filter(|record| roster.contains(&normalize_identifier(record.imei())))
        .cloned()
        .collect()
}

/// Roster primero, búsqueda después
pub fn apply(
    records: &[VehicleRecord],
    roster: &RosterIndex,
    query: Option<&SearchQuery>,
) -> Vec<VehicleRecord> {
    let mut filtered = filter_by_roster(records, roster);
    debug!(
        "Filtro por master: {} de {} filas",
        filtered.len(),
        records.len()
    );

    if let Some(query) = query {
        filtered.retain(|record| query.matches(record));
        debug!("Búsqueda '{}': {} filas", query.as_str(), filtered.len());
    }

    filtered
}
