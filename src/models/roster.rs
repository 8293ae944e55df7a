//! Modelo del roster maestro de la flota
//!
//! El roster define qué IMEIs pertenecen a la flota. Se deduplica a un
//! conjunto para las pruebas de pertenencia.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::analysis::columns::normalize_identifier;

/// Entrada del archivo maestro
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterRosterEntry {
    #[serde(rename = "IMEI")]
    pub imei: String,
    #[serde(rename = "VIN")]
    pub vin: Option<String>,
    pub license_plate: Option<String>,
}

/// Conjunto de IMEIs de la flota
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterIndex {
    imeis: HashSet<String>,
    entries: usize,
}

impl RosterIndex {
    pub fn from_entries<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = &'a MasterRosterEntry>,
    {
        let mut imeis = HashSet::new();
        let mut count = 0;
        for entry in entries {
            count += 1;
            let imei = normalize_identifier(&entry.imei);
            if !imei.is_empty() {
                imeis.insert(imei);
            }
        }
        Self {
            imeis,
            entries: count,
        }
    }

    pub fn contains(&self, imei: &str) -> bool {
        self.imeis.contains(&normalize_identifier(imei))
    }

    /// IMEIs distintos
    pub fn len(&self) -> usize {
        self.imeis.len()
    }

    pub fn is_empty(&self) -> bool {
        self.imeis.is_empty()
    }

    /// Filas leídas del archivo maestro, antes de deduplicar
    pub fn entry_count(&self) -> usize {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(imei: &str) -> MasterRosterEntry {
        MasterRosterEntry {
            imei: imei.to_string(),
            vin: None,
            license_plate: None,
        }
    }

    #[test]
    fn test_roster_deduplicates_normalized_imeis() {
        let entries = vec![entry("123 "), entry(" 123"), entry("456"), entry("   ")];
        let roster = RosterIndex::from_entries(&entries);

        assert_eq!(roster.len(), 2);
        assert_eq!(roster.entry_count(), 4);
        assert!(roster.contains("123"));
        assert!(roster.contains("456 "));
        assert!(!roster.contains(""));
    }
}
