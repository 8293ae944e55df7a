//! Almacén de reportes en disco
//!
//! Persiste cada descarga con timestamp y como `_latest`, y resuelve qué
//! archivo debe usar el dashboard.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::services::report_fetcher::DownloadedReport;
use crate::utils::errors::{config_error, AppResult};

/// Resultado de persistir una descarga
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredReport {
    pub timestamped: PathBuf,
    pub latest: PathBuf,
    pub size: usize,
    pub md5: String,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ReportStore {
    data_dir: PathBuf,
}

impl ReportStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Escribe `{prefix}_{YYYYmmdd_HHMMSS}.csv` y `{prefix}_latest.csv`
    pub fn persist(
        &self,
        prefix: &str,
        report: &DownloadedReport,
        at: DateTime<Utc>,
    ) -> AppResult<StoredReport> {
        fs::create_dir_all(&self.data_dir)?;

        let stamp = at.format("%Y%m%d_%H%M%S");
        let timestamped = self.data_dir.join(format!("{prefix}_{stamp}.csv"));
        let latest = self.data_dir.join(format!("{prefix}_latest.csv"));

        fs::write(&timestamped, &report.bytes)?;
        fs::write(&latest, &report.bytes)?;

        let stored = StoredReport {
            timestamped,
            latest,
            size: report.bytes.len(),
            md5: format!("{:x}", md5::compute(&report.bytes)),
            content_type: report.content_type.clone(),
        };

        info!("💾 Guardado: {}", stored.timestamped.display());
        info!("💾 Guardado: {}", stored.latest.display());
        info!(
            "📊 Bytes: {} | MD5: {} | Content-Type: {}",
            stored.size,
            stored.md5,
            stored.content_type.as_deref().unwrap_or("-")
        );
        Ok(stored)
    }

    /// CSV más reciente (por fecha de modificación) que parte con `prefix`
    pub fn latest_by_prefix(&self, prefix: &str) -> AppResult<Option<PathBuf>> {
        let entries = match fs::read_dir(&self.data_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut candidates: Vec<(SystemTime, PathBuf)> = Vec::new();
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            let matches = path
                .file_name()
                .and_then(|name| name.to_str())
                .map(|name| name.starts_with(prefix) && name.ends_with(".csv"))
                .unwrap_or(false);
            if !matches || !entry.file_type()?.is_file() {
                continue;
            }
            let modified = entry.metadata()?.modified()?;
            candidates.push((modified, path));
        }

        candidates.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| b.1.cmp(&a.1)));
        debug!("{} candidatos {}*.csv en {}", candidates.len(), prefix, self.data_dir.display());
        Ok(candidates.into_iter().next().map(|(_, path)| path))
    }

    /// Reporte fijo si existe; si no, el último del directorio de datos
    pub fn resolve_report(&self, fixed: Option<&Path>, prefix: &str) -> AppResult<PathBuf> {
        if let Some(path) = fixed.filter(|path| path.is_file()) {
            return Ok(path.to_path_buf());
        }

        match self.latest_by_prefix(prefix)? {
            Some(path) => {
                info!("📄 Usando último CSV diario: {}", path.display());
                Ok(path)
            }
            None => Err(config_error(format!(
                "No encontré archivos {prefix}*.csv en {}. Solución: ejecuta el job diario o copia un CSV a ese directorio.",
                self.data_dir.display()
            ))),
        }
    }
}
