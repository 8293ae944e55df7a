//! Servicio de conectividad
//!
//! Orquesta el pipeline completo: reporte y roster cacheados por TTL,
//! clasificación contra una fecha de referencia fija por carga, filtro
//! por roster y búsqueda, y agregación de KPIs.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::analysis::aggregator::{summarize, KpiThresholds};
use crate::analysis::classifier::ReferenceDate;
use crate::analysis::enricher::enrich;
use crate::analysis::roster_filter::{self, SearchQuery};
use crate::analysis::timestamps::normalize_report;
use crate::cache::{CacheConfig, Clock, SnapshotCache};
use crate::config::environment::EnvironmentConfig;
use crate::models::analytics::ConnectivityKpis;
use crate::models::roster::{MasterRosterEntry, RosterIndex};
use crate::models::vehicle::VehicleRecord;
use crate::services::report_loader::load_csv_table;
use crate::services::report_store::ReportStore;
use crate::services::roster_loader::load_roster;
use crate::utils::errors::{AppError, AppResult};

/// Reporte cargado y enriquecido
#[derive(Debug, Clone)]
pub struct ReportSnapshot {
    pub path: PathBuf,
    pub reference_date: ReferenceDate,
    pub records: Vec<VehicleRecord>,
}

impl ReportSnapshot {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Roster maestro cargado
#[derive(Debug, Clone)]
pub struct RosterSnapshot {
    pub path: PathBuf,
    pub entries: Vec<MasterRosterEntry>,
    pub index: RosterIndex,
}

/// Resultado del pipeline para una búsqueda
#[derive(Debug, Clone)]
pub struct ConnectivityOverview {
    pub report: Arc<ReportSnapshot>,
    pub roster: Arc<RosterSnapshot>,
    /// Filas del reporte después del filtro por roster y búsqueda
    pub filtered_count: usize,
    pub kpis: ConnectivityKpis,
}

/// Configuración del servicio
#[derive(Debug, Clone)]
pub struct ConnectivitySettings {
    pub data_dir: PathBuf,
    pub status_csv_path: Option<PathBuf>,
    pub status_prefix: String,
    pub master_path: PathBuf,
    pub thresholds: KpiThresholds,
    pub cache: CacheConfig,
}

impl From<&EnvironmentConfig> for ConnectivitySettings {
    fn from(config: &EnvironmentConfig) -> Self {
        Self {
            data_dir: config.data_dir.clone(),
            status_csv_path: config.status_csv_path.clone(),
            status_prefix: config.status_prefix.clone(),
            master_path: config.master_path.clone(),
            thresholds: config.thresholds,
            cache: config.cache.clone(),
        }
    }
}

pub struct ConnectivityService {
    store: ReportStore,
    settings: ConnectivitySettings,
    reports: SnapshotCache<PathBuf, ReportSnapshot>,
    rosters: SnapshotCache<PathBuf, RosterSnapshot>,
    clock: Arc<dyn Clock>,
}

impl ConnectivityService {
    pub fn new(settings: ConnectivitySettings, clock: Arc<dyn Clock>) -> Self {
        Self {
            store: ReportStore::new(settings.data_dir.clone()),
            reports: SnapshotCache::new(&settings.cache, clock.clone()),
            rosters: SnapshotCache::new(&settings.cache, clock.clone()),
            settings,
            clock,
        }
    }

    pub fn thresholds(&self) -> KpiThresholds {
        self.settings.thresholds
    }

    /// Reporte vigente; se recarga si cambió el archivo o venció el TTL
    pub async fn report(&self) -> AppResult<Arc<ReportSnapshot>> {
        let path = self
            .store
            .resolve_report(self.settings.status_csv_path.as_deref(), &self.settings.status_prefix)?;

        if let Some(entry) = self.reports.get(&path).await {
            return Ok(entry.value);
        }

        let today = ReferenceDate::new(self.clock.now().date_naive());
        let snapshot = blocking(path.clone(), move |path| load_report(&path, today)).await?;
        Ok(self.reports.insert(path, snapshot).await.value)
    }

    /// Roster vigente
    pub async fn roster(&self) -> AppResult<Arc<RosterSnapshot>> {
        let path = self.settings.master_path.clone();

        if let Some(entry) = self.rosters.get(&path).await {
            return Ok(entry.value);
        }

        let snapshot = blocking(path.clone(), |path| {
            let entries = load_roster(&path)?;
            let index = RosterIndex::from_entries(&entries);
            Ok(RosterSnapshot {
                path,
                entries,
                index,
            })
        })
        .await?;
        Ok(self.rosters.insert(path, snapshot).await.value)
    }

    /// Pipeline completo: roster, búsqueda y KPIs
    pub async fn overview(&self, query: Option<&SearchQuery>) -> AppResult<ConnectivityOverview> {
        let report = self.report().await?;
        let roster = self.roster().await?;

        let filtered = roster_filter::apply(&report.records, &roster.index, query);
        let kpis = summarize(&filtered, self.settings.thresholds);
        debug!(
            "KPIs: {} unidades, telemetría {}%, GPS {}%",
            kpis.total, kpis.telemetria.ok_pct, kpis.gps.ok_pct
        );

        Ok(ConnectivityOverview {
            filtered_count: filtered.len(),
            report,
            roster,
            kpis,
        })
    }

    /// Descarta los snapshots cacheados; la próxima consulta relee disco
    pub async fn refresh(&self) {
        self.reports.clear().await;
        self.rosters.clear().await;
        info!("🔄 Cache de reporte y roster invalidado");
    }

    /// Elimina snapshots vencidos
    pub async fn cleanup_expired(&self) -> usize {
        self.reports.cleanup_expired().await + self.rosters.cleanup_expired().await
    }
}

/// Carga, normaliza y enriquece el reporte contra una fecha fija
pub fn load_report(path: &Path, today: ReferenceDate) -> AppResult<ReportSnapshot> {
    let table = load_csv_table(path)?;
    let records = enrich(normalize_report(&table)?, today);
    info!(
        "📊 Reporte {} clasificado al {}: {} unidades",
        path.display(),
        today.date(),
        records.len()
    );

    Ok(ReportSnapshot {
        path: path.to_path_buf(),
        reference_date: today,
        records,
    })
}

async fn blocking<T, F>(path: PathBuf, load: F) -> AppResult<T>
where
    T: Send + 'static,
    F: FnOnce(PathBuf) -> AppResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(move || load(path))
        .await
        .map_err(|e| AppError::Internal(format!("Tarea de carga abortada: {}", e)))?
}
