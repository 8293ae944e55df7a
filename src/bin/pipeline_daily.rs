//! Job diario: descarga el reporte de registros de vehículos y lo deja en
//! `DATA_DIR` para el dashboard.

use std::process::ExitCode;

use chrono::Utc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use fleet_connectivity::config::environment::EnvironmentConfig;
use fleet_connectivity::services::report_fetcher::ReportFetcher;
use fleet_connectivity::services::report_store::{ReportStore, StoredReport};
use fleet_connectivity::utils::errors::AppResult;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run().await {
        Ok(stored) => {
            info!("✅ Pipeline OK: {}", stored.latest.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("❌ Pipeline falló: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> AppResult<StoredReport> {
    let config = EnvironmentConfig::from_env()?;
    info!("[1/2] Descargando reporte de Copiloto...");

    let fetcher = ReportFetcher::from_config(&config.fetch)?;
    let report = fetcher.fetch().await?;

    info!("[2/2] Guardando en {}", config.data_dir.display());
    ReportStore::new(&config.data_dir).persist(&config.fetch.out_prefix, &report, Utc::now())
}
