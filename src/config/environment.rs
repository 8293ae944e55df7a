//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno: rutas de datos, umbrales
//! de KPIs, vigencia del cache y parámetros de descarga del reporte.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::analysis::aggregator::KpiThresholds;
use crate::cache::CacheConfig;
use crate::utils::errors::{config_error, AppResult};

pub const DEFAULT_COPILOTO_ENDPOINT: &str =
    "https://api.copiloto.ai/wicar-report/report-files/vehicle-records";
pub const DEFAULT_COPILOTO_SIGNIN_URL: &str = "https://accounts.copiloto.ai/v1/sign-in";
pub const DEFAULT_REPORT_PREFIX: &str = "vehicles_records";

/// Parámetros del job de descarga del reporte
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub endpoint: String,
    pub signin_url: String,
    pub email: Option<String>,
    pub password: Option<String>,
    /// Token ya emitido; si existe no se hace login
    pub token: Option<String>,
    pub timeout: Duration,
    pub out_prefix: String,
}

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub data_dir: PathBuf,
    pub master_path: PathBuf,
    /// Reporte fijo; si no existe se usa el último `{prefix}*.csv` de `data_dir`
    pub status_csv_path: Option<PathBuf>,
    pub status_prefix: String,
    pub cache: CacheConfig,
    pub thresholds: KpiThresholds,
    pub problem_table_limit: usize,
    pub fetch: FetchConfig,
}

impl EnvironmentConfig {
    /// Lee `.env` (si existe) y luego el entorno del proceso
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Construye la configuración desde una función de búsqueda de variables
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let fetch = FetchConfig {
            endpoint: var("COPILOTO_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_COPILOTO_ENDPOINT.to_string()),
            signin_url: var("COPILOTO_SIGNIN_URL")
                .unwrap_or_else(|| DEFAULT_COPILOTO_SIGNIN_URL.to_string()),
            email: var("COPILOTO_EMAIL"),
            password: var("COPILOTO_PASSWORD"),
            token: var("COPILOTO_TOKEN"),
            timeout: Duration::from_secs(parse_var(&var, "COPILOTO_TIMEOUT_SEC", 60u64)?),
            out_prefix: var("COPILOTO_OUT_PREFIX")
                .unwrap_or_else(|| DEFAULT_REPORT_PREFIX.to_string()),
        };

        let data_dir = PathBuf::from(var("DATA_DIR").unwrap_or_else(|| "data".to_string()));

        let config = Self {
            environment: var("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_var(&var, "PORT", 3000u16)?,
            cors_origins: var("CORS_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            master_path: var("MASTER_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("inputs").join("master_Flota.xlsx")),
            status_csv_path: var("STATUS_CSV_PATH").map(PathBuf::from),
            status_prefix: var("STATUS_PREFIX").unwrap_or_else(|| DEFAULT_REPORT_PREFIX.to_string()),
            cache: CacheConfig {
                ttl_seconds: parse_var(&var, "CACHE_TTL_SECONDS", 300u64)?,
            },
            thresholds: KpiThresholds {
                telemetry_ok_days: parse_var(&var, "TELEMETRY_OK_DAYS", 30i64)?,
                gps_ok_days: parse_var(&var, "GPS_OK_DAYS", 15i64)?,
            },
            problem_table_limit: parse_var(&var, "PROBLEM_TABLE_LIMIT", 300usize)?,
            data_dir,
            fetch,
        };

        Ok(config)
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Obtener la dirección del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T, F>(var: &F, key: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw
            .parse()
            .map_err(|_| config_error(format!("{key} inválida: '{raw}'"))),
        None => Ok(default),
    }
}

/// Valida que una URL parta con http/https
pub fn validate_url(name: &str, url: &str) -> AppResult<()> {
    if url.is_empty() {
        return Err(config_error(format!("{name} está vacío.")));
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(config_error(format!(
            "{name} inválida: '{url}' (debe partir con http/https)."
        )));
    }
    Ok(())
}
