//! Sistema de manejo de errores
//!
//! Este módulo define todos los tipos de errores del sistema
//! y su conversión a respuestas HTTP apropiadas.

use std::path::PathBuf;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{table}: falta la columna {canonical} (busqué: {accepted:?}; columnas encontradas: {found:?})")]
    MissingColumn {
        table: String,
        canonical: String,
        accepted: Vec<String>,
        found: Vec<String>,
    },

    #[error("No existe {artifact}: {path}. {hint}")]
    MissingFile {
        artifact: String,
        path: PathBuf,
        hint: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("{url} siguió fallando tras {retries} reintentos (último status {status})")]
    RetriesExhausted {
        url: String,
        retries: u32,
        status: u16,
    },

    #[error("{url} no respondió tras {retries} reintentos ({}): {source}", failure_kind(.timed_out))]
    ConnectionExhausted {
        url: String,
        retries: u32,
        timed_out: bool,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Errores que invalidan la configuración del pipeline (columna, archivo o variable faltante)
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            AppError::MissingColumn { .. } | AppError::MissingFile { .. } | AppError::Config(_)
        )
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::MissingColumn { .. } => "MISSING_COLUMN",
            AppError::MissingFile { .. } => "MISSING_FILE",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Csv(_) => "CSV_ERROR",
            AppError::Spreadsheet(_) => "SPREADSHEET_ERROR",
            AppError::Io(_) => "IO_ERROR",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::ExternalApi(_) => "EXTERNAL_API_ERROR",
            AppError::RetriesExhausted { .. } => "RETRIES_EXHAUSTED",
            AppError::ConnectionExhausted { timed_out: true, .. } => "UPSTREAM_TIMEOUT",
            AppError::ConnectionExhausted { .. } => "CONNECTION_EXHAUSTED",
            AppError::Transport(_) => "TRANSPORT_ERROR",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::ConnectionExhausted { timed_out: true, .. } => StatusCode::GATEWAY_TIMEOUT,
            AppError::ExternalApi(_)
            | AppError::RetriesExhausted { .. }
            | AppError::ConnectionExhausted { .. }
            | AppError::Transport(_) => StatusCode::BAD_GATEWAY,
            // Sin reporte o roster válido el dashboard no puede calcular nada
            AppError::MissingColumn { .. } | AppError::MissingFile { .. } | AppError::Config(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::Csv(_) | AppError::Spreadsheet(_) | AppError::Io(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Respuesta de error para la API
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        error!("{} ({})", self, status);

        let details = match &self {
            AppError::MissingColumn { accepted, found, .. } => {
                Some(json!({ "accepted": accepted, "found": found }))
            }
            AppError::MissingFile { path, .. } => Some(json!({ "path": path.display().to_string() })),
            AppError::Validation(e) => Some(json!(e)),
            _ => None,
        };

        let body = ErrorResponse {
            error: status
                .canonical_reason()
                .unwrap_or("Error")
                .to_string(),
            message: self.to_string(),
            details,
            code: Some(self.code().to_string()),
        };

        (status, Json(body)).into_response()
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Función helper para errores de configuración
pub fn config_error(message: impl Into<String>) -> AppError {
    AppError::Config(message.into())
}

/// Función helper para archivos requeridos que no existen
pub fn missing_file_error(artifact: &str, path: impl Into<PathBuf>, hint: &str) -> AppError {
    AppError::MissingFile {
        artifact: artifact.to_string(),
        path: path.into(),
        hint: hint.to_string(),
    }
}

fn failure_kind(timed_out: &bool) -> &'static str {
    if *timed_out {
        "timeout"
    } else {
        "error de conexión"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_column_is_configuration_error() {
        let err = AppError::MissingColumn {
            table: "master".to_string(),
            canonical: "IMEI".to_string(),
            accepted: vec!["IMEI".to_string(), "imei".to_string()],
            found: vec!["VIN".to_string()],
        };
        assert!(err.is_configuration());
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(err.to_string().contains("IMEI"));
        assert!(err.to_string().contains("VIN"));
    }

    #[test]
    fn test_fetch_errors_map_to_bad_gateway() {
        let err = AppError::RetriesExhausted {
            url: "https://example.test/report".to_string(),
            retries: 4,
            status: 503,
        };
        assert!(!err.is_configuration());
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(AppError::Unauthorized("x".into()).status(), StatusCode::UNAUTHORIZED);
    }
}
