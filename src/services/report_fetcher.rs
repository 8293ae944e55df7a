//! Descarga del reporte de registros de vehículos
//!
//! Resuelve el token y descarga el CSV del endpoint de reportes.

use std::sync::Arc;

use tracing::info;

use crate::client::{CopilotoClient, RetryPolicy};
use crate::config::environment::{validate_url, FetchConfig};
use crate::services::auth_service::{token_provider_from_config, TokenProvider};
use crate::utils::errors::AppResult;

const REPORT_ACCEPT: &str = "text/csv,application/octet-stream,*/*";

/// Cuerpo descargado tal cual, con su content-type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedReport {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

pub struct ReportFetcher {
    client: Arc<CopilotoClient>,
    tokens: Box<dyn TokenProvider>,
    endpoint: String,
}

impl ReportFetcher {
    pub fn new(
        client: Arc<CopilotoClient>,
        tokens: Box<dyn TokenProvider>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            client,
            tokens,
            endpoint: endpoint.into(),
        }
    }

    /// Valida URLs y credenciales antes de construir el fetcher
    pub fn from_config(config: &FetchConfig) -> AppResult<Self> {
        Self::from_config_with_retry(config, RetryPolicy::default())
    }

    pub fn from_config_with_retry(config: &FetchConfig, retry: RetryPolicy) -> AppResult<Self> {
        validate_url("COPILOTO_ENDPOINT", &config.endpoint)?;
        let client = Arc::new(CopilotoClient::new(config.timeout)?.with_retry_policy(retry));
        let tokens = token_provider_from_config(config, client.clone())?;
        Ok(Self::new(client, tokens, config.endpoint.clone()))
    }

    pub async fn fetch(&self) -> AppResult<DownloadedReport> {
        let token = self.tokens.token().await?;

        info!("📥 Descargando reporte desde {}", self.endpoint);
        let response = self
            .client
            .get_with_bearer(&self.endpoint, &token, REPORT_ACCEPT)
            .await?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?.to_vec();

        info!(
            "✅ Reporte descargado: {} bytes ({})",
            bytes.len(),
            content_type.as_deref().unwrap_or("sin content-type")
        );

        Ok(DownloadedReport {
            bytes,
            content_type,
        })
    }
}
