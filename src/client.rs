//! Cliente HTTP para la API de Copiloto
//!
//! Este módulo contiene el cliente HTTP con timeout por request y la
//! política de reintentos con backoff exponencial acotado.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use crate::utils::errors::{AppError, AppResult};

/// Caracteres del body incluidos en los mensajes de error
const ERROR_BODY_PREVIEW: usize = 300;

/// Política de reintentos para errores transitorios
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    /// Delay base; el reintento `n` espera `backoff_factor * 2^(n-1)`
    pub backoff_factor: Duration,
    pub max_backoff: Duration,
    pub retry_statuses: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 4,
            backoff_factor: Duration::from_millis(800),
            max_backoff: Duration::from_secs(120),
            retry_statuses: vec![429, 500, 502, 503, 504],
        }
    }
}

impl RetryPolicy {
    /// Delay antes del reintento número `retry` (1-based)
    pub fn delay_for(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(31);
        self.backoff_factor
            .saturating_mul(1u32 << exponent)
            .min(self.max_backoff)
    }

    pub fn should_retry_status(&self, status: StatusCode) -> bool {
        self.retry_statuses.contains(&status.as_u16())
    }

    fn should_retry_error(&self, error: &reqwest::Error) -> bool {
        error.is_connect() || error.is_timeout()
    }
}

/// Cliente HTTP para Copiloto (login + descarga de reportes)
#[derive(Debug, Clone)]
pub struct CopilotoClient {
    client: Client,
    retry: RetryPolicy,
}

impl CopilotoClient {
    /// Crear nuevo cliente con timeout por request
    pub fn new(timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("fleet-connectivity/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// POST JSON y parseo de la respuesta como JSON
    pub async fn post_json(&self, url: &str, body: &Value) -> AppResult<Value> {
        let response = self
            .send_with_retry(url, |client| client.post(url).json(body))
            .await?;

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            AppError::ExternalApi(format!(
                "{} no devolvió JSON válido ({}): {}",
                url,
                e,
                preview(&text)
            ))
        })
    }

    /// GET autenticado con bearer token
    pub async fn get_with_bearer(&self, url: &str, token: &str, accept: &str) -> AppResult<Response> {
        self.send_with_retry(url, |client| {
            client
                .get(url)
                .bearer_auth(token)
                .header(reqwest::header::ACCEPT, accept)
        })
        .await
    }

    /// Envía el request reintentando status transitorios y errores de conexión.
    /// 401/403 no se reintentan.
    pub async fn send_with_retry<F>(&self, url: &str, build: F) -> AppResult<Response>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        let mut retry = 0;
        loop {
            match build(&self.client).send().await {
                Ok(response) => {
                    let status = response.status();
                    if !self.retry.should_retry_status(status) {
                        return check_status(url, response).await;
                    }
                    if retry >= self.retry.max_retries {
                        return Err(AppError::RetriesExhausted {
                            url: url.to_string(),
                            retries: self.retry.max_retries,
                            status: status.as_u16(),
                        });
                    }
                    retry += 1;
                    let delay = self.retry.delay_for(retry);
                    warn!(
                        "⏳ {} respondió {}; reintento {}/{} en {:?}",
                        url, status, retry, self.retry.max_retries, delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) if self.retry.should_retry_error(&e) => {
                    if retry >= self.retry.max_retries {
                        return Err(AppError::ConnectionExhausted {
                            url: url.to_string(),
                            retries: self.retry.max_retries,
                            timed_out: e.is_timeout(),
                            source: e,
                        });
                    }
                    retry += 1;
                    let delay = self.retry.delay_for(retry);
                    warn!(
                        "⏳ Error de conexión con {}: {}; reintento {}/{} en {:?}",
                        url, e, retry, self.retry.max_retries, delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

async fn check_status(url: &str, response: Response) -> AppResult<Response> {
    let status = response.status();
    debug!("{} respondió {}", url, status);

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(AppError::Unauthorized(format!(
            "{} respondió {}: credenciales o token inválidos",
            url,
            status.as_u16()
        )));
    }

    if status.is_client_error() || status.is_server_error() {
        let body = response.text().await.unwrap_or_default();
        return Err(AppError::ExternalApi(format!(
            "HTTP {} en {}: {}",
            status.as_u16(),
            url,
            preview(&body)
        )));
    }

    Ok(response)
}

fn preview(body: &str) -> String {
    body.chars().take(ERROR_BODY_PREVIEW).collect()
}
