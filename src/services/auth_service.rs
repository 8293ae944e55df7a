//! Servicio de autenticación contra Copiloto
//!
//! Obtiene el bearer token para la descarga del reporte: un token ya
//! emitido desde el entorno o un login con email y password.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::info;

use crate::client::CopilotoClient;
use crate::config::environment::{validate_url, FetchConfig};
use crate::utils::errors::{config_error, AppError, AppResult};

/// Rutas donde la respuesta de login puede traer el token, en orden
const TOKEN_PATHS: &[&[&str]] = &[
    &["accessToken"],
    &["access_token"],
    &["token"],
    &["data", "token"],
    &["data", "accessToken"],
];

/// Fuente del bearer token
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn token(&self) -> AppResult<String>;
}

/// Token entregado por configuración
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn token(&self) -> AppResult<String> {
        Ok(self.0.clone())
    }
}

/// Login con email/password contra el endpoint de sign-in
pub struct SignInTokenProvider {
    client: Arc<CopilotoClient>,
    signin_url: String,
    email: String,
    password: String,
}

impl SignInTokenProvider {
    pub fn new(
        client: Arc<CopilotoClient>,
        signin_url: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            client,
            signin_url: signin_url.into(),
            email: email.into(),
            password: password.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for SignInTokenProvider {
    async fn token(&self) -> AppResult<String> {
        info!("🔐 Login en {}", self.signin_url);
        let body = json!({ "email": self.email, "password": self.password });
        let response = self.client.post_json(&self.signin_url, &body).await?;
        extract_token(&response)
    }
}

/// Busca el token en las claves conocidas de la respuesta de login
pub fn extract_token(response: &Value) -> AppResult<String> {
    for path in TOKEN_PATHS {
        let found = path
            .iter()
            .try_fold(response, |node, key| node.get(*key))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|token| !token.is_empty());

        if let Some(token) = found {
            return Ok(token.to_string());
        }
    }

    let keys: Vec<&str> = response
        .as_object()
        .map(|object| object.keys().map(String::as_str).collect())
        .unwrap_or_default();
    Err(AppError::ExternalApi(format!(
        "No encontré token en la respuesta de login. Keys: {:?}",
        keys
    )))
}

/// Elige la fuente del token según la configuración
pub fn token_provider_from_config(
    config: &FetchConfig,
    client: Arc<CopilotoClient>,
) -> AppResult<Box<dyn TokenProvider>> {
    if let Some(token) = &config.token {
        info!("🔑 Usando COPILOTO_TOKEN del entorno");
        return Ok(Box::new(StaticToken::new(token.clone())));
    }

    match (&config.email, &config.password) {
        (Some(email), Some(password)) => {
            validate_url("COPILOTO_SIGNIN_URL", &config.signin_url)?;
            Ok(Box::new(SignInTokenProvider::new(
                client,
                config.signin_url.clone(),
                email.clone(),
                password.clone(),
            )))
        }
        _ => Err(config_error(
            "Faltan credenciales: define COPILOTO_TOKEN o COPILOTO_EMAIL y COPILOTO_PASSWORD.",
        )),
    }
}
