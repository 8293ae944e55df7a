//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use std::sync::Arc;

use crate::cache::{Clock, SystemClock};
use crate::config::environment::EnvironmentConfig;
use crate::services::connectivity_service::{ConnectivityService, ConnectivitySettings};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<EnvironmentConfig>,
    pub connectivity: Arc<ConnectivityService>,
}

impl AppState {
    pub fn new(config: EnvironmentConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Estado con un reloj inyectado (tests y reprocesos)
    pub fn with_clock(config: EnvironmentConfig, clock: Arc<dyn Clock>) -> Self {
        let connectivity = ConnectivityService::new(ConnectivitySettings::from(&config), clock);
        Self {
            config: Arc::new(config),
            connectivity: Arc::new(connectivity),
        }
    }
}
