use anyhow::Result;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use fleet_connectivity::config::environment::EnvironmentConfig;
use fleet_connectivity::routes::create_app_router;
use fleet_connectivity::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = EnvironmentConfig::from_env()?;

    // Configurar logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("🚛 Dashboard de Conectividad de Flota");
    info!("====================================");
    info!("📁 Datos: {} ({}*.csv)", config.data_dir.display(), config.status_prefix);
    info!("📋 Master: {}", config.master_path.display());
    info!(
        "⏱️  Umbrales: telemetría {} días, GPS {} días | cache {}s",
        config.thresholds.telemetry_ok_days,
        config.thresholds.gps_ok_days,
        config.cache.ttl_seconds
    );
    if config.is_development() {
        info!("🧪 Modo desarrollo");
    }

    let addr: SocketAddr = config.server_url().parse()?;
    let app_state = AppState::new(config);

    // Limpieza periódica de snapshots vencidos
    let cleanup_state = app_state.clone();
    tokio::spawn(async move {
        let period = std::time::Duration::from_secs(cleanup_state.config.cache.ttl_seconds.max(60));
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            cleanup_state.connectivity.cleanup_expired().await;
        }
    });

    let app = create_app_router(app_state);

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /test - Endpoint de prueba");
    info!("   GET  /api/connectivity/summary?q= - Gauges e histogramas");
    info!("   GET  /api/connectivity/problems?q=&limit= - Unidades con problemas");
    info!("   POST /api/connectivity/refresh - Invalidar cache");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("❌ Error del servidor: {}", e);
            e
        })?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo escuchar Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo escuchar SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
