use anyhow::Result;
use dotenvy::dotenv;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use recon_tracker::config::database::DatabaseConfig;
use recon_tracker::config::environment::EnvironmentConfig;
use recon_tracker::repositories::{MemoryVehicleStore, PgVehicleStore, VehicleStore};
use recon_tracker::routes::create_router;
use recon_tracker::services::spawn_change_feed;
use recon_tracker::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging: RUST_LOG tiene prioridad sobre LOG_LEVEL
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        EnvFilter::new(level)
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("🚗 Recon Tracker - Flujo de reacondicionamiento");
    info!("================================================");

    let config = EnvironmentConfig::from_env()?;
    info!("⚙️ Entorno: {}", config.environment);

    let store: Arc<dyn VehicleStore> = match DatabaseConfig::from_environment(&config) {
        Some(db_config) => {
            let pool = db_config.create_pool().await.map_err(|e| {
                error!("❌ Error conectando a la base de datos: {}", e);
                anyhow::anyhow!("Error de base de datos: {}", e)
            })?;
            let store = PgVehicleStore::new(pool);
            store.ensure_schema().await?;
            info!("✅ Store Postgres listo");
            Arc::new(store)
        }
        None => {
            warn!("⚠️ DATABASE_URL no configurada, usando store en memoria");
            Arc::new(MemoryVehicleStore::new())
        }
    };

    let (dashboard, feed_handle) = spawn_change_feed(store.clone());

    let http_client = reqwest::Client::builder()
        .timeout(config.request_timeout())
        .build()?;

    if config.sheet_csv_url.is_none() {
        info!("📄 SHEET_CSV_URL no configurada: sincronización con la hoja deshabilitada");
    }
    if !config.csv_features_enabled {
        warn!("🚫 Importación/exportación CSV deshabilitada por configuración");
    }

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let app_state = AppState::new(store, config, http_client, dashboard);
    let app = create_router(app_state);

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET    /health");
    info!("   GET    /api/vehicles?view=&search=");
    info!("   GET    /api/vehicles/:id");
    info!("   DELETE /api/vehicles/:id");
    info!("   POST   /api/vehicles/:id/stages/start");
    info!("   POST   /api/vehicles/:id/stages/mechanical/complete");
    info!("   POST   /api/vehicles/:id/stages/detailing/complete");
    info!("   POST   /api/vehicles/:id/recon/start");
    info!("   PUT    /api/vehicles/:id/photo-status");
    info!("   PUT    /api/vehicles/:id/title-in-house");
    info!("   POST   /api/vehicles/:id/sold");
    info!("📊 GET    /api/analytics");
    info!("📥 GET    /api/import/status | POST /api/import/csv | POST /api/import/sheet-sync");
    info!("📤 GET    /api/export/csv");
    info!("👤 GET/POST /api/detailers | DELETE /api/detailers/:name");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("❌ Error del servidor: {}", e);
    }

    feed_handle.abort();
    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo instalar el handler de Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el handler de SIGTERM: {}", e);
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
