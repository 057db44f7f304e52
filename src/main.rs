use anyhow::Result;
use dotenvy::dotenv;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info};

use driver_dispatch::config::environment::EnvironmentConfig;
use driver_dispatch::config::scheduling::SchedulingPolicy;
use driver_dispatch::database::create_pool;
use driver_dispatch::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    info!("🚚 Driver Dispatch - Marketplace Delivery API");
    info!("=============================================");

    // Inicializar base de datos
    let pool = match create_pool(None).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {}", e);
            return Err(anyhow::anyhow!("Error de base de datos: {}", e));
        }
    };

    let config = EnvironmentConfig::default();
    let policy = SchedulingPolicy::from_env();
    info!(
        "🗓️  Política de scheduling: {} min/parada buffer, {} min/milla, {} min/parada handling, cap {} min/block, lead {} min",
        policy.buffer_minutes_per_stop,
        policy.driving_minutes_per_mile,
        policy.handling_minutes_per_stop,
        policy.block_capacity_minutes,
        policy.lead_time_minutes
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    let app = driver_dispatch::create_app(AppState::new(pool, config, policy));

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /test - Endpoint de prueba");
    info!("🚗 Endpoints Driver:");
    info!("   GET  /api/driver/location - Ubicación del driver");
    info!("   GET  /api/driver/routes/nearby - Rutas ordenadas por distancia");
    info!("   GET  /api/driver/routes/available - Rutas disponibles y carga actual");
    info!("   POST /api/driver/routes/:route_id/accept - Aceptar ruta");
    info!("   POST /api/driver/deliveries/:delivery_id/complete - Completar entrega");
    info!("   GET  /api/driver/stats - Estadísticas del driver");
    info!("   POST /api/driver/status - Estado online/offline");

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
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
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
