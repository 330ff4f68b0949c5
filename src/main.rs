use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use dotenvy::dotenv;
use tokio::signal;
use tracing::{error, info, warn};

use scrap_pickup::build_router;
use scrap_pickup::config::environment::{EnvironmentConfig, StorageLocation};
use scrap_pickup::repositories::{FileStorage, KeyValueStorage, MemoryStorage, RecordStore};
use scrap_pickup::services::{
    DisabledGeocoder, GeocodingService, LogNotifier, NotificationService, ReverseGeocoder, SystemClock,
};
use scrap_pickup::state::AppState;

/// Frecuencia de limpieza de asistentes inactivos
const WIZARD_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    info!("♻️ Scrap Pickup - API de recogida de chatarra");
    info!("==============================================");

    let config = EnvironmentConfig::from_env().map_err(|e| {
        error!("❌ Configuración inválida: {}", e);
        anyhow::anyhow!("{}", e)
    })?;

    let storage: Arc<dyn KeyValueStorage> = match &config.storage {
        StorageLocation::Memory => {
            warn!("🧪 Almacenamiento en memoria: los datos se pierden al reiniciar");
            Arc::new(MemoryStorage::new())
        }
        StorageLocation::Directory(dir) => Arc::new(FileStorage::open(dir)?),
    };
    let store = RecordStore::new(storage, Arc::new(SystemClock));

    let geocoder: Arc<dyn ReverseGeocoder> = if config.reverse_geocoding_enabled {
        Arc::new(GeocodingService::new(
            config.reverse_geocoding_url.clone(),
            config.reverse_geocoding_timeout,
        )?)
    } else {
        info!("🗺️ Geocodificación inversa desactivada");
        Arc::new(DisabledGeocoder)
    };

    let notifier = NotificationService::new(Arc::new(LogNotifier));
    let addr: SocketAddr = config.server_url().parse()?;
    let idle_ttl = config.wizard_idle_ttl;
    let state = AppState::new(config, store, geocoder, notifier);

    let sweeper = state.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(WIZARD_SWEEP_INTERVAL.min(idle_ttl));
        loop {
            ticker.tick().await;
            sweeper.evict_idle_wizards().await;
        }
    });
    info!("🧹 Asistentes inactivos se descartan tras {}s", idle_ttl.as_secs());

    let app = build_router(state);

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Estado del servicio");
    info!("🧭 Asistente de solicitud:");
    info!("   POST /api/wizard - Iniciar asistente");
    info!("   GET|DELETE /api/wizard/:id - Consultar / cancelar");
    info!("   PUT  /api/wizard/:id/weights | POST /api/wizard/:id/weights/preset");
    info!("   POST /api/wizard/:id/images | DELETE /api/wizard/:id/images/:type/:index");
    info!("   POST /api/wizard/:id/location/start | POST /api/wizard/:id/location");
    info!("   PUT  /api/wizard/:id/address | PUT /api/wizard/:id/schedule");
    info!("   POST /api/wizard/:id/next | back | submit");
    info!("👤 Usuario:");
    info!("   GET  /api/users/:phone/requests - Mis solicitudes");
    info!("   POST /api/support - Contactar soporte");
    info!("🛠️ Administración:");
    info!("   GET  /api/admin/requests?status=&q= - Listado filtrado");
    info!("   POST /api/admin/requests/:id/accept | reject | complete");
    info!("   GET  /api/admin/messages | POST /api/admin/messages/:id/resolve");
    info!("   GET  /api/admin/stats | POST /api/admin/alerts");
    info!("   GET|PUT /api/admin/notifications");
    info!("📍 Zonas:");
    info!("   GET  /api/zones | POST /api/zones/check");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("❌ Error del servidor: {}", e);
        return Err(e.into());
    }

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo instalar el manejador de Ctrl+C: {}", e);
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
                error!("❌ No se pudo instalar el manejador de SIGTERM: {}", e);
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
